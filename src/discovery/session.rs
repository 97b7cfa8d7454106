//! Discovery session: the mutable aggregate of one scan.
//!
//! Created fresh by every scan and owned by the orchestrator. All mutation
//! happens on the orchestrator's thread.

use crate::agent::AgentRecord;
use crate::discovery::resolver::DependencyResolver;
use crate::types::{Scope, ValidationError};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Authoritative record key: an id is unique only within its scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    scope: Scope,
    extension_id: Option<String>,
    id: String,
}

impl RecordKey {
    fn of(record: &AgentRecord) -> Self {
        Self {
            scope: record.scope,
            extension_id: record.extension_id.clone(),
            id: record.id.clone(),
        }
    }
}

/// Two unit files declaring the same agent id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdCollision {
    pub id: String,
    /// File of the record that was already present
    pub existing: PathBuf,
    /// File of the record being inserted
    pub incoming: PathBuf,
    /// Same scope: the incoming record replaced the existing one.
    /// Different scopes: both are kept.
    pub same_scope: bool,
}

#[derive(Debug, Default)]
pub struct DiscoverySession {
    records: Vec<AgentRecord>,
    index: HashMap<RecordKey, usize>,
    validation_errors: Vec<ValidationError>,
    dependency_map: BTreeMap<String, Vec<String>>,
    /// Record key behind each `dependency_map` entry, index for index.
    consumer_keys: BTreeMap<String, Vec<RecordKey>>,
    collisions: Vec<IdCollision>,
}

fn scan_rank(record: &AgentRecord) -> (u8, Option<&str>, &str) {
    let tier = match record.scope {
        Scope::Core => 0,
        Scope::Shared => 1,
        Scope::Extension => 2,
    };
    (tier, record.extension_id.as_deref(), record.file_name.as_str())
}

impl DiscoverySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record at the end, returning its position.
    ///
    /// A record with the same `(scope, extension, id)` key is replaced in
    /// place; its previous dependency-map contributions are withdrawn.
    pub fn insert(&mut self, record: AgentRecord) -> usize {
        self.insert_at(self.records.len(), record)
    }

    /// Like [`insert`](Self::insert), but a new key lands where a full scan
    /// would have put it: core, shared, then extensions by id, each by file
    /// name.
    pub fn insert_in_scan_order(&mut self, record: AgentRecord) -> usize {
        let rank = scan_rank(&record);
        let at = self
            .records
            .iter()
            .position(|r| scan_rank(r) > rank)
            .unwrap_or(self.records.len());
        self.insert_at(at, record)
    }

    fn insert_at(&mut self, at: usize, record: AgentRecord) -> usize {
        let key = RecordKey::of(&record);
        if let Some(&position) = self.index.get(&key) {
            let previous = std::mem::replace(&mut self.records[position], record);
            if previous.file_path != self.records[position].file_path {
                self.note_collision(&previous, position, true);
            }
            self.withdraw_consumer(&previous);
            return position;
        }

        if let Some(existing) = self.records.iter().find(|r| r.id == key.id) {
            let collision = IdCollision {
                id: key.id.clone(),
                existing: existing.file_path.clone(),
                incoming: record.file_path.clone(),
                same_scope: false,
            };
            warn!(
                id = %collision.id,
                existing = %collision.existing.display(),
                incoming = %collision.incoming.display(),
                "Agent id declared in more than one scope"
            );
            self.collisions.push(collision);
        }

        let position = at.min(self.records.len());
        self.records.insert(position, record);
        if position + 1 == self.records.len() {
            self.index.insert(key, position);
        } else {
            self.reindex();
        }
        position
    }

    fn reindex(&mut self) {
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(position, record)| (RecordKey::of(record), position))
            .collect();
    }

    fn note_collision(&mut self, previous: &AgentRecord, position: usize, same_scope: bool) {
        let collision = IdCollision {
            id: previous.id.clone(),
            existing: previous.file_path.clone(),
            incoming: self.records[position].file_path.clone(),
            same_scope,
        };
        warn!(
            id = %collision.id,
            replaced = %collision.existing.display(),
            by = %collision.incoming.display(),
            "Agent id declared twice in one scope, later file wins"
        );
        self.collisions.push(collision);
    }

    fn push_consumer(&mut self, name: &str, position: usize) {
        let record = &self.records[position];
        self.dependency_map
            .entry(name.to_string())
            .or_default()
            .push(record.id.clone());
        self.consumer_keys
            .entry(name.to_string())
            .or_default()
            .push(RecordKey::of(record));
    }

    /// Withdraw the consumer entries `previous` contributed, matched by key so
    /// a namesake in another scope keeps its entry and place.
    fn withdraw_consumer(&mut self, previous: &AgentRecord) {
        let key = RecordKey::of(previous);
        for names in previous.resolved_dependencies.values() {
            for name in names.keys() {
                let Some(keys) = self.consumer_keys.get_mut(name) else {
                    continue;
                };
                if let Some(pos) = keys.iter().position(|k| k == &key) {
                    keys.remove(pos);
                    if let Some(consumers) = self.dependency_map.get_mut(name) {
                        consumers.remove(pos);
                    }
                }
                if keys.is_empty() {
                    self.consumer_keys.remove(name);
                    self.dependency_map.remove(name);
                }
            }
        }
    }

    /// Remove every record read from `path`, withdrawing its dependency-map
    /// entries and its cross-scope collisions. Returns how many were removed.
    pub fn remove_by_path(&mut self, path: &Path) -> usize {
        if !self.records.iter().any(|r| r.file_path == path) {
            return 0;
        }
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| r.file_path == path);
        self.records = kept;
        self.reindex();
        for record in &removed {
            self.withdraw_consumer(record);
        }
        self.collisions
            .retain(|c| c.same_scope || (c.existing != path && c.incoming != path));
        removed.len()
    }

    /// Records in scan order.
    pub fn records(&self) -> &[AgentRecord] {
        &self.records
    }

    pub fn get(&self, scope: Scope, extension_id: Option<&str>, id: &str) -> Option<&AgentRecord> {
        let key = RecordKey {
            scope,
            extension_id: extension_id.map(str::to_string),
            id: id.to_string(),
        };
        self.index.get(&key).map(|&i| &self.records[i])
    }

    /// Id-only lookup: the first record in scan order wins, so core beats
    /// shared, and shared beats extensions (which are ordered lexically).
    pub fn find(&self, id: &str) -> Option<&AgentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn record_error(&mut self, error: ValidationError) {
        self.validation_errors.push(error);
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        &self.validation_errors
    }

    /// Drop every error recorded against `path`, returning how many were removed.
    pub fn remove_errors_for(&mut self, path: &Path) -> usize {
        let before = self.validation_errors.len();
        self.validation_errors.retain(|e| e.file_path != path);
        before - self.validation_errors.len()
    }

    /// Distinct file paths with at least one error, in first-seen order.
    pub fn failed_paths(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.validation_errors
            .iter()
            .filter(|e| seen.insert(e.file_path.clone()))
            .map(|e| e.file_path.clone())
            .collect()
    }

    /// Dependency name -> consuming agent ids (duplicates allowed).
    pub fn dependency_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.dependency_map
    }

    pub fn collisions(&self) -> &[IdCollision] {
        &self.collisions
    }

    /// Resolve every record's dependencies.
    pub fn resolve_all(&mut self, resolver: &DependencyResolver) {
        for position in 0..self.records.len() {
            self.resolve_at(position, resolver);
        }
    }

    /// Resolve one record, feeding errors and consumers into the session.
    pub fn resolve_at(&mut self, position: usize, resolver: &DependencyResolver) {
        let resolution = resolver.resolve(&mut self.records[position]);
        for (_, name, _) in &resolution.resolved {
            self.push_consumer(name, position);
        }
        self.validation_errors.extend(resolution.missing);
    }
}

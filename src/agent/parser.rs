//! Unit file content parser.
//!
//! Two encodings carry the configuration block:
//! - a leading `---` delimited YAML block (front matter) followed by narrative content
//! - a fenced code block tagged `yaml` or `yml` anywhere in the document
//!
//! Parsing never fails. Anything unusable degrades to an empty configuration
//! and the original text; the extractor reports that one layer up.

use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, warn};

const DELIMITER: &str = "---";
const FENCE: &str = "```";
const CONFIG_FENCE_TAGS: [&str; 2] = ["yaml", "yml"];

/// Which encoding produced the configuration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEncoding {
    FrontMatter,
    FencedBlock,
    None,
}

/// Parsed unit: configuration mapping plus remaining narrative content.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUnit {
    pub config: Mapping,
    pub content: String,
    pub encoding: ConfigEncoding,
}

impl ParsedUnit {
    fn unparsed(raw: &str) -> Self {
        Self {
            config: Mapping::new(),
            content: raw.to_string(),
            encoding: ConfigEncoding::None,
        }
    }

    pub fn has_config(&self) -> bool {
        !self.config.is_empty()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated front matter (missing closing '---' line)")]
    UnterminatedFrontMatter,
    #[error("unterminated fenced configuration block (missing closing '```' line)")]
    UnterminatedFence,
    #[error("invalid YAML: {0}")]
    InvalidYaml(String),
    #[error("configuration block is not a mapping")]
    NotAMapping,
}

/// Parse raw unit text into configuration and narrative content.
pub fn parse_unit(raw: &str) -> ParsedUnit {
    match parse_front_matter(raw) {
        Ok(Some((config, content))) if !config.is_empty() => {
            return ParsedUnit {
                config,
                content,
                encoding: ConfigEncoding::FrontMatter,
            };
        }
        Ok(_) => {}
        Err(e) => debug!(error = %e, "Front matter unusable, searching for fenced block"),
    }

    match parse_fenced_block(raw) {
        Ok(Some((config, content))) if !config.is_empty() => ParsedUnit {
            config,
            content,
            encoding: ConfigEncoding::FencedBlock,
        },
        Ok(_) => ParsedUnit::unparsed(raw),
        Err(e) => {
            warn!(error = %e, "Fenced configuration block could not be parsed");
            ParsedUnit::unparsed(raw)
        }
    }
}

/// Byte-offset view of one line, without its line terminator.
struct Line<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

fn lines_with_offsets(raw: &str) -> Vec<Line<'_>> {
    let mut offset = 0;
    raw.split_inclusive('\n')
        .map(|chunk| {
            let start = offset;
            offset += chunk.len();
            Line {
                start,
                end: offset,
                text: chunk.trim_end_matches(['\n', '\r']),
            }
        })
        .collect()
}

fn parse_front_matter(raw: &str) -> Result<Option<(Mapping, String)>, ParseError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let bom = raw.len() - text.len();
    let lines = lines_with_offsets(text);

    let Some(first) = lines.first() else {
        return Ok(None);
    };
    if first.text.trim_end() != DELIMITER {
        return Ok(None);
    }

    let closing = lines
        .iter()
        .skip(1)
        .find(|line| line.text.trim_end() == DELIMITER)
        .ok_or(ParseError::UnterminatedFrontMatter)?;

    let yaml = &text[first.end..closing.start];
    let config = parse_mapping(yaml)?;
    let content = raw[bom + closing.end..].to_string();
    Ok(Some((config, content)))
}

fn is_config_fence(line: &str) -> bool {
    let Some(info) = line.trim().strip_prefix(FENCE) else {
        return false;
    };
    info.split_whitespace()
        .next()
        .map(|tag| CONFIG_FENCE_TAGS.contains(&tag.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn parse_fenced_block(raw: &str) -> Result<Option<(Mapping, String)>, ParseError> {
    let lines = lines_with_offsets(raw);
    let Some(open_idx) = lines.iter().position(|line| is_config_fence(line.text)) else {
        return Ok(None);
    };
    let open = &lines[open_idx];
    let close = lines[open_idx + 1..]
        .iter()
        .find(|line| line.text.trim() == FENCE)
        .ok_or(ParseError::UnterminatedFence)?;

    let config = parse_mapping(&raw[open.end..close.start])?;
    let mut content = String::with_capacity(raw.len());
    content.push_str(&raw[..open.start]);
    content.push_str(&raw[close.end..]);
    Ok(Some((config, content)))
}

fn parse_mapping(yaml: &str) -> Result<Mapping, ParseError> {
    let value: Value =
        serde_yaml::from_str(yaml).map_err(|e| ParseError::InvalidYaml(e.to_string()))?;
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ParseError::NotAMapping),
    }
}

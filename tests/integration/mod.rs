//! Integration tests for scope scanning, resolution, retry and reporting

mod cli_contracts;
mod report;
mod retry;
mod scan_scenarios;
mod support;

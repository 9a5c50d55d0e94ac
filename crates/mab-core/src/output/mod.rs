//! Experiment Output
//!
//! Writes an [`ExperimentRecord`] to a directory, one file per table, named
//! `experiment_{id}_{table}.{ext}`.

pub mod csv;

use mab_events::{generate_record_name, ExperimentRecord};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Table names shared by every format.
pub const ACTION_HISTORY: &str = "action_history";
pub const PAYOFF_HISTORY: &str = "payoff_history";
pub const ENVIRONMENT: &str = "environment";
pub const AGENT_METADATA: &str = "agent_metadata";
pub const NETWORK: &str = "network";

/// On-disk encoding of the tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn table_path(dir: &Path, record: &ExperimentRecord, table: &str, format: ExportFormat) -> PathBuf {
    dir.join(format!(
        "{}.{}",
        generate_record_name(record.experiment_id, table),
        format.extension()
    ))
}

fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Writes every table of `record` into `dir`, creating it if needed.
/// Returns the paths written.
pub fn write_record(
    record: &ExperimentRecord,
    dir: impl AsRef<Path>,
    format: ExportFormat,
) -> Result<Vec<PathBuf>, OutputError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let tables = [ACTION_HISTORY, PAYOFF_HISTORY, ENVIRONMENT, AGENT_METADATA, NETWORK];
    let paths: Vec<PathBuf> = tables
        .iter()
        .map(|table| table_path(dir, record, table, format))
        .collect();

    match format {
        ExportFormat::Json => {
            write_json(&record.action_history, &paths[0])?;
            write_json(&record.payoff_history, &paths[1])?;
            write_json(&record.environment, &paths[2])?;
            write_json(&record.agent_metadata, &paths[3])?;
            write_json(&record.network, &paths[4])?;
        }
        ExportFormat::Csv => {
            fs::write(&paths[0], csv::history_table(&record.action_history))?;
            fs::write(&paths[1], csv::history_table(&record.payoff_history))?;
            fs::write(&paths[2], csv::environment(&record.environment))?;
            fs::write(&paths[3], csv::agent_metadata(&record.agent_metadata))?;
            fs::write(&paths[4], csv::network(&record.network))?;
        }
    }

    tracing::info!(
        "Wrote {} tables for experiment {} to {}",
        paths.len(),
        record.experiment_id,
        dir.display()
    );
    Ok(paths)
}

/// Writes the whole record as a single JSON document.
pub fn write_summary(record: &ExperimentRecord, dir: impl AsRef<Path>) -> Result<PathBuf, OutputError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "{}.json",
        generate_record_name(record.experiment_id, "record")
    ));
    fs::write(&path, record.to_json_pretty()?)?;
    Ok(path)
}

//! Run manifest: bookkeeping JSON written next to the exported tables.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outcome of one exported table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    pub endpoint: String,
    pub question_type: String,
    pub path: PathBuf,
    pub rows: usize,
    /// Questions that failed after retries and were skipped.
    pub errors: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub tables: Vec<TableSummary>,
    pub total_rows: usize,
    pub total_errors: usize,
}

impl RunManifest {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            tables: Vec::new(),
            total_rows: 0,
            total_errors: 0,
        }
    }

    pub fn record_table(&mut self, table: TableSummary) {
        self.total_rows += table.rows;
        self.total_errors += table.errors;
        self.tables.push(table);
    }

    /// Stamp the finish time and write `manifest_{start}.json` into `dir`.
    pub fn finish_and_save(&mut self, dir: &Path) -> Result<PathBuf> {
        self.finished_at = Some(Utc::now());
        std::fs::create_dir_all(dir)?;
        let filename = format!("manifest_{}.json", self.started_at.format("%Y%m%dT%H%M%S"));
        let path = dir.join(filename);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}

impl Default for RunManifest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_accumulate_across_tables() {
        let mut manifest = RunManifest::new();
        manifest.record_table(TableSummary {
            endpoint: "14B".into(),
            question_type: "zero-shot".into(),
            path: PathBuf::from("qwen_14B_zero-shot.csv"),
            rows: 144,
            errors: 0,
        });
        manifest.record_table(TableSummary {
            endpoint: "14B".into(),
            question_type: "parallel".into(),
            path: PathBuf::from("qwen_14B_parallel.csv"),
            rows: 14,
            errors: 2,
        });
        assert_eq!(manifest.total_rows, 158);
        assert_eq!(manifest.total_errors, 2);
        assert_eq!(manifest.tables.len(), 2);
    }
}

//! CSV export for collected survey tables.

use crate::config::OutputConfig;
use crate::error::Result;
use crate::prompt::QuestionType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// One labeled answer in the generated dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub design: String,
    pub criteria: String,
    pub material: String,
    pub response: String,
    pub question_type: String,
}

/// Table filename: `{prefix}_{endpoint_label}_{question_type}.csv`.
pub fn table_filename(prefix: &str, endpoint_label: &str, question_type: QuestionType) -> String {
    format!("{prefix}_{endpoint_label}_{question_type}.csv")
}

/// Write one table, creating the output directory as needed. Returns the
/// path written.
pub fn write_table(
    config: &OutputConfig,
    endpoint_label: &str,
    question_type: QuestionType,
    records: &[SurveyRecord],
) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.dir)?;
    let path = config
        .dir
        .join(table_filename(&config.prefix, endpoint_label, question_type));

    let mut writer = csv::Writer::from_path(&path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = records.len(), "table written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_matches_dataset_convention() {
        assert_eq!(
            table_filename("qwen", "14B", QuestionType::ZeroShot),
            "qwen_14B_zero-shot.csv"
        );
        assert_eq!(
            table_filename("qwen", "32B", QuestionType::ChainOfThought),
            "qwen_32B_chain-of-thought.csv"
        );
    }
}

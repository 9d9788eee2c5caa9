//! Experiment driver: walks the matrix per endpoint and strategy,
//! collects answers, and exports one CSV table per pair.

use crate::config::{AgentConfig, Config, EndpointConfig, GenerationConfig};
use crate::extract::extract_rating;
use crate::http::HttpClient;
use crate::llm::{ChatMessage, GenerationParams, LlmClient};
use crate::manifest::{RunManifest, TableSummary};
use crate::matrix::{Cell, ExperimentMatrix};
use crate::output::{self, SurveyRecord};
use crate::prompt::{QuestionType, compile_question};
use crate::{agent, error};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, warn};

const USER_AGENT: &str = "matprobe/0.1.0";

/// CLI-level adjustments to a configured run.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Replace the configured endpoint list with a single endpoint.
    pub endpoint: Option<EndpointConfig>,
    /// Restrict the run to one strategy.
    pub question_type: Option<QuestionType>,
    pub out_dir: Option<PathBuf>,
}

/// Run the full experiment and write one table per (endpoint, strategy).
pub async fn run_experiment(mut config: Config, opts: RunOptions) -> Result<()> {
    if let Some(dir) = opts.out_dir {
        config.output.dir = dir;
    }
    config.validate()?;

    let endpoints = match opts.endpoint {
        Some(ep) => vec![ep],
        None => config.endpoints.clone(),
    };
    let question_types: Vec<QuestionType> = match opts.question_type {
        Some(qt) => vec![qt],
        None => config.matrix.question_types.clone(),
    };

    let matrix = ExperimentMatrix::from_config(&config.matrix);
    let http = HttpClient::new(USER_AGENT)?;
    let mut manifest = RunManifest::new();

    for endpoint in &endpoints {
        let llm = LlmClient::from_endpoint(endpoint, &config.generation)?;

        for &question_type in &question_types {
            info!(endpoint = %endpoint.label, %question_type, "collecting table");

            let (records, errors) = collect_table(
                &llm,
                &http,
                &matrix,
                question_type,
                &config.generation,
                &config.agent,
            )
            .await;

            let path = output::write_table(&config.output, &endpoint.label, question_type, &records)?;
            manifest.record_table(TableSummary {
                endpoint: endpoint.label.clone(),
                question_type: question_type.to_string(),
                path,
                rows: records.len(),
                errors,
            });
        }
    }

    let manifest_path = manifest.finish_and_save(&config.output.dir)?;

    println!(
        "Collected {} rows across {} tables ({} questions failed)",
        manifest.total_rows,
        manifest.tables.len(),
        manifest.total_errors
    );
    println!("Manifest: {}", manifest_path.display());
    Ok(())
}

/// Walk one (endpoint, strategy) table. Failed questions are logged and
/// skipped; the table keeps going.
async fn collect_table(
    llm: &LlmClient,
    http: &HttpClient,
    matrix: &ExperimentMatrix,
    question_type: QuestionType,
    generation: &GenerationConfig,
    agent_config: &AgentConfig,
) -> (Vec<SurveyRecord>, usize) {
    let cells = matrix.cells(question_type);
    let total = cells.len();
    let mut records = Vec::with_capacity(total);
    let mut errors = 0usize;

    for (i, cell) in cells.iter().enumerate() {
        match answer_cell(llm, http, generation, agent_config, cell).await {
            Ok(response) => {
                records.push(SurveyRecord {
                    design: cell.design.clone(),
                    criteria: cell.criterion.clone(),
                    material: cell.material.clone(),
                    response,
                    question_type: question_type.to_string(),
                });
            }
            Err(e) => {
                errors += 1;
                warn!(
                    design = %cell.design,
                    criterion = %cell.criterion,
                    material = %cell.material,
                    error = %e,
                    "question failed, skipping row"
                );
            }
        }
        if (i + 1) % 25 == 0 {
            info!(progress = i + 1, total, "table progress");
        }
    }

    (records, errors)
}

/// Answer a single matrix cell according to its strategy.
///
/// Agentic, zero-shot, and few-shot answers are reduced to the first
/// integer; parallel and chain-of-thought rows keep the raw text, as in
/// the published dataset.
pub async fn answer_cell(
    llm: &LlmClient,
    http: &HttpClient,
    generation: &GenerationConfig,
    agent_config: &AgentConfig,
    cell: &Cell,
) -> error::Result<String> {
    let Cell {
        design,
        criterion,
        material,
        question_type,
    } = cell;

    match question_type {
        QuestionType::Agentic => {
            let question = compile_question(design, criterion, material, *question_type, None);
            let (answer, stats) = agent::run(llm, http, &question, agent_config).await?;
            info!(
                iterations = stats.iterations,
                tool_calls = stats.tool_calls,
                "agent run complete"
            );
            Ok(extracted_or_raw(answer))
        }
        QuestionType::ZeroShot | QuestionType::FewShot => {
            let question = compile_question(design, criterion, material, *question_type, None);
            let response = llm.chat(&[ChatMessage::user(question)]).await?;
            Ok(extracted_or_raw(response))
        }
        QuestionType::Parallel => {
            let question = compile_question(design, criterion, material, *question_type, None);
            llm.chat(&[ChatMessage::user(question)]).await
        }
        QuestionType::ChainOfThought => {
            let reasoning_params = GenerationParams {
                max_tokens: generation.reasoning_max_tokens,
                ..llm.default_params()
            };
            let stage1 = compile_question(design, criterion, material, *question_type, None);
            let reasoning = llm
                .chat_with(&[ChatMessage::user(stage1)], &reasoning_params)
                .await?;

            let stage2 =
                compile_question(design, criterion, material, *question_type, Some(&reasoning));
            llm.chat(&[ChatMessage::user(stage2)]).await
        }
    }
}

/// Reduce an answer to its first integer, falling back to the raw text
/// when none is present.
fn extracted_or_raw(response: String) -> String {
    match extract_rating(&response) {
        Ok(rating) => rating.to_string(),
        Err(e) => {
            warn!(error = %e, "rating extraction failed, keeping raw response");
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_falls_back_to_raw_text() {
        assert_eq!(extracted_or_raw("8".into()), "8");
        assert_eq!(extracted_or_raw("I'd say 7/10".into()), "7");
        assert_eq!(
            extracted_or_raw("depends on the alloy".into()),
            "depends on the alloy"
        );
    }
}

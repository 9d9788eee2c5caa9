use anyhow::{Result, bail};
use clap::Parser;
use matprobe::config::{Config, EndpointConfig};
use matprobe::http::HttpClient;
use matprobe::llm::LlmClient;
use matprobe::matrix::{Cell, ExperimentMatrix};
use matprobe::prompt::QuestionType;
use matprobe::runner::{self, RunOptions};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "matprobe",
    about = "Material-selection survey harness — queries LLM inference endpoints across an experiment matrix and exports labeled CSV datasets"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the full experiment: every endpoint × strategy, one CSV table each
    Run {
        /// Path to config file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Output directory override
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Restrict to one strategy: agentic, zero-shot, few-shot, parallel, chain-of-thought
        #[arg(long)]
        question_type: Option<QuestionType>,

        /// Survey a single endpoint at this base URL instead of the configured list
        #[arg(long)]
        endpoint_url: Option<String>,

        /// Model id sent to the overridden endpoint
        #[arg(long)]
        model_id: Option<String>,

        /// Label for the overridden endpoint (used in filenames)
        #[arg(long)]
        label: Option<String>,
    },

    /// Ask a single question and print the answer (debugging aid)
    Ask {
        /// Path to config file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Design to ask about, e.g. "safety helmet"
        #[arg(long)]
        design: String,

        /// Desired property, e.g. "lightweight"
        #[arg(long)]
        criterion: String,

        /// Candidate material; defaults to the full list for the parallel strategy
        #[arg(long)]
        material: Option<String>,

        /// Strategy to use
        #[arg(long, default_value = "zero-shot")]
        question_type: QuestionType,

        /// Endpoint base URL override
        #[arg(long)]
        endpoint_url: Option<String>,

        /// Model id sent to the overridden endpoint
        #[arg(long)]
        model_id: Option<String>,
    },

    /// Print the experiment plan as JSON (no network calls)
    Plan {
        /// Path to config file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matprobe=info".parse().unwrap()),
        )
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            out,
            question_type,
            endpoint_url,
            model_id,
            label,
        } => {
            let config = load_config(&config)?;
            let opts = RunOptions {
                endpoint: make_endpoint_override(endpoint_url, model_id, label),
                question_type,
                out_dir: out,
            };
            runner::run_experiment(config, opts).await
        }
        Command::Ask {
            config,
            design,
            criterion,
            material,
            question_type,
            endpoint_url,
            model_id,
        } => {
            let config = load_config(&config)?;
            ask(config, design, criterion, material, question_type, endpoint_url, model_id).await
        }
        Command::Plan { config } => {
            let config = load_config(&config)?;
            print_plan(&config)
        }
    }
}

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Ok(Config::load(path)?)
    } else {
        info!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

fn make_endpoint_override(
    url: Option<String>,
    model_id: Option<String>,
    label: Option<String>,
) -> Option<EndpointConfig> {
    let url = url?;
    Some(EndpointConfig {
        label: label.unwrap_or_else(|| "custom".into()),
        url: Some(url),
        url_env: None,
        model_id,
    })
}

async fn ask(
    config: Config,
    design: String,
    criterion: String,
    material: Option<String>,
    question_type: QuestionType,
    endpoint_url: Option<String>,
    model_id: Option<String>,
) -> Result<()> {
    let matrix = ExperimentMatrix::from_config(&config.matrix);
    let material = match (material, question_type) {
        (Some(m), _) => m,
        (None, QuestionType::Parallel) => matrix.joined_materials(),
        (None, _) => bail!("--material is required for the {question_type} strategy"),
    };

    let endpoint = match make_endpoint_override(endpoint_url, model_id, None) {
        Some(ep) => ep,
        None => config
            .endpoints
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no endpoints configured"))?,
    };

    let llm = LlmClient::from_endpoint(&endpoint, &config.generation)?;
    let http = HttpClient::new("matprobe/0.1.0")?;
    let cell = Cell {
        design,
        criterion,
        material,
        question_type,
    };

    let answer =
        runner::answer_cell(&llm, &http, &config.generation, &config.agent, &cell).await?;
    println!("{answer}");
    Ok(())
}

#[derive(Serialize)]
struct Plan {
    endpoints: Vec<String>,
    designs: Vec<String>,
    criteria: Vec<String>,
    materials: Vec<String>,
    tables: Vec<TablePlan>,
    total_rows: usize,
    total_llm_calls: usize,
}

#[derive(Serialize)]
struct TablePlan {
    question_type: String,
    rows: usize,
    llm_calls: usize,
}

fn print_plan(config: &Config) -> Result<()> {
    config.validate()?;
    let matrix = ExperimentMatrix::from_config(&config.matrix);

    let tables: Vec<TablePlan> = config
        .matrix
        .question_types
        .iter()
        .map(|&qt| TablePlan {
            question_type: qt.to_string(),
            rows: matrix.cell_count(qt),
            llm_calls: matrix.call_count(qt),
        })
        .collect();

    let endpoint_count = config.endpoints.len();
    let plan = Plan {
        endpoints: config.endpoints.iter().map(|e| e.label.clone()).collect(),
        designs: config.matrix.designs.clone(),
        criteria: config.matrix.criteria.clone(),
        materials: config.matrix.materials.clone(),
        total_rows: tables.iter().map(|t| t.rows).sum::<usize>() * endpoint_count,
        total_llm_calls: tables.iter().map(|t| t.llm_calls).sum::<usize>() * endpoint_count,
        tables,
    };

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

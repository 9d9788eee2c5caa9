use crate::error::{Error, Result};
use crate::prompt::QuestionType;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<EndpointConfig>,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub matrix: MatrixConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// One inference endpoint to survey, labeled by model size.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Label used in output filenames and logs (e.g. "14B").
    pub label: String,
    /// Base URL up to and including `/v1`. Takes precedence over `url_env`.
    pub url: Option<String>,
    /// Environment variable holding the base URL.
    pub url_env: Option<String>,
    /// Model id sent in the request body. TGI endpoints accept "tgi" or
    /// none at all.
    pub model_id: Option<String>,
}

impl EndpointConfig {
    pub fn resolve_url(&self) -> Result<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        if let Some(var) = &self.url_env {
            return std::env::var(var).map_err(|_| {
                Error::config(format!(
                    "endpoint '{}': env var {var} is not set",
                    self.label
                ))
            });
        }
        Err(Error::config(format!(
            "endpoint '{}': neither url nor url_env is set",
            self.label
        )))
    }
}

/// Sampling parameters sent with every chat completion request.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_stop")]
    pub stop: Vec<String>,
    /// Token cap for the chain-of-thought reasoning stage.
    #[serde(default = "default_reasoning_max_tokens")]
    pub reasoning_max_tokens: u32,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            stop: default_stop(),
            reasoning_max_tokens: default_reasoning_max_tokens(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Configuration for the agentic strategy's ReAct loop.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Number of Wikipedia search hits to include per lookup.
    #[serde(default = "default_search_results")]
    pub search_results: usize,
    /// Character cap on a single observation fed back to the model.
    #[serde(default = "default_max_observation_chars")]
    pub max_observation_chars: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            search_results: default_search_results(),
            max_observation_chars: default_max_observation_chars(),
        }
    }
}

/// The experiment axes. Defaults reproduce the published survey.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixConfig {
    #[serde(default = "default_designs")]
    pub designs: Vec<String>,
    #[serde(default = "default_criteria")]
    pub criteria: Vec<String>,
    #[serde(default = "default_materials")]
    pub materials: Vec<String>,
    #[serde(default = "default_question_types")]
    pub question_types: Vec<QuestionType>,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            designs: default_designs(),
            criteria: default_criteria(),
            materials: default_materials(),
            question_types: default_question_types(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Filename prefix, conventionally the model family.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            prefix: default_prefix(),
        }
    }
}

// Defaults
fn default_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig {
            label: "14B".into(),
            url: None,
            url_env: Some("14B_INFERENCE_URL".into()),
            model_id: Some("tgi".into()),
        },
        EndpointConfig {
            label: "32B".into(),
            url: None,
            url_env: Some("32B_INFERENCE_URL".into()),
            model_id: None,
        },
    ]
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_temperature() -> f64 {
    0.6
}
fn default_stop() -> Vec<String> {
    vec!["Task".into()]
}
fn default_reasoning_max_tokens() -> u32 {
    200
}
fn default_api_key_env() -> String {
    "HUGGINGFACE_API_TOKEN".into()
}
fn default_max_iterations() -> u32 {
    10
}
fn default_search_results() -> usize {
    3
}
fn default_max_observation_chars() -> usize {
    4000
}
fn default_designs() -> Vec<String> {
    vec![
        "kitchen utensil grip".into(),
        "safety helmet".into(),
        "underwater component".into(),
        "spacecraft component".into(),
    ]
}
fn default_criteria() -> Vec<String> {
    vec![
        "lightweight".into(),
        "heat resistant".into(),
        "corrosion resistant".into(),
        "high strength".into(),
    ]
}
fn default_materials() -> Vec<String> {
    vec![
        "steel".into(),
        "aluminum".into(),
        "titanium".into(),
        "glass".into(),
        "wood".into(),
        "thermoplastic".into(),
        "thermoset".into(),
        "elastomer".into(),
        "composite".into(),
    ]
}
fn default_question_types() -> Vec<QuestionType> {
    QuestionType::ALL.to_vec()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("results/data")
}
fn default_prefix() -> String {
    "qwen".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            generation: GenerationConfig::default(),
            agent: AgentConfig::default(),
            matrix: MatrixConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config {}: {e}", path.display())))?;
        toml::from_str(&content).map_err(|e| Error::config(format!("Failed to parse config: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(Error::config("no endpoints configured"));
        }
        for axis in [
            ("designs", &self.matrix.designs),
            ("criteria", &self.matrix.criteria),
            ("materials", &self.matrix.materials),
        ] {
            if axis.1.is_empty() {
                return Err(Error::config(format!("matrix.{} is empty", axis.0)));
            }
        }
        if self.matrix.question_types.is_empty() {
            return Err(Error::config("matrix.question_types is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let toml = r#"
[[endpoints]]
label = "14B"
url = "https://example.com/v1"
model_id = "tgi"

[[endpoints]]
label = "72B"
url_env = "72B_INFERENCE_URL"

[generation]
max_tokens = 500
temperature = 0.2
stop = ["Task", "Question"]
api_key_env = "HF_TOKEN"

[agent]
max_iterations = 5
search_results = 2

[matrix]
designs = ["drone arm"]
criteria = ["lightweight"]
materials = ["aluminum", "composite"]
question_types = ["zero-shot", "chain-of-thought"]

[output]
dir = "out"
prefix = "llama"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.endpoints[0].resolve_url().unwrap(), "https://example.com/v1");
        assert_eq!(config.generation.max_tokens, 500);
        assert_eq!(config.generation.stop.len(), 2);
        assert_eq!(config.agent.max_iterations, 5);
        assert_eq!(
            config.matrix.question_types,
            vec![QuestionType::ZeroShot, QuestionType::ChainOfThought]
        );
        assert_eq!(config.output.prefix, "llama");
        config.validate().unwrap();
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.endpoints[0].label, "14B");
        assert_eq!(config.generation.max_tokens, 1000);
        assert!((config.generation.temperature - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.generation.stop, vec!["Task".to_string()]);
        assert_eq!(config.agent.max_iterations, 10);
        assert_eq!(config.matrix.designs.len(), 4);
        assert_eq!(config.matrix.criteria.len(), 4);
        assert_eq!(config.matrix.materials.len(), 9);
        assert_eq!(config.matrix.question_types.len(), 5);
        assert_eq!(config.output.prefix, "qwen");
    }

    #[test]
    fn endpoint_without_url_fails_resolution() {
        let ep = EndpointConfig {
            label: "test".into(),
            url: None,
            url_env: None,
            model_id: None,
        };
        assert!(ep.resolve_url().is_err());
    }

    #[test]
    fn validate_rejects_empty_axis() {
        let mut config = Config::default();
        config.matrix.materials.clear();
        assert!(config.validate().is_err());
    }
}

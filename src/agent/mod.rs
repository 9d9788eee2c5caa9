//! ReAct-style agent for the agentic survey strategy.
//!
//! The model reasons in plain text: it emits `Thought:` lines, requests a
//! Wikipedia lookup with `Action:` / `Action Input:` lines, and the loop
//! feeds the result back as an `Observation:` until a `Final Answer:`
//! appears or the iteration cap is hit. Generation stops at the
//! `Observation:` marker so the model cannot hallucinate tool output.

pub mod tools;

use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::llm::{ChatMessage, LlmClient};
use tracing::{debug, info, warn};

pub const SYSTEM_PROMPT: &str = r#"You are a material science research assistant. You answer questions about material suitability by looking up real material properties on Wikipedia before committing to an answer.

You have one tool:

wikipedia_search: searches Wikipedia and returns the introduction of the best-matching article plus other matching titles. Input is a plain search query, e.g. 'titanium corrosion resistance'.

Work in steps. In each step, write your reasoning and then either call the tool or give your final answer, using exactly this format:

Thought: what you want to find out next
Action: wikipedia_search
Action Input: your search query

After each action you will receive an observation with the search results. When you have enough information, finish with:

Thought: your concluding reasoning
Final Answer: your answer to the question

Rules:
- Look up the material's relevant properties before answering.
- Never invent an observation; wait for it.
- The final answer must follow the format requested in the question."#;

/// Counters for one agent run.
#[derive(Debug, Default)]
pub struct AgentStats {
    pub iterations: u32,
    pub tool_calls: u32,
}

/// One parsed assistant turn.
#[derive(Debug, PartialEq)]
enum Step {
    Act { tool: String, input: String },
    Finish(String),
    /// Neither an action nor a final-answer marker; the text is taken as
    /// the answer.
    Bare,
}

/// Run the agent on a single question until it produces a final answer.
///
/// Returns the answer text and run stats. Hitting the iteration cap
/// returns the last assistant text rather than failing the whole run.
pub async fn run(
    llm: &LlmClient,
    http: &HttpClient,
    question: &str,
    config: &AgentConfig,
) -> Result<(String, AgentStats)> {
    let mut params = llm.default_params();
    params.stop = vec!["Observation:".into()];

    let mut messages = vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(question),
    ];
    let mut stats = AgentStats::default();
    let mut last_text = String::new();

    info!(max_iterations = config.max_iterations, "starting agent run");

    while stats.iterations < config.max_iterations {
        let response = llm.chat_with(&messages, &params).await?;
        stats.iterations += 1;
        last_text = response.clone();

        match parse_step(&response) {
            Step::Finish(answer) => {
                debug!(iterations = stats.iterations, "agent finished");
                return Ok((answer, stats));
            }
            Step::Act { tool, input } => {
                stats.tool_calls += 1;
                debug!(%tool, %input, "executing tool");
                let (observation, is_error) = tools::dispatch(http, config, &tool, &input).await;
                if is_error {
                    debug!(%tool, "tool returned an error observation");
                }
                messages.push(ChatMessage::assistant(response));
                messages.push(ChatMessage::user(format!("Observation: {observation}")));
            }
            Step::Bare => {
                debug!("agent answered without protocol markers, taking text as answer");
                return Ok((response, stats));
            }
        }
    }

    warn!(
        iterations = stats.iterations,
        "hit iteration cap, taking last assistant text as answer"
    );
    if last_text.is_empty() {
        return Err(Error::parse("agent produced no output"));
    }
    Ok((last_text, stats))
}

/// Classify an assistant turn by its protocol markers.
///
/// `Final Answer:` wins over a trailing action request, matching how the
/// model signals completion mid-thought.
fn parse_step(text: &str) -> Step {
    if let Some(idx) = text.find("Final Answer:") {
        let answer = text[idx + "Final Answer:".len()..].trim();
        return Step::Finish(answer.to_string());
    }

    let mut tool = None;
    let mut input = None;
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Action:") {
            tool = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("Action Input:") {
            input = Some(rest.trim().to_string());
        }
    }

    if let (Some(tool), Some(input)) = (tool, input)
        && !tool.is_empty()
    {
        return Step::Act { tool, input };
    }

    Step::Bare
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_action_request() {
        let turn = "Thought: I should check titanium's density.\n\
                    Action: wikipedia_search\n\
                    Action Input: titanium density strength";
        assert_eq!(
            parse_step(turn),
            Step::Act {
                tool: "wikipedia_search".into(),
                input: "titanium density strength".into(),
            }
        );
    }

    #[test]
    fn parses_final_answer() {
        let turn = "Thought: titanium is light and very strong.\nFinal Answer: 9";
        assert_eq!(parse_step(turn), Step::Finish("9".into()));
    }

    #[test]
    fn final_answer_wins_over_action() {
        let turn = "Final Answer: 7\nAction: wikipedia_search\nAction Input: more";
        assert!(matches!(parse_step(turn), Step::Finish(a) if a.starts_with('7')));
    }

    #[test]
    fn bare_text_is_taken_as_answer() {
        assert_eq!(parse_step("I would rate it 8 out of 10."), Step::Bare);
    }

    #[test]
    fn action_without_input_is_bare() {
        assert_eq!(parse_step("Action: wikipedia_search"), Step::Bare);
    }
}

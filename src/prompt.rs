//! Prompt compilation for the five survey strategies.
//!
//! Every strategy asks the same underlying question — how well does a
//! candidate material suit a design under one criterion — but frames it
//! differently: direct, with worked examples, for all materials at once,
//! in two reasoning stages, or as a tool-using agent task.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prompting strategy. The serialized names double as dataset labels
/// and output filename components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    Agentic,
    ZeroShot,
    FewShot,
    Parallel,
    ChainOfThought,
}

impl QuestionType {
    pub const ALL: [QuestionType; 5] = [
        QuestionType::Agentic,
        QuestionType::ZeroShot,
        QuestionType::FewShot,
        QuestionType::Parallel,
        QuestionType::ChainOfThought,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agentic => "agentic",
            Self::ZeroShot => "zero-shot",
            Self::FewShot => "few-shot",
            Self::Parallel => "parallel",
            Self::ChainOfThought => "chain-of-thought",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "agentic" => Ok(Self::Agentic),
            "zero-shot" => Ok(Self::ZeroShot),
            "few-shot" => Ok(Self::FewShot),
            "parallel" => Ok(Self::Parallel),
            "chain-of-thought" => Ok(Self::ChainOfThought),
            other => Err(Error::config(format!(
                "unknown question type '{other}' (expected one of: agentic, \
                 zero-shot, few-shot, parallel, chain-of-thought)"
            ))),
        }
    }
}

const PREAMBLE: &str = "You are a material science and design engineer expert.";

const FEW_SHOT_EXAMPLES: &str = "\
Here are examples of material ratings for other designs:

Question: You are tasked with designing a bicycle frame. The design should be lightweight. How well would aluminum perform in this application, on a scale of 0 to 10?
Answer: 8

Question: You are tasked with designing a boat hull. The design should be corrosion resistant. How well would steel perform in this application, on a scale of 0 to 10?
Answer: 3

Question: You are tasked with designing an oven door handle. The design should be heat resistant. How well would elastomer perform in this application, on a scale of 0 to 10?
Answer: 2";

/// Build the user prompt for one matrix cell.
///
/// For [`QuestionType::Parallel`] the `material` argument is the
/// comma-joined full material list. For [`QuestionType::ChainOfThought`]
/// the first stage passes `reasoning = None` and collects free-text
/// reasoning; the second stage passes it back to get the final number.
pub fn compile_question(
    design: &str,
    criterion: &str,
    material: &str,
    question_type: QuestionType,
    reasoning: Option<&str>,
) -> String {
    let task = format!("You are tasked with designing a {design}. The design should be {criterion}.");

    match question_type {
        QuestionType::ZeroShot => format!(
            "{PREAMBLE}\n\n{task}\n\nHow well do you think {material} would perform \
             in this application? Answer on a scale of 0 to 10, where 0 means \
             unsatisfactory and 10 means excellent. Answer with a single number. \
             Do not explain."
        ),
        QuestionType::FewShot => format!(
            "{PREAMBLE}\n\n{FEW_SHOT_EXAMPLES}\n\n{task}\n\nHow well would \
             {material} perform in this application, on a scale of 0 to 10, where \
             0 means unsatisfactory and 10 means excellent? Answer with a single \
             number. Do not explain."
        ),
        QuestionType::Parallel => format!(
            "{PREAMBLE}\n\n{task}\n\nHow well do you think each of the following \
             materials would perform in this application: {material}? Rate each \
             material on a scale of 0 to 10, where 0 means unsatisfactory and 10 \
             means excellent. Respond with one line per material in the form \
             'material: score'. Do not explain."
        ),
        QuestionType::ChainOfThought => match reasoning {
            None => format!(
                "{PREAMBLE}\n\n{task}\n\nThink step by step about the properties \
                 of {material} that matter for this application and how well it \
                 would perform. Keep your reasoning brief. Do not give a rating yet."
            ),
            Some(text) => format!(
                "{PREAMBLE}\n\n{task}\n\nHere is some reasoning about using \
                 {material} for this design:\n\n{text}\n\nBased on this reasoning, \
                 how well do you think {material} would perform in this \
                 application? Answer on a scale of 0 to 10, where 0 means \
                 unsatisfactory and 10 means excellent. Answer with a single \
                 number. Do not explain."
            ),
        },
        QuestionType::Agentic => format!(
            "{task}\n\nUse the Wikipedia search tool to look up the relevant \
             properties of {material}, then decide how well it would perform in \
             this application. Your final answer must be a single integer on a \
             scale of 0 to 10, where 0 means unsatisfactory and 10 means excellent."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_shot_mentions_all_parts() {
        let q = compile_question(
            "safety helmet",
            "lightweight",
            "titanium",
            QuestionType::ZeroShot,
            None,
        );
        assert!(q.contains("safety helmet"));
        assert!(q.contains("lightweight"));
        assert!(q.contains("titanium"));
        assert!(q.contains("0 to 10"));
        assert!(q.starts_with(PREAMBLE));
    }

    #[test]
    fn few_shot_includes_worked_examples() {
        let q = compile_question(
            "spacecraft component",
            "heat resistant",
            "composite",
            QuestionType::FewShot,
            None,
        );
        assert!(q.contains("Answer: 8"));
        assert!(q.contains("composite"));
    }

    #[test]
    fn parallel_takes_joined_material_list() {
        let q = compile_question(
            "underwater component",
            "corrosion resistant",
            "steel, aluminum, titanium",
            QuestionType::Parallel,
            None,
        );
        assert!(q.contains("steel, aluminum, titanium"));
        assert!(q.contains("one line per material"));
    }

    #[test]
    fn chain_of_thought_has_two_stages() {
        let stage1 = compile_question(
            "kitchen utensil grip",
            "heat resistant",
            "wood",
            QuestionType::ChainOfThought,
            None,
        );
        assert!(stage1.contains("step by step"));
        assert!(!stage1.contains("single number"));

        let stage2 = compile_question(
            "kitchen utensil grip",
            "heat resistant",
            "wood",
            QuestionType::ChainOfThought,
            Some("Wood chars above 200C but insulates well."),
        );
        assert!(stage2.contains("Wood chars above 200C"));
        assert!(stage2.contains("single number"));
    }

    #[test]
    fn agentic_instructs_tool_use() {
        let q = compile_question(
            "safety helmet",
            "high strength",
            "glass",
            QuestionType::Agentic,
            None,
        );
        assert!(q.contains("Wikipedia search tool"));
        assert!(q.contains("single integer"));
    }

    #[test]
    fn question_type_names_round_trip() {
        for qt in QuestionType::ALL {
            assert_eq!(qt.as_str().parse::<QuestionType>().unwrap(), qt);
        }
        assert!("one-shot".parse::<QuestionType>().is_err());
    }
}

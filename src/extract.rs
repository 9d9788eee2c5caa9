//! Numeric answer extraction.
//!
//! Deliberately naive: the dataset records the first integer that appears
//! in the model's answer, nothing more. Range checking and answer
//! validation are out of scope for the harness.

use crate::error::{Error, Result};
use fancy_regex::Regex;
use std::sync::OnceLock;

fn digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// Pull the first integer out of a free-text answer.
pub fn extract_rating(text: &str) -> Result<u32> {
    let m = digits()
        .find(text)
        .map_err(|e| Error::parse(format!("rating regex: {e}")))?
        .ok_or_else(|| {
            Error::extract(format!(
                "no digits in response: {}",
                text.chars().take(120).collect::<String>()
            ))
        })?;

    m.as_str()
        .parse::<u32>()
        .map_err(|e| Error::extract(format!("parse '{}': {e}", m.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_number() {
        assert_eq!(extract_rating("8").unwrap(), 8);
    }

    #[test]
    fn number_with_prose() {
        assert_eq!(extract_rating("I would rate it 7 out of 10.").unwrap(), 7);
        assert_eq!(extract_rating("Rating: 10.").unwrap(), 10);
    }

    #[test]
    fn first_integer_wins() {
        // Naive by design: a restated scale is picked up before the answer.
        assert_eq!(extract_rating("On a scale of 0 to 10: 8").unwrap(), 0);
    }

    #[test]
    fn no_digits_is_an_error() {
        let err = extract_rating("It depends on the alloy.").unwrap_err();
        assert!(matches!(err, Error::Extract(_)));
    }
}

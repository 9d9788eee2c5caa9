//! Wikipedia lookup tool for the agentic strategy.
//!
//! One tool, `wikipedia_search`: runs a MediaWiki full-text search, then
//! fetches the plain-text intro of the top hit. Snippets come back with
//! `<span class="searchmatch">` markup which is stripped before the text
//! is fed to the model as an observation.

use crate::config::AgentConfig;
use crate::error::Result;
use crate::http::HttpClient;
use scraper::Html;
use serde::Deserialize;
use tracing::debug;

pub const WIKIPEDIA_SEARCH: &str = "wikipedia_search";

const API_URL: &str = "https://en.wikipedia.org/w/api.php";

#[derive(Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
    snippet: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    query: ExtractQuery,
}

#[derive(Deserialize)]
struct ExtractQuery {
    pages: Vec<ExtractPage>,
}

#[derive(Deserialize)]
struct ExtractPage {
    title: String,
    extract: Option<String>,
}

/// Dispatch a tool call by name. Returns `(observation, is_error)`.
pub async fn dispatch(
    http: &HttpClient,
    config: &AgentConfig,
    tool_name: &str,
    input: &str,
) -> (String, bool) {
    match tool_name {
        WIKIPEDIA_SEARCH => match search(http, config, input).await {
            Ok(text) => (text, false),
            Err(e) => (format!("Search failed: {e}"), true),
        },
        other => (
            format!("Unknown tool: {other}. Only '{WIKIPEDIA_SEARCH}' is available."),
            true,
        ),
    }
}

async fn search(http: &HttpClient, config: &AgentConfig, query: &str) -> Result<String> {
    debug!(query, "wikipedia_search");

    let limit = config.search_results.to_string();
    let resp: SearchResponse = http
        .get_json_query(
            API_URL,
            &[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ],
        )
        .await?;

    let hits = resp.query.search;
    if hits.is_empty() {
        return Ok(format!("No Wikipedia results for '{query}'."));
    }

    let mut out = String::new();

    // Intro extract of the top hit carries most of the signal.
    if let Some(top) = hits.first() {
        let extract: ExtractResponse = http
            .get_json_query(
                API_URL,
                &[
                    ("action", "query"),
                    ("prop", "extracts"),
                    ("exintro", "1"),
                    ("explaintext", "1"),
                    ("titles", top.title.as_str()),
                    ("format", "json"),
                    ("formatversion", "2"),
                ],
            )
            .await?;

        if let Some(page) = extract.query.pages.first()
            && let Some(text) = &page.extract
        {
            out.push_str(&format!("## {}\n\n{}\n", page.title, text.trim()));
        }
    }

    if hits.len() > 1 {
        out.push_str("\nOther matches:\n");
        for hit in &hits[1..] {
            out.push_str(&format!("- {}: {}\n", hit.title, strip_tags(&hit.snippet)));
        }
    }

    Ok(truncate(out, config.max_observation_chars))
}

fn strip_tags(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .collect::<String>()
}

fn truncate(s: String, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s;
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str("\n... [truncated]");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_searchmatch_markup() {
        let snippet = r#"<span class="searchmatch">Titanium</span> is a strong, low-density metal"#;
        assert_eq!(
            strip_tags(snippet),
            "Titanium is a strong, low-density metal"
        );
    }

    #[test]
    fn truncation_appends_marker() {
        let long = "x".repeat(50);
        let out = truncate(long, 10);
        assert!(out.starts_with("xxxxxxxxxx"));
        assert!(out.ends_with("[truncated]"));

        let short = truncate("short".into(), 10);
        assert_eq!(short, "short");
    }

    #[test]
    fn search_response_parses() {
        let raw = r#"{"query":{"search":[{"title":"Steel","snippet":"<span>Steel</span> is an alloy"}]}}"#;
        let resp: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.query.search[0].title, "Steel");
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_observation() {
        let http = HttpClient::new("test").unwrap();
        let config = AgentConfig::default();
        let (obs, is_error) = dispatch(&http, &config, "read_file", "foo").await;
        assert!(is_error);
        assert!(obs.contains("wikipedia_search"));
    }
}

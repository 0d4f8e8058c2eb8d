//! Web search tool backed by DuckDuckGo's HTML endpoint (no API key needed).

use anyhow::Result;
use serde_json::Value;
use std::time::Instant;

use super::markup::to_plain_text;
use super::{fetch_text, parse_query, truncate_chars, Tool, ToolError, ToolResult};
use crate::config::ToolSettings;

const SERVICE: &str = "DuckDuckGo";

/// Returned when the page holds no usable results.
pub const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";

/// One organic result scraped from the results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

pub struct WebSearchTool {
    client: reqwest::Client,
    base_url: String,
    top_k: usize,
    max_chars: usize,
}

impl WebSearchTool {
    pub fn new(client: reqwest::Client, settings: &ToolSettings) -> Self {
        Self {
            client,
            base_url: settings.search_base_url().to_string(),
            top_k: settings.top_k(),
            max_chars: settings.max_chars(),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/html/?q={}", self.base_url, urlencoding::encode(query))
    }
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the web with DuckDuckGo. Useful for current events and anything \
recent or niche. Input should be a search query."
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let query = parse_query(input)?;
        let started = Instant::now();
        let html = fetch_text(&self.client, SERVICE, &self.search_url(&query)).await?;

        if html.contains("anomaly-modal") {
            return Err(ToolError::Rejected {
                service: SERVICE,
                reason: "bot check triggered, try again later".into(),
            }
            .into());
        }

        let hits = parse_results(&html, self.top_k);
        tracing::debug!(
            query = %query,
            hits = hits.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "web search finished"
        );
        Ok(ToolResult::success(format_hits(&hits, self.max_chars)))
    }
}

/// Extracts up to `limit` results (title, snippet, link) from a results page.
///
/// Sponsored blocks and results without a title are skipped.
pub fn parse_results(html: &str, limit: usize) -> Vec<SearchHit> {
    html.split("class=\"result results_links")
        .skip(1)
        .filter(|block| !block.contains("result--ad"))
        .filter_map(parse_block)
        .take(limit)
        .collect()
}

fn parse_block(block: &str) -> Option<SearchHit> {
    let anchor = block.split_once("class=\"result__a\"")?.1;
    let (attrs, rest) = anchor.split_once('>')?;
    let url = attrs
        .split("href=\"")
        .nth(1)
        .and_then(|s| s.split('"').next())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let title = to_plain_text(rest.split("</a>").next()?);
    if title.is_empty() {
        return None;
    }

    let snippet = block
        .split("class=\"result__snippet\"")
        .nth(1)
        .and_then(|s| s.split_once('>'))
        .map(|(_, rest)| {
            let end = ["</a>", "</td>", "</div>"]
                .iter()
                .filter_map(|tag| rest.find(tag))
                .min()
                .unwrap_or(rest.len());
            to_plain_text(&rest[..end])
        })
        .unwrap_or_default();

    Some(SearchHit {
        title,
        snippet,
        url,
    })
}

/// Joins the hits' snippets (falling back to titles) and applies the
/// character cap.
pub fn format_hits(hits: &[SearchHit], max_chars: usize) -> String {
    let text = hits
        .iter()
        .map(|h| {
            if h.snippet.is_empty() {
                h.title.as_str()
            } else {
                h.snippet.as_str()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    if text.trim().is_empty() {
        return NO_RESULTS.to_string();
    }
    truncate_chars(&text, max_chars)
}

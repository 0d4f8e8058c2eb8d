//! Wikipedia lookup through the MediaWiki action API.
//!
//! A call runs a full-text search for the query, then fetches the plain-text
//! introduction of each matching page.

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;

use super::{fetch_text, parse_query, truncate_chars, Tool, ToolError, ToolResult};
use crate::config::ToolSettings;
use crate::constants::MAX_QUERY_LENGTH;

const SERVICE: &str = "Wikipedia";

/// Returned when no page matched or every match had an empty summary.
pub const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: bool,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    info: String,
}

/// A page title with its introduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub title: String,
    pub summary: String,
}

pub struct WikipediaTool {
    client: reqwest::Client,
    api_url: String,
    top_k: usize,
    max_chars: usize,
}

impl WikipediaTool {
    pub fn new(client: reqwest::Client, settings: &ToolSettings) -> Self {
        let base = match settings.base_url.as_deref() {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.wikipedia.org", settings.lang()),
        };
        Self {
            client,
            api_url: format!("{}/w/api.php", base),
            top_k: settings.top_k(),
            max_chars: settings.max_chars(),
        }
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}?action=query&list=search&format=json&formatversion=2&srprop=&srlimit={}&srsearch={}",
            self.api_url,
            self.top_k,
            urlencoding::encode(query)
        )
    }

    fn extract_url(&self, title: &str) -> String {
        format!(
            "{}?action=query&prop=extracts&exintro=1&explaintext=1&redirects=1&format=json&formatversion=2&titles={}",
            self.api_url,
            urlencoding::encode(title)
        )
    }

    async fn page_summary(&self, title: &str) -> Result<Option<PageSummary>, ToolError> {
        let body = fetch_text(&self.client, SERVICE, &self.extract_url(title)).await?;
        parse_extract(&body)
    }
}

#[async_trait::async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Look up Wikipedia. Useful for general questions about people, places, \
companies, facts, historical events, or other subjects. Input should be a search query."
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let query = parse_query(input)?;
        let query = truncate_chars(&query, MAX_QUERY_LENGTH);
        let started = Instant::now();

        let body = fetch_text(&self.client, SERVICE, &self.search_url(&query)).await?;
        let titles = parse_search(&body)?;

        let mut pages = Vec::new();
        for title in titles.iter().take(self.top_k) {
            // A page that vanished between search and fetch is skipped.
            if let Some(page) = self.page_summary(title).await? {
                pages.push(page);
            }
        }

        tracing::debug!(
            query = %query,
            pages = pages.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "wikipedia lookup finished"
        );
        Ok(ToolResult::success(format_pages(&pages, self.max_chars)))
    }
}

/// Titles from a `list=search` response.
pub fn parse_search(body: &str) -> Result<Vec<String>, ToolError> {
    let response: SearchResponse = serde_json::from_str(body).map_err(|e| ToolError::Parse {
        service: SERVICE,
        reason: e.to_string(),
    })?;
    if let Some(err) = response.error {
        return Err(ToolError::Rejected {
            service: SERVICE,
            reason: err.info,
        });
    }
    Ok(response
        .query
        .map(|q| q.search.into_iter().map(|e| e.title).collect())
        .unwrap_or_default())
}

/// The first existing page with a non-empty extract in a `prop=extracts` response.
pub fn parse_extract(body: &str) -> Result<Option<PageSummary>, ToolError> {
    let response: ExtractResponse =
        serde_json::from_str(body).map_err(|e| ToolError::Parse {
            service: SERVICE,
            reason: e.to_string(),
        })?;
    Ok(response
        .query
        .into_iter()
        .flat_map(|q| q.pages)
        .filter(|p| !p.missing)
        .find_map(|p| {
            let summary = p.extract?.trim().to_string();
            (!summary.is_empty()).then_some(PageSummary {
                title: p.title,
                summary,
            })
        }))
}

/// Formats pages as `Page: ...` / `Summary: ...` blocks and applies the cap.
pub fn format_pages(pages: &[PageSummary], max_chars: usize) -> String {
    if pages.is_empty() {
        return NO_RESULTS.to_string();
    }
    let text = pages
        .iter()
        .map(|p| format!("Page: {}\nSummary: {}", p.title, p.summary))
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_chars(&text, max_chars)
}

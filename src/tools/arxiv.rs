//! Arxiv lookup through the arXiv export API (Atom feed).

use anyhow::Result;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Instant;

use super::markup::{collapse_whitespace, decode_entities};
use super::{fetch_text, parse_query, truncate_chars, Tool, ToolError, ToolResult};
use crate::config::ToolSettings;
use crate::constants::MAX_QUERY_LENGTH;

const SERVICE: &str = "Arxiv";

/// Returned when the feed holds no entries.
pub const NO_RESULTS: &str = "No good Arxiv Result was found";

static ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<entry\b[^>]*>(.*?)</entry>").unwrap());
static AUTHOR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<author\b[^>]*>\s*<name>(.*?)</name>").unwrap());
/// New-style (`2103.00020v2`) and old-style (`hep-th/9901001`) identifiers.
static ARXIV_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{4}\.\d{4,5}|[a-z\-]+(?:\.[A-Z]{2})?/\d{7})(?:v\d+)?$").unwrap()
});

/// One paper from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    pub published: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
}

pub struct ArxivTool {
    client: reqwest::Client,
    base_url: String,
    top_k: usize,
    max_chars: usize,
}

impl ArxivTool {
    pub fn new(client: reqwest::Client, settings: &ToolSettings) -> Self {
        Self {
            client,
            base_url: settings.arxiv_base_url().to_string(),
            top_k: settings.top_k(),
            max_chars: settings.max_chars(),
        }
    }

    /// Builds the query URL, using `id_list` when the query is only identifiers.
    pub fn query_url(&self, query: &str) -> String {
        match identifiers(query) {
            Some(ids) => format!(
                "{}/api/query?id_list={}&max_results={}",
                self.base_url,
                urlencoding::encode(&ids.join(",")),
                self.top_k
            ),
            None => format!(
                "{}/api/query?search_query={}&start=0&max_results={}",
                self.base_url,
                urlencoding::encode(query),
                self.top_k
            ),
        }
    }
}

#[async_trait::async_trait]
impl Tool for ArxivTool {
    fn name(&self) -> &str {
        "arxiv"
    }

    fn description(&self) -> &str {
        "Search arxiv.org. Useful for questions about physics, mathematics, computer \
science, quantitative biology, quantitative finance, statistics, electrical engineering \
and economics from scientific articles. Input should be a search query or an arXiv id."
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let query = parse_query(input)?;
        let query = truncate_chars(&query, MAX_QUERY_LENGTH);
        let started = Instant::now();

        let feed = fetch_text(&self.client, SERVICE, &self.query_url(&query)).await?;
        let papers = parse_feed(&feed)?;

        tracing::debug!(
            query = %query,
            papers = papers.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "arxiv lookup finished"
        );
        let papers: Vec<Paper> = papers.into_iter().take(self.top_k).collect();
        Ok(ToolResult::success(format_papers(&papers, self.max_chars)))
    }
}

/// Returns the identifiers when every whitespace-separated token is one.
pub fn identifiers(query: &str) -> Option<Vec<&str>> {
    let ids: Vec<&str> = query.split_whitespace().collect();
    (!ids.is_empty() && ids.iter().all(|t| ARXIV_ID.is_match(t))).then_some(ids)
}

/// Parses the entries of an arXiv Atom feed.
///
/// The API reports bad queries as a single entry whose id points at
/// `/api/errors`; that becomes [`ToolError::Rejected`].
pub fn parse_feed(feed: &str) -> Result<Vec<Paper>, ToolError> {
    if !feed.contains("<feed") {
        return Err(ToolError::Parse {
            service: SERVICE,
            reason: "response is not an Atom feed".into(),
        });
    }

    let mut papers = Vec::new();
    for caps in ENTRY.captures_iter(feed) {
        let entry = &caps[1];
        let id = element(entry, "id").unwrap_or_default();
        if id.contains("/api/errors") {
            return Err(ToolError::Rejected {
                service: SERVICE,
                reason: element(entry, "summary").unwrap_or_else(|| "unknown error".into()),
            });
        }

        let Some(title) = element(entry, "title") else {
            continue;
        };
        let updated = element(entry, "updated").unwrap_or_default();
        papers.push(Paper {
            published: entry_date(&updated),
            title,
            authors: AUTHOR_NAME
                .captures_iter(entry)
                .map(|c| clean(&c[1]))
                .collect(),
            summary: element(entry, "summary").unwrap_or_default(),
        });
    }
    Ok(papers)
}

/// Text of the first `<name>` child element, cleaned.
fn element(entry: &str, name: &str) -> Option<String> {
    let open = format!("<{}", name);
    let close = format!("</{}>", name);
    let start = entry.find(&open)?;
    let after_open = start + entry[start..].find('>')? + 1;
    let end = after_open + entry[after_open..].find(&close)?;
    Some(clean(&entry[after_open..end]))
}

fn clean(s: &str) -> String {
    collapse_whitespace(&decode_entities(s))
}

/// `YYYY-MM-DD` from an RFC 3339 timestamp; the raw prefix if it doesn't parse.
fn entry_date(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| timestamp.chars().take(10).collect())
}

/// Formats papers as `Published/Title/Authors/Summary` blocks and applies the cap.
pub fn format_papers(papers: &[Paper], max_chars: usize) -> String {
    if papers.is_empty() {
        return NO_RESULTS.to_string();
    }
    let text = papers
        .iter()
        .map(|p| {
            format!(
                "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
                p.published,
                p.title,
                p.authors.join(", "),
                p.summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_chars(&text, max_chars)
}

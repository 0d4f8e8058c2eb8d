pub mod arxiv;
mod markup;
pub mod rig_adapter;
pub mod web_search;
pub mod wikipedia;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use arxiv::ArxivTool;
use web_search::WebSearchTool;
use wikipedia::WikipediaTool;

use crate::config::ToolsConfig;
use crate::constants::{TOOL_HTTP_TIMEOUT_SECS, TOOL_USER_AGENT};

/// The result of executing a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: String,
}

impl ToolResult {
    pub fn success(content: String) -> Self {
        Self { content }
    }
}

/// Failures a search tool can hit.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid tool input: {0}")]
    InvalidInput(String),
    #[error("Invalid tool input: query must not be empty")]
    EmptyQuery,
    #[error("request to {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned HTTP {status}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("could not parse {service} response: {reason}")]
    Parse {
        service: &'static str,
        reason: String,
    },
    #[error("{service} rejected the query: {reason}")]
    Rejected {
        service: &'static str,
        reason: String,
    },
}

impl ToolError {
    /// True when the model sent arguments the tool could not use.
    pub fn is_input_error(&self) -> bool {
        matches!(self, ToolError::InvalidInput(_) | ToolError::EmptyQuery)
    }
}

/// Definition sent to the LLM so it knows what tools are available.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the LLM uses to call this tool.
    fn name(&self) -> &str;

    /// Human-readable description for the LLM's system prompt.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn schema(&self) -> Value {
        query_schema()
    }

    /// Execute the tool with the given JSON input.
    async fn execute(&self, input: Value) -> Result<ToolResult>;
}

/// Schema shared by the search tools: a single required `query` string.
pub fn query_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The search query"
            }
        },
        "required": ["query"]
    })
}

#[derive(Deserialize)]
struct QueryInput {
    query: String,
}

/// Pulls a non-blank `query` out of tool arguments.
pub fn parse_query(input: Value) -> Result<String, ToolError> {
    let input: QueryInput =
        serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(e.to_string()))?;
    let query = input.query.trim();
    if query.is_empty() {
        return Err(ToolError::EmptyQuery);
    }
    Ok(query.to_string())
}

/// Keeps at most `max` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Builds the HTTP client shared by the search tools.
pub fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(TOOL_USER_AGENT)
        .timeout(Duration::from_secs(TOOL_HTTP_TIMEOUT_SECS))
        .build()?)
}

/// Sends a GET request and returns the body, mapping failures to [`ToolError`].
pub(crate) async fn fetch_text(
    client: &reqwest::Client,
    service: &'static str,
    url: &str,
) -> Result<String, ToolError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ToolError::Http { service, source })?;
    let status = response.status();
    if !status.is_success() {
        return Err(ToolError::Status { service, status });
    }
    response
        .text()
        .await
        .map_err(|source| ToolError::Http { service, source })
}

/// Holds all registered tools and dispatches calls by name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Called during startup.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(Arc::from(tool));
    }

    /// Produce definitions for the LLM (sent in the API request).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    /// Look up a tool by name and execute it.
    #[cfg(test)]
    pub async fn execute(&self, name: &str, input: Value) -> Result<ToolResult> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;
        tool.execute(input).await
    }

    /// Names of the registered tools, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// How many tools are registered.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Converts all registered tools into rig-core [`ToolDyn`] trait objects.
    ///
    /// Returns a fresh `Vec` each call so the result can be moved into an
    /// agent builder's `.tools()` without borrow/move conflicts.
    ///
    /// [`ToolDyn`]: rig::tool::ToolDyn
    pub fn to_rig_tools(&self, handle_parsing_errors: bool) -> Vec<Box<dyn rig::tool::ToolDyn>> {
        self.tools
            .iter()
            .map(|t| {
                Box::new(rig_adapter::RigToolAdapter::new(
                    Arc::clone(t),
                    handle_parsing_errors,
                )) as Box<dyn rig::tool::ToolDyn>
            })
            .collect()
    }
}

impl ToolRegistry {
    /// Create a registry with the search tools enabled in `config`.
    pub fn from_config(config: &ToolsConfig) -> Result<Self> {
        let client = http_client()?;
        let mut registry = Self::new();
        if config.search.is_enabled() {
            registry.register(Box::new(WebSearchTool::new(
                client.clone(),
                &config.search,
            )));
        }
        if config.wikipedia.is_enabled() {
            registry.register(Box::new(WikipediaTool::new(
                client.clone(),
                &config.wikipedia,
            )));
        }
        if config.arxiv.is_enabled() {
            registry.register(Box::new(ArxivTool::new(client, &config.arxiv)));
        }
        Ok(registry)
    }
}

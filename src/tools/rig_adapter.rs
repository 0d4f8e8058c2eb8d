//! Adapter bridging sleuth's [`Tool`] trait to rig-core's [`ToolDyn`] trait.
//!
//! [`RigToolAdapter`] lets the search tools be registered with rig-core's
//! agent builder, so their definitions go out with each LLM request and rig
//! can call them during the multi-turn loop.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use rig::completion::ToolDefinition as RigToolDefinition;
use rig::tool::{ToolDyn, ToolError as RigToolError};

use super::{Tool, ToolError};

/// Bridges a sleuth [`Tool`] to rig-core's [`ToolDyn`] trait.
///
/// - `name()` → delegates to the sleuth tool's name
/// - `definition()` → builds a [`RigToolDefinition`] from the tool's metadata
/// - `call()` → parses the JSON string args, runs the tool, and returns the
///   observation text
pub struct RigToolAdapter {
    tool: Arc<dyn Tool>,
    handle_parsing_errors: bool,
}

impl RigToolAdapter {
    /// Creates a new adapter wrapping the given tool.
    ///
    /// With `handle_parsing_errors`, arguments the tool can't use are sent
    /// back to the model as an observation so it can retry; otherwise they
    /// fail the tool call.
    pub fn new(tool: Arc<dyn Tool>, handle_parsing_errors: bool) -> Self {
        Self {
            tool,
            handle_parsing_errors,
        }
    }

    /// Runs the wrapped tool on raw JSON arguments and produces the observation.
    pub async fn observe(&self, args: &str) -> Result<String, RigToolError> {
        let name = self.tool.name();
        let input: serde_json::Value = match serde_json::from_str(args) {
            Ok(input) => input,
            Err(e) if self.handle_parsing_errors => {
                tracing::warn!(tool = name, error = %e, "tool arguments are not valid JSON");
                return Ok(format!(
                    "Invalid tool input: {}. Call `{}` again with a JSON object like {{\"query\": \"...\"}}.",
                    e, name
                ));
            }
            Err(e) => return Err(RigToolError::JsonError(e)),
        };

        let started = Instant::now();
        match self.tool.execute(input).await {
            Ok(result) => {
                tracing::info!(
                    tool = name,
                    chars = result.content.chars().count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "tool call finished"
                );
                Ok(result.content)
            }
            Err(e) => {
                let input_error = e
                    .downcast_ref::<ToolError>()
                    .is_some_and(ToolError::is_input_error);
                tracing::warn!(tool = name, error = %e, input_error, "tool call failed");
                if input_error && !self.handle_parsing_errors {
                    return Err(RigToolError::ToolCallError(e.into()));
                }
                // Returned as text rather than ToolError: rig-core nests
                // ToolError through ToolSetError and ToolServerError, and the
                // model only needs the message to react.
                Ok(format!("Error: {}", e))
            }
        }
    }
}

impl ToolDyn for RigToolAdapter {
    fn name(&self) -> String {
        self.tool.name().to_string()
    }

    fn definition<'a>(
        &'a self,
        _prompt: String,
    ) -> Pin<Box<dyn std::future::Future<Output = RigToolDefinition> + Send + 'a>> {
        let name = self.tool.name().to_string();
        let description = self.tool.description().to_string();
        let parameters = self.tool.schema();
        Box::pin(async move {
            RigToolDefinition {
                name,
                description,
                parameters,
            }
        })
    }

    fn call<'a>(
        &'a self,
        args: String,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<String, RigToolError>> + Send + 'a>>
    {
        Box::pin(async move { self.observe(&args).await })
    }
}

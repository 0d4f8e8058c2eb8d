//! Centralized constants for sleuth.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "sleuth";

/// Title shown in the chat banner and the TUI header.
pub const APP_TITLE: &str = "sleuth - chat with search";

/// One-line description shown under the title.
pub const APP_DESCRIPTION: &str =
    "An agent that searches the web, Wikipedia and Arxiv, showing its thoughts as it works.";

/// Default LLM model identifier (Groq).
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Maximum tokens for LLM completions.
pub const MAX_TOKENS: u64 = 4096;

/// Greeting placed in a fresh or cleared transcript.
pub const DEFAULT_GREETING: &str =
    "Hi, I'm a chatbot who can search the web. How can I help you?";

/// Placeholder shown in an empty input box.
pub const INPUT_PLACEHOLDER: &str = "What is your question today?";

/// Prefix for the notice shown when a turn fails.
pub const ERROR_NOTICE_PREFIX: &str = "An error occurred";

/// Default system prompt for the search agent.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are sleuth, a research assistant with access to search tools. \
For every question, decide whether a tool would help, call it, read the observation, \
and repeat until you can answer. Prefer `search` for current events, `wikipedia` for \
general knowledge and `arxiv` for scientific papers. Answer concisely and mention \
which sources you used.";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "sleuth.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

/// Log filename under the cache directory.
pub const LOG_FILENAME: &str = "sleuth.log";

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "sleuth=info";

// --- Provider defaults ---

/// Default provider when none is configured.
pub const DEFAULT_PROVIDER: &str = "groq";

/// Default LLM model identifier for OpenAI.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";

/// Default LLM model identifier for Anthropic.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";

/// Default LLM model identifier for OpenRouter.
pub const DEFAULT_OPENROUTER_MODEL: &str = "meta-llama/llama-3.1-8b-instruct";

/// Default base URL for local Ollama server.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default LLM model identifier for Ollama.
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3";

// --- Agent ---

/// Maximum decide/act/observe round-trips per turn.
pub const DEFAULT_MAX_TURNS: usize = 15;

// --- Tool limits ---

/// Results fetched per tool call.
pub const DEFAULT_TOP_K_RESULTS: usize = 1;

/// Characters of content a tool may return.
pub const DEFAULT_DOC_CONTENT_CHARS_MAX: usize = 200;

/// Queries longer than this are clipped before hitting Wikipedia or Arxiv.
pub const MAX_QUERY_LENGTH: usize = 300;

/// Timeout for a single tool HTTP request.
pub const TOOL_HTTP_TIMEOUT_SECS: u64 = 20;

/// User agent sent by the search tools.
pub const TOOL_USER_AGENT: &str = "Mozilla/5.0 (compatible; sleuth/0.1)";

/// Default DuckDuckGo HTML endpoint.
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://html.duckduckgo.com";

/// Default Wikipedia language edition.
pub const DEFAULT_WIKIPEDIA_LANG: &str = "en";

/// Default arXiv export API endpoint.
pub const DEFAULT_ARXIV_BASE_URL: &str = "https://export.arxiv.org";

// --- TUI ---

/// Spinner frames shown while the agent is thinking.
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Width of the TUI settings sidebar.
pub const SIDEBAR_WIDTH: u16 = 32;

/// Capacity of the channel carrying agent events into the TUI.
pub const RENDER_CHANNEL_CAPACITY: usize = 1000;

//! LLM provider abstraction for sleuth.
//!
//! Wraps rig-core's provider clients behind a [`Provider`] struct with enum
//! dispatch. Supports Groq, OpenAI, Anthropic, OpenRouter, and Ollama (local)
//! via [`ProviderKind`].

mod client;
mod kind;
mod listing;
mod resolve;

pub use client::Provider;
#[allow(unused_imports)]
pub use kind::ProviderKind;
pub use listing::list_models;
pub use resolve::{resolve_model, ModelSelection};

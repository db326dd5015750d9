//! Completion API integration for Glean.
//!
//! This crate exposes the [`traits::CompletionClient`] interface, the fixed
//! prompt templates in [`prompt`], and the OpenRouter chat-completions client
//! in [`openrouter`].
//!
//! # Examples
//! ```no_run
//! use glean_common::Result;
//! use glean_llm::openrouter::{ClientIdentity, OpenRouterClient};
//! use glean_llm::prompt::Action;
//! use glean_llm::traits::CompletionClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let client = OpenRouterClient::new(glean_llm::OPENROUTER_ENDPOINT, ClientIdentity::default())?;
//! let text = client
//!     .process("Hello world", Action::Translate, "sk-or-...", glean_llm::DEFAULT_MODEL)
//!     .await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```
pub mod openrouter;
pub mod prompt;
pub mod traits;

/// The chat-completions endpoint requests are sent to.
pub const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Model used when neither the CLI nor the config names one.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

//! LLM domain — prompt catalog, prompt building, schema types, and the
//! chat-completion client.

pub mod builder;
pub mod client;
pub mod prompts;
pub mod schema;

pub use builder::{build_prompts, PromptError, PromptInputs, RenderedPrompts};
pub use client::{ChatService, LlmError};
pub use prompts::PromptKey;
pub use schema::{ActionKind, ActionsList, IconKind, Paragraph, ShapeAction};

//! `stocklens-insight`
//!
//! **Responsibility:** Insight Adapter boundary.
//!
//! This crate wraps a single external language-model service: prompt
//! formatting, request/response mapping, nothing else. It must not depend on
//! the inventory domain crates — callers hand it plain snapshot values and it
//! returns the model's text unmodified.

pub mod chat;
pub mod prompt;
pub mod snapshot;

pub use chat::{ChatModel, ChatRequest, InsightError, InsightService, OpenAiChatClient};
pub use prompt::ReportKind;
pub use snapshot::{ProductSnapshot, UsageSnapshot};

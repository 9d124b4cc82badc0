//! ScholarDraft library crate for revising academic prose.
//!
//! The library protects dictionary terms, splits long documents into
//! paragraph-aligned chunks, sends each chunk to an OpenAI-compatible
//! completion endpoint under a bounded retry, and reassembles the result.
//! Finished revisions can be diffed against their source, kept in a short
//! version history, priced, and exported.

pub mod config;
pub mod cost;
pub mod diff;
pub mod export;
pub mod history;
pub mod revision;
pub mod session;
pub mod storage;
pub mod telemetry;
pub mod text_stats;

pub use config::{OperationMode, ScholarDraftConfig};
pub use revision::{
    CompletionClient, Dictionary, OpenAiCompletionClient, OpenAiCompletionConfig, PromptConfig,
    RevisionError, RevisionRequest, RevisionResult,
};
pub use session::{RevisionSession, SessionCollaborators};

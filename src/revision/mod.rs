//! Document revision pipeline.
//!
//! Text passes through term protection and paragraph chunking, is revised
//! chunk by chunk against an OpenAI-compatible completion endpoint, and is
//! reassembled and restored. The whole pass is wrapped in a bounded retry.

mod chunker;
mod error;
mod model;
mod modes;
mod openai;
mod pipeline;
mod prompt;
mod protect;
mod retry;
mod service;
mod stream;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use chunker::{
    CHARS_PER_TOKEN, DEFAULT_CHUNK_TOKEN_BUDGET, PARAGRAPH_SEPARATOR, chunk, estimate_tokens,
    plan_chunks, reassemble, split_paragraphs,
};
pub use error::{GENERIC_FAILURE_MESSAGE, RevisionError};
pub use model::{DEFAULT_DIALECT, DEFAULT_MODE, DEFAULT_MODEL, RevisionRequest, RevisionResult};
pub use modes::{
    CustomMode, DIALECT_PLACEHOLDER, LatexProtection, MAX_TEMPERATURE, MIN_TEMPERATURE, Mode,
    ModeCatalog, ModeDefinition, ModeKind, PromptConfig,
};
pub use openai::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, OpenAiCompletionClient, OpenAiCompletionConfig,
};
pub use pipeline::{PipelineInput, PipelineOptions, PipelineOutput, run_pipeline};
pub use prompt::{
    BaseProtocol, ModeInstruction, PromptFragment, ProtectionInstruction, SystemPromptBuilder,
};
pub use protect::{
    Dictionary, DictionaryEntry, ProtectedText, TokenMapping, placeholder_token, protect, restore,
};
pub use retry::{
    Attempted, DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS, RetryController, RetryPolicy, Sleeper,
    ThreadSleeper,
};
pub use service::{
    CompletionClient, CompletionRequest, DEFAULT_MAX_TOKENS, ProgressObserver, RevisionProgress,
    SilentProgress,
};
pub use stream::DeltaStream;

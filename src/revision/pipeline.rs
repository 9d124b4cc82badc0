//! Protect, chunk, complete, reassemble, and restore one document.

use super::chunker::{DEFAULT_CHUNK_TOKEN_BUDGET, plan_chunks, reassemble};
use super::error::RevisionError;
use super::protect::{Dictionary, protect, restore};
use super::service::{
    CompletionClient, CompletionRequest, DEFAULT_MAX_TOKENS, ProgressObserver, RevisionProgress,
};

/// Limits and transport choices applied to every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Completion length limit per request.
    pub max_tokens: u32,
    /// Estimated-token budget per chunk.
    pub chunk_token_budget: usize,
    /// Whether to stream completions.
    pub stream: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            chunk_token_budget: DEFAULT_CHUNK_TOKEN_BUDGET,
            stream: true,
        }
    }
}

/// Inputs for one pass of the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInput<'a> {
    /// Original text.
    pub text: &'a str,
    /// Assembled system prompt.
    pub system_prompt: &'a str,
    /// Model identifier.
    pub model: &'a str,
    /// Mode temperature.
    pub temperature: f64,
    /// Terms protected for this pass.
    pub dictionary: &'a Dictionary,
}

/// Revised text and the number of chunks it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Revised text with protected terms restored.
    pub text: String,
    /// Number of chunks sent.
    pub chunks: usize,
}

/// Runs one full pass: protection, chunk planning, one completion per
/// chunk in order, reassembly, then restoration.
///
/// # Errors
///
/// Propagates the first error raised by protection or by any chunk's
/// completion. The pass is all-or-nothing.
pub fn run_pipeline(
    client: &dyn CompletionClient,
    input: &PipelineInput<'_>,
    options: PipelineOptions,
    observer: &mut dyn ProgressObserver,
) -> Result<PipelineOutput, RevisionError> {
    let protected = protect(input.text, input.dictionary)?;
    let chunks = plan_chunks(&protected.text, options.chunk_token_budget);
    let total = chunks.len();

    let mut revised = Vec::with_capacity(total);
    for (index, chunk) in chunks.into_iter().enumerate() {
        observer.observe(&RevisionProgress::ChunkStarted { index, total });
        let request = CompletionRequest {
            system_prompt: input.system_prompt.to_owned(),
            user_text: chunk,
            model: input.model.to_owned(),
            temperature: input.temperature,
            max_tokens: options.max_tokens,
            stream: options.stream,
        };
        revised.push(client.complete(&request, observer)?);
        observer.observe(&RevisionProgress::ChunkCompleted { index, total });
    }

    Ok(PipelineOutput {
        text: restore(&reassemble(&revised), protected.mapping),
        chunks: total,
    })
}

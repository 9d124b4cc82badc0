//! OpenAI-compatible HTTP implementation of the completion client.

use std::io::BufReader;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use super::error::{GENERIC_FAILURE_MESSAGE, RevisionError};
use super::service::{CompletionClient, CompletionRequest, ProgressObserver, RevisionProgress};
use super::stream::DeltaStream;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default transport timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const ERROR_MESSAGE_LIMIT: usize = 300;

/// Configuration for [`OpenAiCompletionClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiCompletionConfig {
    /// Base API URL (e.g., `https://api.openai.com/v1`).
    pub base_url: String,
    /// API key used for bearer authentication.
    pub api_key: Option<String>,
    /// HTTP timeout.
    pub timeout: Duration,
}

impl Default for OpenAiCompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OpenAiCompletionConfig {
    /// Constructs configuration with required API settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            timeout,
        }
    }
}

/// OpenAI-compatible chat-completions client.
#[derive(Debug, Clone, Default)]
pub struct OpenAiCompletionClient {
    config: OpenAiCompletionConfig,
}

impl OpenAiCompletionClient {
    /// Creates a client from explicit configuration.
    #[must_use]
    pub const fn new(config: OpenAiCompletionConfig) -> Self {
        Self { config }
    }

    fn extract_api_key(&self) -> Result<&str, RevisionError> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                RevisionError::configuration(concat!(
                    "an API key is required (use --api-key, SCHOLARDRAFT_API_KEY, ",
                    "OPENAI_API_KEY, or store one with --set-api-key)"
                ))
            })
    }

    fn create_http_client(&self) -> Result<Client, RevisionError> {
        Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|error| {
                RevisionError::configuration(format!("failed to configure HTTP client: {error}"))
            })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }
}

fn send(builder: RequestBuilder) -> Result<Response, RevisionError> {
    let response = builder
        .send()
        .map_err(|error| RevisionError::Network {
            message: format!("request transport failed: {error}"),
        })?;

    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let message = response.text().map_or_else(
        |_| GENERIC_FAILURE_MESSAGE.to_owned(),
        |body| server_error_message(&body),
    );
    Err(RevisionError::Server { status, message })
}

impl CompletionClient for OpenAiCompletionClient {
    fn complete(
        &self,
        request: &CompletionRequest,
        observer: &mut dyn ProgressObserver,
    ) -> Result<String, RevisionError> {
        let api_key = self.extract_api_key()?;
        let payload = ChatCompletionsRequest {
            model: request.model.as_str(),
            messages: vec![
                ChatCompletionsMessage {
                    role: "system",
                    content: request.system_prompt.as_str(),
                },
                ChatCompletionsMessage {
                    role: "user",
                    content: request.user_text.as_str(),
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: request.stream,
        };
        let client = self.create_http_client()?;
        let builder = client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(api_key)
            .json(&payload);
        let response = send(builder)?;

        let text = if request.stream {
            accumulate_stream(response, observer)?
        } else {
            decode_completion(response)?
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RevisionError::Stream {
                message: "completion response did not contain assistant text".to_owned(),
            });
        }
        Ok(trimmed.to_owned())
    }

    fn verify_credentials(&self) -> Result<(), RevisionError> {
        let api_key = self.extract_api_key()?;
        let client = self.create_http_client()?;
        let builder = client.get(self.endpoint("models")).bearer_auth(api_key);
        send(builder).map(|_| ())
    }
}

fn accumulate_stream(
    response: Response,
    observer: &mut dyn ProgressObserver,
) -> Result<String, RevisionError> {
    let mut accumulated = String::new();
    for delta in DeltaStream::new(BufReader::new(response)) {
        let text = delta?;
        accumulated.push_str(&text);
        observer.observe(&RevisionProgress::Delta(text));
    }
    Ok(accumulated)
}

fn decode_completion(response: Response) -> Result<String, RevisionError> {
    let payload: ChatCompletionsResponse =
        response.json().map_err(|error| RevisionError::Stream {
            message: format!("response JSON decoding failed: {error}"),
        })?;

    payload
        .choices
        .first()
        .and_then(|choice| parse_content_value(&choice.message.content))
        .map(ToOwned::to_owned)
        .ok_or_else(|| RevisionError::Stream {
            message: "completion response did not contain assistant text".to_owned(),
        })
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionsMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatCompletionsMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: ChatContent,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

#[derive(Debug, Deserialize)]
struct ChatContentPart {
    text: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn parse_content_value(content: &ChatContent) -> Option<&str> {
    match content {
        ChatContent::Text(text) => Some(text.as_str()),
        ChatContent::Parts(parts) => parts
            .iter()
            .find_map(|part| part.text.as_deref().or(part.content.as_deref())),
    }
}

fn server_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .filter(|message| !message.trim().is_empty())
        .map_or_else(
            || GENERIC_FAILURE_MESSAGE.to_owned(),
            |message| truncate_for_message(&message, ERROR_MESSAGE_LIMIT),
        )
}

fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output = String::new();
    let mut chars = message.chars();

    for _ in 0..max_chars {
        let Some(character) = chars.next() else {
            return output;
        };
        output.push(character);
    }

    if chars.next().is_some() {
        output.push_str("...");
    }

    output
}

#[cfg(test)]
#[path = "openai_tests.rs"]
mod tests;

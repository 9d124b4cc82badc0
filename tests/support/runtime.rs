//! Mock completion endpoint driven from synchronous tests.

use std::io;

use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test API key sent as the bearer token.
pub const TEST_API_KEY: &str = "sk-test";

/// Wiremock server plus the runtime that owns it.
///
/// Mocks are mounted through the runtime; the blocking client under test
/// talks to the server from the calling thread.
pub struct MockEndpoint {
    runtime: Runtime,
    server: MockServer,
}

impl MockEndpoint {
    /// Starts a server on a fresh runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be created.
    pub fn start() -> io::Result<Self> {
        let runtime = Runtime::new()?;
        let server = runtime.block_on(MockServer::start());
        Ok(Self { runtime, server })
    }

    /// Base URL to configure the client with.
    pub fn base_url(&self) -> String {
        format!("{}/v1", self.server.uri())
    }

    /// Answers chat completions with `response`, at most `times` times.
    pub fn mount_completion(&self, response: ResponseTemplate, times: u64) {
        self.runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/v1/chat/completions"))
                .and(header("authorization", format!("Bearer {TEST_API_KEY}").as_str()))
                .respond_with(response)
                .up_to_n_times(times)
                .mount(&self.server),
        );
    }

    /// Answers model listing with `status`.
    pub fn mount_models(&self, status: u16) {
        self.runtime.block_on(
            Mock::given(method("GET"))
                .and(path("/v1/models"))
                .respond_with(ResponseTemplate::new(status).set_body_json(
                    serde_json::json!({ "data": [], "error": { "message": "Incorrect API key provided" } }),
                ))
                .mount(&self.server),
        );
    }

    /// JSON bodies of every request received so far.
    pub fn received_bodies(&self) -> Vec<serde_json::Value> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .iter()
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }
}

/// Server-sent event body streaming `deltas` and a terminator.
pub fn sse_body(deltas: &[&str]) -> String {
    let mut body: String = deltas
        .iter()
        .map(|delta| {
            let event = serde_json::json!({ "choices": [{ "delta": { "content": delta } }] });
            format!("data: {event}\n\n")
        })
        .collect();
    body.push_str("data: [DONE]\n\n");
    body
}

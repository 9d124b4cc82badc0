//! Unit tests for the OpenAI-compatible completion adapter.

use rstest::{fixture, rstest};

use crate::revision::{
    CompletionClient, CompletionRequest, GENERIC_FAILURE_MESSAGE, RevisionError, SilentProgress,
};

use super::{
    ChatContent, OpenAiCompletionClient, parse_content_value, server_error_message,
    truncate_for_message,
};

#[fixture]
fn completion_request() -> CompletionRequest {
    CompletionRequest {
        system_prompt: "Edit in US English.".to_owned(),
        user_text: "Teh draft".to_owned(),
        model: "gpt-4o-mini".to_owned(),
        temperature: 0.3,
        max_tokens: 4_000,
        stream: false,
    }
}

#[test]
fn parse_content_value_supports_string_and_array() {
    let as_string: ChatContent =
        serde_json::from_value(serde_json::json!("hello")).expect("string content should decode");
    let as_array: ChatContent =
        serde_json::from_value(serde_json::json!([{"text":"first"}, {"text":"second"}]))
            .expect("array content should decode");

    assert_eq!(parse_content_value(&as_string), Some("hello"));
    assert_eq!(parse_content_value(&as_array), Some("first"));
}

#[rstest]
#[case::server_message(
    r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#,
    "Incorrect API key provided"
)]
#[case::missing_message(r#"{"error":{"type":"server_error"}}"#, GENERIC_FAILURE_MESSAGE)]
#[case::not_json("<html>Bad Gateway</html>", GENERIC_FAILURE_MESSAGE)]
#[case::blank_message(r#"{"error":{"message":"  "}}"#, GENERIC_FAILURE_MESSAGE)]
fn server_errors_prefer_the_provided_message(#[case] body: &str, #[case] expected: &str) {
    assert_eq!(server_error_message(body), expected);
}

#[rstest]
#[case("short", 10, "short")]
#[case("exactly", 7, "exactly")]
#[case("truncate me", 8, "truncate...")]
fn truncates_long_messages(#[case] message: &str, #[case] limit: usize, #[case] expected: &str) {
    assert_eq!(truncate_for_message(message, limit), expected);
}

#[rstest]
fn complete_requires_api_key(completion_request: CompletionRequest) {
    let client = OpenAiCompletionClient::default();
    let error = client
        .complete(&completion_request, &mut SilentProgress)
        .expect_err("missing key should be rejected");

    assert!(
        matches!(error, RevisionError::Configuration { .. }),
        "expected missing API key to map to Configuration error, got {error:?}"
    );
}

#[test]
fn verify_credentials_requires_api_key() {
    let result = OpenAiCompletionClient::default().verify_credentials();

    assert!(matches!(result, Err(RevisionError::Configuration { .. })));
}

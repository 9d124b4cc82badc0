//! Tests for API key, limit, and export resolution.

use rstest::rstest;

use crate::ScholarDraftConfig;
use crate::export::{ExportError, ExportFormat};
use crate::revision::RevisionError;

#[rstest]
fn resolve_api_key_prefers_configured_value() {
    let _guard = env_lock::lock_env([("OPENAI_API_KEY", Some("sk-env"))]);
    let config = ScholarDraftConfig {
        api_key: Some("sk-config".to_owned()),
        ..Default::default()
    };

    assert_eq!(config.resolve_api_key().as_deref(), Some("sk-config"));
}

#[rstest]
fn resolve_api_key_falls_back_to_legacy_variable() {
    let _guard = env_lock::lock_env([("OPENAI_API_KEY", Some("sk-env"))]);
    let config = ScholarDraftConfig::default();

    assert_eq!(config.resolve_api_key().as_deref(), Some("sk-env"));
}

#[rstest]
fn resolve_api_key_is_none_without_sources() {
    let _guard = env_lock::lock_env([("OPENAI_API_KEY", None::<&str>)]);
    let config = ScholarDraftConfig {
        api_key: Some("   ".to_owned()),
        ..Default::default()
    };

    assert!(config.resolve_api_key().is_none());
}

#[rstest]
fn pipeline_options_reflect_limits() -> Result<(), RevisionError> {
    let config = ScholarDraftConfig {
        max_tokens: 512,
        chunk_token_budget: 200,
        no_stream: true,
        ..Default::default()
    };

    let options = config.pipeline_options()?;

    assert_eq!(options.max_tokens, 512);
    assert_eq!(options.chunk_token_budget, 200);
    assert!(!options.stream);
    Ok(())
}

#[rstest]
#[case::zero_tokens(0, 100)]
#[case::zero_budget(100, 0)]
#[case::oversized_tokens(u64::from(u32::MAX) + 1, 100)]
fn pipeline_options_reject_invalid_limits(#[case] max_tokens: u64, #[case] budget: u64) {
    let config = ScholarDraftConfig {
        max_tokens,
        chunk_token_budget: budget,
        ..Default::default()
    };

    assert!(matches!(
        config.pipeline_options(),
        Err(RevisionError::Configuration { .. })
    ));
}

#[rstest]
#[case::none(None, None, Ok(None))]
#[case::explicit(Some("json"), Some("out.txt"), Ok(Some(ExportFormat::Json)))]
#[case::from_extension(None, Some("paper.md"), Ok(Some(ExportFormat::Markdown)))]
#[case::unknown_extension(None, Some("paper.rtf"), Ok(Some(ExportFormat::Text)))]
#[case::typeset_extension(None, Some("paper.docx"), Ok(Some(ExportFormat::Docx)))]
#[case::explicit_pdf(Some("pdf"), None, Ok(Some(ExportFormat::Pdf)))]
#[case::unsupported(
    Some("rtf"),
    None,
    Err(ExportError::UnsupportedFormat { format: "rtf".to_owned() })
)]
fn export_format_resolution(
    #[case] format: Option<&str>,
    #[case] path: Option<&str>,
    #[case] expected: Result<Option<ExportFormat>, ExportError>,
) {
    let config = ScholarDraftConfig {
        export_format: format.map(str::to_owned),
        export_path: path.map(str::to_owned),
        ..Default::default()
    };

    assert_eq!(config.export_format(), expected);
}

#[rstest]
fn export_metadata_collects_fields() {
    let config = ScholarDraftConfig {
        export_title: Some("Findings".to_owned()),
        export_line_numbers: true,
        ..Default::default()
    };

    let metadata = config.export_metadata();

    assert_eq!(metadata.title.as_deref(), Some("Findings"));
    assert!(metadata.formatting.line_numbers);
    assert!(!metadata.formatting.double_spaced);
}

#[rstest]
#[case::default(None, "https://api.openai.com/v1")]
#[case::local(Some("http://127.0.0.1:8080/v1"), "http://127.0.0.1:8080/v1")]
fn endpoint_url_accepts_http_urls(#[case] base: Option<&str>, #[case] expected: &str) {
    let config = ScholarDraftConfig {
        api_base_url: base.map(str::to_owned),
        ..Default::default()
    };

    let url = config.endpoint_url().expect("valid endpoint");

    assert_eq!(url.as_str(), expected);
}

#[rstest]
#[case::not_a_url("api.openai.com")]
#[case::wrong_scheme("ftp://example.com/v1")]
fn endpoint_url_rejects_other_values(#[case] base: &str) {
    let config = ScholarDraftConfig {
        api_base_url: Some(base.to_owned()),
        ..Default::default()
    };

    assert!(matches!(
        config.endpoint_url(),
        Err(RevisionError::Configuration { .. })
    ));
}

//! Revision operation: revise the input, print it, and optionally export.

use std::io::{self, Write};

use camino::Utf8PathBuf;
use scholardraft::export::{ExportDocument, ExportFormat, export_to_path, exporter_for};
use scholardraft::revision::{RevisionProgress, RevisionResult};
use scholardraft::session::RevisionSession;
use scholardraft::ScholarDraftConfig;

use super::context::build_session;
use super::input::read_input;
use super::output::{ProgressReporter, io_error, write_revision_to, write_totals_to};
use super::CliError;

/// File stem used when an export has no explicit path.
const DEFAULT_EXPORT_STEM: &str = "scholardraft-export";

/// Revises the configured input and writes the result to stdout.
///
/// Progress and retry notices go to stderr.
///
/// # Errors
///
/// Returns [`CliError`] when input cannot be read, the revision fails, or
/// the export cannot be written.
pub fn run(config: &ScholarDraftConfig) -> Result<(), CliError> {
    let export_format = config.export_format()?;
    let text = read_input(config)?;
    let mut session = build_session(config)?;
    let request = session.build_request(&text, config.latex_protect);

    let mut reporter = ProgressReporter::default();
    let mut progress = |event: &RevisionProgress| {
        if let Err(error) = reporter.write_to(&mut io::stderr().lock(), event) {
            tracing::debug!(%error, "failed to write progress");
        }
    };
    let outcome = session.revise(&request, &mut progress);
    if let Err(error) = reporter.finish(&mut io::stderr().lock()) {
        tracing::debug!(%error, "failed to write progress");
    }
    let result = outcome?;

    let mut stdout = io::stdout().lock();
    write_revision_to(&mut stdout, text.trim(), &result)?;
    write_totals_to(&mut stdout, session.settings())?;
    if config.show_diff
        && let Some(markup) = session.render_current_diff()
    {
        writeln!(stdout).map_err(|e| io_error(&e))?;
        writeln!(stdout, "{markup}").map_err(|e| io_error(&e))?;
    }

    if let Some(format) = export_format {
        let path = export(config, &session, &result, text.trim(), format)?;
        writeln!(io::stderr().lock(), "Exported to {path}").map_err(|e| io_error(&e))?;
    }
    Ok(())
}

fn export(
    config: &ScholarDraftConfig,
    session: &RevisionSession,
    result: &RevisionResult,
    original: &str,
    format: ExportFormat,
) -> Result<Utf8PathBuf, CliError> {
    let path = export_path(config.export_path.as_deref(), format);
    let metadata = config.export_metadata();
    let settings = session.settings();
    let document = ExportDocument {
        original,
        polished: &result.polished_text,
        mode: &settings.selected_mode,
        model: &settings.selected_model,
        dialect: &settings.selected_dialect,
        timestamp: result.timestamp,
        metadata: &metadata,
    };
    let exporter = exporter_for(format);
    Ok(export_to_path(exporter.as_ref(), &document, &path)?)
}

fn export_path(explicit: Option<&str>, format: ExportFormat) -> Utf8PathBuf {
    explicit.map_or_else(
        || Utf8PathBuf::from(format!("{DEFAULT_EXPORT_STEM}.{}", format.extension())),
        Utf8PathBuf::from,
    )
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use scholardraft::export::ExportFormat;

    use super::export_path;

    #[rstest]
    #[case(None, ExportFormat::Markdown, "scholardraft-export.md")]
    #[case(None, ExportFormat::Json, "scholardraft-export.json")]
    #[case(Some("out/paper.txt"), ExportFormat::Text, "out/paper.txt")]
    fn export_paths_default_by_format(
        #[case] explicit: Option<&str>,
        #[case] format: ExportFormat,
        #[case] expected: &str,
    ) {
        assert_eq!(export_path(explicit, format), Utf8PathBuf::from(expected));
    }
}

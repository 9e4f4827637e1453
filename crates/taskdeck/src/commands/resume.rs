//! Resume command handlers: upload a document, then fan out highlight
//! improvements per position.

use std::fmt::Write as _;
use std::path::Path;

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;
use taskdeck_core::{
    CoreError, EnrichmentBatch, EnrichmentFailure, EnrichmentStatus, ParentUnit, UploadFile,
    Workspace,
};

use crate::cli::{GlobalOpts, ResumeArgs, ResumeCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "#")]
    number: usize,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Employer")]
    employer: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Highlights")]
    highlights: usize,
}

#[derive(Serialize)]
struct NumberedPosition<'a> {
    number: usize,
    #[serde(flatten)]
    position: &'a ParentUnit,
}

impl From<&NumberedPosition<'_>> for PositionRow {
    fn from(p: &NumberedPosition<'_>) -> Self {
        Self {
            number: p.number,
            title: p.position.title.clone(),
            employer: p.position.employer_name.clone().unwrap_or_default(),
            period: p.position.period().unwrap_or_default(),
            highlights: p.position.sub_units.len(),
        }
    }
}

// ── Improvement report ──────────────────────────────────────────────

/// One position's outcome, as rendered in every output format.
#[derive(Serialize)]
struct Improvement {
    number: usize,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    employer: Option<String>,
    status: EnrichmentStatus,
    highlights: Vec<HighlightView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<EnrichmentFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct HighlightView {
    original: String,
    suggestions: Vec<String>,
}

impl Improvement {
    fn new(number: usize, parent: &ParentUnit, outcome: &Result<EnrichmentBatch, CoreError>) -> Self {
        let (status, displayed, failure, error) = match outcome {
            Ok(batch) => (
                batch.status(),
                batch.displayed(),
                batch.failure().cloned(),
                None,
            ),
            Err(e) => (EnrichmentStatus::Failed, None, None, Some(e.to_string())),
        };

        let highlights = parent
            .sub_units
            .iter()
            .enumerate()
            .map(|(i, original)| HighlightView {
                original: original.clone(),
                suggestions: displayed
                    .and_then(|d| d.get(i))
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            number,
            title: parent.title.clone(),
            employer: parent.employer_name.clone(),
            status,
            highlights,
            failure,
            error,
        }
    }

    fn failed(&self) -> bool {
        self.status == EnrichmentStatus::Failed
    }

    fn heading(&self) -> String {
        match self.employer {
            Some(ref employer) => format!("{}. {} @ {employer}", self.number, self.title),
            None => format!("{}. {}", self.number, self.title),
        }
    }
}

fn render_detail(reports: &[Improvement], color: bool) -> String {
    let mut out = String::new();
    for report in reports {
        let heading = report.heading();
        let status = report.status.to_string();
        if color {
            let status = if report.failed() {
                status.red().to_string()
            } else {
                status.green().to_string()
            };
            let _ = writeln!(out, "{} [{status}]", heading.bold());
        } else {
            let _ = writeln!(out, "{heading} [{status}]");
        }

        if let Some(ref failure) = report.failure {
            let _ = writeln!(
                out,
                "  highlight {} failed: {}",
                failure.sub_unit + 1,
                failure.message
            );
        }
        if let Some(ref error) = report.error {
            let _ = writeln!(out, "  {error}");
        }

        for highlight in &report.highlights {
            let _ = writeln!(out, "  - {}", highlight.original);
            for suggestion in &highlight.suggestions {
                if color {
                    let _ = writeln!(out, "      {} {suggestion}", "→".cyan());
                } else {
                    let _ = writeln!(out, "      → {suggestion}");
                }
            }
        }
        out.push('\n');
    }
    out.trim_end().to_owned()
}

// ── Helpers ─────────────────────────────────────────────────────────

async fn upload(
    workspace: &Workspace,
    path: &Path,
    global: &GlobalOpts,
) -> Result<taskdeck_core::Document, CliError> {
    let file = UploadFile::from_path(path).await.map_err(CoreError::from)?;

    let bar = util::spinner(format!("Uploading {}", file.file_name), global.quiet);
    let result = workspace.upload_resume(&file).await;
    bar.finish_and_clear();

    Ok(result?)
}

/// Convert a 1-based `--position` into a document index.
fn position_index(position: usize, len: usize) -> Result<usize, CliError> {
    if position == 0 || position > len {
        return Err(CliError::Validation {
            field: "position".into(),
            reason: format!("must be between 1 and {len}"),
        });
    }
    Ok(position - 1)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    workspace: &Workspace,
    args: ResumeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ResumeCommand::Upload { file } => {
            let document = upload(workspace, &file, global).await?;
            let numbered: Vec<NumberedPosition<'_>> = document
                .iter()
                .enumerate()
                .map(|(i, position)| NumberedPosition {
                    number: i + 1,
                    position,
                })
                .collect();
            let out = output::render_list(
                &global.format(),
                &numbered,
                |p| PositionRow::from(p),
                |p| p.position.title.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResumeCommand::Improve { file, position } => {
            let document = upload(workspace, &file, global).await?;

            let reports: Vec<Improvement> = if let Some(position) = position {
                let index = position_index(position, document.len())?;
                let bar = util::spinner("Improving highlights", global.quiet);
                let outcome = workspace.improve(index).await;
                bar.finish_and_clear();
                // Nothing else is running, so a local error is the whole answer.
                if let Err(ref e @ (CoreError::ValidationFailed { .. } | CoreError::Cancelled)) =
                    outcome
                {
                    return Err(e.clone().into());
                }
                vec![Improvement::new(position, &document[index], &outcome)]
            } else {
                let bar = util::spinner(
                    format!("Improving {} position(s)", document.len()),
                    global.quiet,
                );
                let outcomes = workspace.improve_all().await;
                bar.finish_and_clear();
                outcomes
                    .iter()
                    .enumerate()
                    .map(|(i, (parent, outcome))| Improvement::new(i + 1, parent, outcome))
                    .collect()
            };

            let color = output::should_color(&global.color_mode());
            let out = output::render_single(
                &global.format(),
                reports.as_slice(),
                |r| render_detail(r, color),
                |r| {
                    r.iter()
                        .flat_map(|i| i.highlights.iter().flat_map(|h| h.suggestions.iter()))
                        .cloned()
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            );
            output::print_output(&out, global.quiet);

            let failed = reports.iter().filter(|r| r.failed()).count();
            if failed > 0 {
                return Err(CliError::EnrichmentFailed {
                    failed,
                    total: reports.len(),
                });
            }
            Ok(())
        }
    }
}

//! Rendering of prediction results as text or JSON.

use std::io::{self, Write};
use std::str::FromStr;

use serde::Serialize;

use crate::explain::{Explainer, Explanation, ExplanationResult};
use crate::pipeline::{InferencePipeline, PredictionResult};
use crate::schema::{self, CandidateProfile, RawRecord, ValidationError};

const BANNER_WIDTH: usize = 70;
const BAR_WIDTH: usize = 40;

const TIP: &str = "Tip: Higher academic scores, stronger skills match, better interview score, \
and prior experience typically increase placement probability.";

const UNAVAILABLE: &str = "Feature importance explanation is not available for this saved model format.";

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {s}. Use 'text' or 'json'.")),
        }
    }
}

/// One violated field of an invalid record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidField {
    pub field: &'static str,
    pub reason: String,
}

/// What happened to one input record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Predicted {
        prediction: PredictionResult,
        #[serde(skip_serializing_if = "Option::is_none")]
        explanation: Option<Explanation>,
    },
    Invalid {
        errors: Vec<InvalidField>,
    },
}

/// Result for the record at `index` in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordReport {
    pub index: usize,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

impl RecordReport {
    pub fn predicted(index: usize, prediction: PredictionResult, explanation: Option<Explanation>) -> Self {
        Self {
            index,
            outcome: RecordOutcome::Predicted { prediction, explanation },
        }
    }

    pub fn invalid(index: usize, error: &ValidationError) -> Self {
        let errors = error
            .violations()
            .iter()
            .map(|v| InvalidField {
                field: v.field,
                reason: v.reason.to_string(),
            })
            .collect();
        Self {
            index,
            outcome: RecordOutcome::Invalid { errors },
        }
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        match &self.outcome {
            RecordOutcome::Predicted { prediction, .. } => Some(prediction),
            RecordOutcome::Invalid { .. } => None,
        }
    }
}

/// Counts over a set of reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub placed: usize,
    pub not_placed: usize,
    pub invalid: usize,
}

impl Summary {
    pub fn of(reports: &[RecordReport]) -> Self {
        let mut summary = Summary { total: reports.len(), ..Default::default() };
        for report in reports {
            match report.prediction() {
                Some(p) if p.label.is_placed() => summary.placed += 1,
                Some(_) => summary.not_placed += 1,
                None => summary.invalid += 1,
            }
        }
        summary
    }
}

/// Errors reading candidate records from JSON input.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to parse input JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("record {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("expected a JSON object or an array of objects")]
    UnexpectedShape,
}

/// Parse one JSON object, or an array of them, into raw records.
pub fn parse_records(json: &str) -> Result<Vec<RawRecord>, InputError> {
    let into_record = |index: usize, value: serde_json::Value| match value {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect::<RawRecord>()),
        _ => Err(InputError::NotAnObject { index }),
    };

    match serde_json::from_str(json)? {
        serde_json::Value::Array(values) => values
            .into_iter()
            .enumerate()
            .map(|(index, value)| into_record(index, value))
            .collect(),
        value @ serde_json::Value::Object(_) => Ok(vec![into_record(0, value)?]),
        _ => Err(InputError::UnexpectedShape),
    }
}

/// Validate, predict and optionally explain every record.
///
/// Invalid records are reported with all their violations; the rest are
/// predicted as one batch. Reports keep input order.
pub fn build_reports(
    pipeline: &InferencePipeline,
    explainer: Option<&Explainer>,
    records: &[RawRecord],
    n_threads: usize,
) -> Vec<RecordReport> {
    let validated: Vec<Result<CandidateProfile, ValidationError>> = records.iter().map(schema::validate).collect();
    let profiles: Vec<CandidateProfile> = validated.iter().filter_map(|r| r.as_ref().ok().cloned()).collect();
    let mut predictions = profiles.iter().zip(pipeline.predict_batch(&profiles, n_threads));

    let mut reports = Vec::with_capacity(records.len());
    for (index, validated) in validated.iter().enumerate() {
        if let Err(error) = validated {
            tracing::info!(index, %error, "rejected candidate record");
            reports.push(RecordReport::invalid(index, error));
            continue;
        }
        // One prediction per valid record, in order.
        let Some((profile, prediction)) = predictions.next() else {
            break;
        };
        let report = match prediction {
            Ok(prediction) => {
                let explanation = explainer.map(|e| e.explain(profile, pipeline));
                RecordReport::predicted(index, prediction, explanation)
            }
            Err(error) => RecordReport::invalid(index, &error),
        };
        reports.push(report);
    }
    reports
}

/// Write `reports` to `out` in the given format.
pub fn render<W: Write>(reports: &[RecordReport], format: OutputFormat, out: &mut W) -> io::Result<()> {
    match format {
        OutputFormat::Text => render_text(reports, out),
        OutputFormat::Json => render_json(reports, out),
    }
}

/// Render `reports` into a string.
pub fn render_to_string(reports: &[RecordReport], format: OutputFormat) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = render(reports, format, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn render_text<W: Write>(reports: &[RecordReport], out: &mut W) -> io::Result<()> {
    for report in reports {
        writeln!(out, "{}", "=".repeat(BANNER_WIDTH))?;
        writeln!(out, "Candidate #{}", report.index + 1)?;
        writeln!(out, "{}", "=".repeat(BANNER_WIDTH))?;

        match &report.outcome {
            RecordOutcome::Predicted { prediction, explanation } => {
                write_prediction(prediction, out)?;
                if let Some(explanation) = explanation {
                    writeln!(out)?;
                    write_explanation(explanation, out)?;
                }
            }
            RecordOutcome::Invalid { errors } => {
                writeln!(out, "Status: Invalid record")?;
                for error in errors {
                    writeln!(out, "  - {}: {}", error.field, error.reason)?;
                }
            }
        }
        writeln!(out)?;
    }

    if reports.len() > 1 {
        let summary = Summary::of(reports);
        writeln!(out, "{}", "-".repeat(BANNER_WIDTH))?;
        writeln!(
            out,
            "Summary: {} candidates, {} placed, {} not placed, {} invalid",
            summary.total, summary.placed, summary.not_placed, summary.invalid
        )?;
    }
    Ok(())
}

fn write_prediction<W: Write>(prediction: &PredictionResult, out: &mut W) -> io::Result<()> {
    writeln!(out, "Status: {}", prediction.label)?;
    writeln!(out, "Placement probability: {:.2}%", prediction.probability * 100.0)?;
    writeln!(out, "{}", probability_bar(prediction.probability))
}

fn write_explanation<W: Write>(explanation: &Explanation, out: &mut W) -> io::Result<()> {
    writeln!(out, "Why this result? (model explanation)")?;
    match explanation {
        Explanation::Available(result) => write_result(result, out),
        Explanation::Unavailable { reason } => {
            writeln!(out, "{UNAVAILABLE}")?;
            writeln!(out, "  Reason: {reason}")
        }
    }
}

fn write_result<W: Write>(result: &ExplanationResult, out: &mut W) -> io::Result<()> {
    writeln!(out, "Top {} most important features (global importance):", result.ranking.len())?;
    writeln!(out, "  {:>4}  {:<40} {:>10}", "Rank", "Feature", "Importance")?;
    for (rank, feature) in result.ranking.iter().enumerate() {
        writeln!(out, "  {:>4}  {:<40} {:>10.4}", rank + 1, feature.name, feature.importance)?;
    }

    writeln!(out)?;
    writeln!(out, "Candidate values for key features:")?;
    for kv in &result.candidate_values {
        writeln!(out, "  {:<36} {}", kv.label, kv.value)?;
    }

    writeln!(out)?;
    writeln!(out, "{TIP}")
}

/// Fixed-width bar; the filled share truncates to whole percent.
fn probability_bar(probability: f64) -> String {
    let percent = (probability.clamp(0.0, 1.0) * 100.0) as usize;
    let filled = percent * BAR_WIDTH / 100;
    format!("[{}{}] {percent:>3}%", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn render_json<W: Write>(reports: &[RecordReport], out: &mut W) -> io::Result<()> {
    let output = serde_json::json!({
        "summary": Summary::of(reports),
        "results": reports,
    });
    serde_json::to_writer_pretty(&mut *out, &output)?;
    writeln!(out)
}

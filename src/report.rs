//! Report payloads served by the food-analysis backend.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// One analysis report as returned by `GET /reports`.
///
/// `content` holds the free-text analysis; the backend sends either
/// `timestamp` or `created` (or neither) as the report time. Times may be
/// strings or epoch milliseconds. Fields of an unexpected JSON type decode as
/// empty rather than failing the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Report {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub created: Option<String>,
}

impl Report {
    pub fn new(id: &str, content: &str) -> Self {
        Report {
            id: id.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    pub fn with_created(mut self, created: &str) -> Self {
        self.created = Some(created.to_string());
        self
    }
}

/// Envelope of the report listing endpoint.
///
/// Reports stay raw until [`ReportsResponse::into_reports`] so one
/// undecodable entry does not reject the whole listing.
#[derive(Debug, Deserialize)]
pub struct ReportsResponse {
    pub success: bool,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub reports: Vec<Value>,
}

impl ReportsResponse {
    /// Unwraps the report list, rejecting envelopes flagged `success: false`.
    pub fn into_reports(self) -> Result<Vec<Report>> {
        if !self.success {
            bail!("report API returned success: false");
        }
        Ok(decode_reports(self.reports))
    }
}

/// Decodes each report on its own, skipping (and logging) entries that are
/// not report objects.
pub fn decode_reports(values: Vec<Value>) -> Vec<Report> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match Report::deserialize(value) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(index, error = %e, "Skipping undecodable report");
                None
            }
        })
        .collect()
}

/// Decodes a JSON report document (the API envelope or a bare array) from raw bytes.
pub fn parse_report_document(bytes: &[u8]) -> Result<Vec<Report>> {
    let document: Value = serde_json::from_slice(bytes).context("report document is not JSON")?;
    match document {
        Value::Array(values) => Ok(decode_reports(values)),
        Value::Object(_) => ReportsResponse::deserialize(document)
            .context("not a reports envelope")?
            .into_reports(),
        other => bail!("expected a report list or reports envelope, got {other}"),
    }
}

/// Reads a JSON report document from disk.
pub fn load_report_file(path: &str) -> Result<Vec<Report>> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
    parse_report_document(&bytes).with_context(|| format!("failed to decode {path}"))
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Ok(String::new()),
    }
}

fn optional_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

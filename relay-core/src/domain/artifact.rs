//! Result artifacts found inside upstream payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A PDF embedded in a workflow result
///
/// Serializes as `{"pdfBlob": ...}` or `{"pdfBase64": "..."}`; callers
/// represent "nothing found" as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Artifact {
    /// Binary blob reference, passed through as the upstream sent it
    #[serde(rename = "pdfBlob")]
    PdfBlob(Value),
    /// Base64-encoded PDF document
    #[serde(rename = "pdfBase64")]
    PdfBase64(String),
}

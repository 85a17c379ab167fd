//! Job DTOs returned by the submission and result endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::artifact::Artifact;

/// Body of a 202 response: the upstream started an asynchronous job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAccepted {
    pub job_id: Option<String>,
    /// Same value as `job_id`, kept for callers that expect the engine's name
    pub execution_id: Option<String>,
    pub status: String,
    pub message: Option<String>,
}

/// Body of a 200 response: the upstream answered with a final result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionCompleted {
    pub status: Option<String>,
    pub job_id: Option<String>,
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_blob: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    pub result: Value,
    pub raw: Value,
}

impl SubmissionCompleted {
    /// The embedded PDF, if the result carried one
    pub fn artifact(&self) -> Option<Artifact> {
        match (&self.pdf_blob, &self.pdf_base64) {
            (Some(blob), _) => Some(Artifact::PdfBlob(blob.clone())),
            (None, Some(data)) => Some(Artifact::PdfBase64(data.clone())),
            (None, None) => None,
        }
    }

    /// Attach an extracted artifact
    pub fn with_artifact(mut self, artifact: Option<Artifact>) -> Self {
        match artifact {
            Some(Artifact::PdfBlob(blob)) => self.pdf_blob = Some(blob),
            Some(Artifact::PdfBase64(data)) => self.pdf_base64 = Some(data),
            None => {}
        }
        self
    }
}

/// Acknowledgement for a result pushed by the workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultAck {
    pub ok: bool,
    pub execution_id: String,
}

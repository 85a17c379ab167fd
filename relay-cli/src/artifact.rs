//! Report artifacts
//!
//! Turns a finished job into something a user can keep: a link to follow,
//! a decoded PDF, or the JSON result when no PDF is available.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use relay_core::dto::job::SubmissionCompleted;
use relay_core::{Artifact, ExecutionCacheEntry, extract_artifact, find_download_url};
use serde_json::Value;

pub const PDF_FILE_NAME: &str = "seo-feedback.pdf";
pub const JSON_FILE_NAME: &str = "seo-feedback.json";

/// The most useful form of a finished job's output
#[derive(Debug, PartialEq)]
pub enum Report {
    Link(String),
    Pdf(Vec<u8>),
    Json(Value),
}

impl Report {
    /// Report for a synchronous result; a link wins over an embedded PDF
    pub fn from_completed(completed: &SubmissionCompleted) -> Result<Self> {
        if let Some(url) = &completed.download_url {
            return Ok(Report::Link(url.clone()));
        }

        match completed.artifact() {
            Some(artifact) => Self::from_artifact(artifact, &completed.result),
            None => Ok(Report::Json(completed.result.clone())),
        }
    }

    /// Report for a job collected through the status endpoint
    pub fn from_entry(entry: &ExecutionCacheEntry) -> Result<Self> {
        if let Some(url) = find_download_url(&entry.result) {
            return Ok(Report::Link(url));
        }

        match extract_artifact(&entry.result) {
            Some(artifact) => Self::from_artifact(artifact, &entry.result),
            None => Ok(Report::Json(entry.result.clone())),
        }
    }

    fn from_artifact(artifact: Artifact, result: &Value) -> Result<Self> {
        match artifact {
            Artifact::PdfBase64(data) => Ok(Report::Pdf(decode_pdf(&data)?)),
            Artifact::PdfBlob(Value::String(data)) => Ok(Report::Pdf(decode_pdf(&data)?)),
            // A blob that is not a string cannot be turned back into bytes
            Artifact::PdfBlob(_) => Ok(Report::Json(result.clone())),
        }
    }

    /// Write the report into `dir`, returning the file written
    ///
    /// Links are not saved; `Ok(None)` is returned for them.
    pub fn save(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let (name, bytes) = match self {
            Report::Link(_) => return Ok(None),
            Report::Pdf(bytes) => (PDF_FILE_NAME, bytes.clone()),
            Report::Json(value) => (
                JSON_FILE_NAME,
                serde_json::to_vec_pretty(value).context("Failed to serialize result")?,
            ),
        };

        let path = dir.join(name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(Some(path))
    }
}

/// Decode base64 PDF data, tolerating a `data:` URL prefix and line breaks
pub fn decode_pdf(data: &str) -> Result<Vec<u8>> {
    let data = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };

    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();

    STANDARD
        .decode(cleaned.as_bytes())
        .context("PDF data is not valid base64")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // "%PDF-1.4\n"
    const PDF_1_4: &str = "JVBERi0xLjQK";

    fn completed(result: Value, pdf_base64: Option<&str>, download_url: Option<&str>) -> SubmissionCompleted {
        SubmissionCompleted {
            status: Some("completed".to_string()),
            job_id: None,
            message: None,
            pdf_blob: None,
            pdf_base64: pdf_base64.map(str::to_string),
            download_url: download_url.map(str::to_string),
            result: result.clone(),
            raw: result,
        }
    }

    #[test]
    fn test_decode_pdf() {
        assert_eq!(decode_pdf(PDF_1_4).unwrap(), b"%PDF-1.4\n");
        assert_eq!(
            decode_pdf("data:application/pdf;base64,JVBE\nRi0xLjQK").unwrap(),
            b"%PDF-1.4\n"
        );
        assert!(decode_pdf("not base64!").is_err());
    }

    #[test]
    fn test_link_wins() {
        let report = Report::from_completed(&completed(
            json!({}),
            Some(PDF_1_4),
            Some("https://cdn.example.com/r.pdf"),
        ))
        .unwrap();
        assert_eq!(report, Report::Link("https://cdn.example.com/r.pdf".to_string()));
    }

    #[test]
    fn test_embedded_pdf_is_decoded() {
        let report = Report::from_completed(&completed(json!({}), Some(PDF_1_4), None)).unwrap();
        assert_eq!(report, Report::Pdf(b"%PDF-1.4\n".to_vec()));
    }

    #[test]
    fn test_entry_without_pdf_falls_back_to_json() {
        let entry = ExecutionCacheEntry {
            execution_id: "abc".to_string(),
            status: "completed".to_string(),
            message: None,
            result: json!({ "score": 91 }),
            cached_at: 0,
            sequence: 0,
        };

        assert_eq!(Report::from_entry(&entry).unwrap(), Report::Json(json!({ "score": 91 })));
    }

    #[test]
    fn test_save() {
        let dir = tempfile::tempdir().unwrap();

        let path = Report::Pdf(b"%PDF-1.4\n".to_vec())
            .save(dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(path.file_name().unwrap(), PDF_FILE_NAME);
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4\n");

        let path = Report::Json(json!({ "score": 91 }))
            .save(dir.path())
            .unwrap()
            .unwrap();
        let saved: Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(saved, json!({ "score": 91 }));

        assert!(Report::Link("https://x".to_string()).save(dir.path()).unwrap().is_none());
    }
}

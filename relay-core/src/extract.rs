//! Result extraction
//!
//! Finds a PDF embedded in a workflow result, or a link the caller can
//! download it from. Both searches walk the JSON tree in document order
//! so the same payload always yields the same answer.

use serde_json::Value;

use crate::domain::artifact::Artifact;

/// Base64 encoding of the `%PDF` magic bytes
pub const PDF_BASE64_PREFIX: &str = "JVBER";

const URL_KEYS: [&str; 11] = [
    "url",
    "pdfUrl",
    "downloadUrl",
    "resultUrl",
    "fileUrl",
    "link",
    "location",
    "redirect",
    "href",
    "download_url",
    "file_url",
];

/// Find the first PDF artifact in `value`
///
/// Pre-order traversal with an explicit stack. At each object the keys
/// `pdfBlob`, `pdfBase64`, `pdf_base64` and `pdf` are checked in that order
/// before any child is visited; a bare string starting with the PDF base64
/// prefix matches wherever it appears.
pub fn extract_artifact(value: &Value) -> Option<Artifact> {
    let mut stack = vec![value];

    while let Some(node) = stack.pop() {
        match node {
            Value::Object(obj) => {
                if let Some(blob) = obj.get("pdfBlob").filter(|v| is_truthy(v)) {
                    return Some(Artifact::PdfBlob(blob.clone()));
                }
                for key in ["pdfBase64", "pdf_base64"] {
                    if let Some(Value::String(data)) = obj.get(key) {
                        return Some(Artifact::PdfBase64(data.clone()));
                    }
                }
                if let Some(Value::String(data)) = obj.get("pdf") {
                    if data.starts_with(PDF_BASE64_PREFIX) {
                        return Some(Artifact::PdfBase64(data.clone()));
                    }
                }
                // Reversed so the first child is popped first
                stack.extend(obj.values().rev());
            }
            Value::Array(items) => stack.extend(items.iter().rev()),
            Value::String(s) if s.starts_with(PDF_BASE64_PREFIX) => {
                return Some(Artifact::PdfBase64(s.clone()));
            }
            _ => {}
        }
    }

    None
}

/// Find a downloadable `http(s)://` link in `value`
///
/// Objects are searched through the common link keys first, then every
/// property in document order.
pub fn find_download_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            let lower = trimmed.to_ascii_lowercase();
            (lower.starts_with("http://") || lower.starts_with("https://"))
                .then(|| trimmed.to_string())
        }
        Value::Array(items) => items.iter().find_map(find_download_url),
        Value::Object(obj) => URL_KEYS
            .iter()
            .filter_map(|key| obj.get(*key).filter(|v| is_truthy(v)))
            .chain(obj.values())
            .find_map(find_download_url),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

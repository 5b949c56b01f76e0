//! Ingested material representation.
//!
//! One user submission becomes one [`IngestedMaterial`]. Submissions replace
//! each other wholesale; nothing is ever merged.

use crate::error::{PensumError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of ingested material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Text,
    VideoLink,
    Document,
    Unsupported,
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialKind::Text => write!(f, "text"),
            MaterialKind::VideoLink => write!(f, "video link"),
            MaterialKind::Document => write!(f, "document"),
            MaterialKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Payload of an ingested material, matched exhaustively by kind.
#[derive(Debug, Clone)]
pub enum MaterialData {
    Text(String),
    Binary { bytes: Vec<u8>, filename: String },
}

/// One unit of user-supplied lecture material.
///
/// Constructors enforce that kind and payload shape agree: a video link
/// carries a URL string, text carries a non-empty string, a document
/// carries bytes with a filename.
#[derive(Debug, Clone)]
pub struct IngestedMaterial {
    pub id: Uuid,
    pub kind: MaterialKind,
    pub data: MaterialData,
    pub created_at: DateTime<Utc>,
}

impl IngestedMaterial {
    fn new(kind: MaterialKind, data: MaterialData) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            data,
            created_at: Utc::now(),
        }
    }

    /// Create text material. Empty or whitespace-only input is rejected.
    pub fn text(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(PensumError::InvalidInput(
                "Text material is empty. Paste the lecture content you want to study.".to_string(),
            ));
        }
        Ok(Self::new(
            MaterialKind::Text,
            MaterialData::Text(content.to_string()),
        ))
    }

    /// Create video-link material from a URL string.
    pub fn video_link(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(PensumError::InvalidInput(
                "Video link is empty.".to_string(),
            ));
        }
        Ok(Self::new(
            MaterialKind::VideoLink,
            MaterialData::Text(url.to_string()),
        ))
    }

    /// Create document material from a file's bytes and name.
    pub fn document(filename: &str, bytes: Vec<u8>) -> Result<Self> {
        if filename.trim().is_empty() {
            return Err(PensumError::InvalidInput(
                "Document has no filename.".to_string(),
            ));
        }
        if bytes.is_empty() {
            return Err(PensumError::InvalidInput(format!(
                "Document '{}' is empty.",
                filename
            )));
        }
        Ok(Self::new(
            MaterialKind::Document,
            MaterialData::Binary {
                bytes,
                filename: filename.to_string(),
            },
        ))
    }

    /// Create a material of an unrecognized kind. Normalization of this
    /// material always fails; the variant exists so callers can carry the
    /// rejected submission to the error report.
    pub fn unsupported(label: &str) -> Self {
        Self::new(
            MaterialKind::Unsupported,
            MaterialData::Text(label.to_string()),
        )
    }

    /// Short human-readable label for logs and status lines.
    pub fn display_name(&self) -> String {
        match &self.data {
            MaterialData::Binary { filename, .. } => filename.clone(),
            MaterialData::Text(s) => {
                let s = s.trim();
                if s.chars().count() > 40 {
                    let head: String = s.chars().take(40).collect();
                    format!("{}...", head)
                } else {
                    s.to_string()
                }
            }
        }
    }

    /// The document filename, if this material is a document.
    pub fn filename(&self) -> Option<&str> {
        match &self.data {
            MaterialData::Binary { filename, .. } => Some(filename),
            MaterialData::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_material_rejects_blank() {
        assert!(IngestedMaterial::text("   \n\t").is_err());
        let m = IngestedMaterial::text("Lecture on derivatives...").unwrap();
        assert_eq!(m.kind, MaterialKind::Text);
    }

    #[test]
    fn test_document_shape() {
        let m = IngestedMaterial::document("slides.pdf", vec![1, 2, 3]).unwrap();
        assert_eq!(m.kind, MaterialKind::Document);
        assert_eq!(m.filename(), Some("slides.pdf"));
        assert!(IngestedMaterial::document("slides.pdf", vec![]).is_err());
    }

    #[test]
    fn test_display_name_truncates() {
        let long = "x".repeat(100);
        let m = IngestedMaterial::text(&long).unwrap();
        assert!(m.display_name().len() < 50);
        assert!(m.display_name().ends_with("..."));
    }

    #[test]
    fn test_each_submission_gets_fresh_id() {
        let a = IngestedMaterial::text("a").unwrap();
        let b = IngestedMaterial::text("a").unwrap();
        assert_ne!(a.id, b.id);
    }
}

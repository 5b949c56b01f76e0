//! Material normalization.
//!
//! Turns any supported material kind into one bounded plain-text
//! representation for model prompts. Extraction failures surface as
//! user-facing guidance and never flow into a prompt.

mod document;

use crate::config::Settings;
use crate::error::{PensumError, Result};
use crate::material::{IngestedMaterial, MaterialData, MaterialKind};
use crate::transcript::{TranscriptExtractor, YoutubeTranscriptApi};
use std::sync::Arc;
use tracing::{info, instrument};

/// Header prepended to video transcripts so the model knows what the
/// text is.
const TRANSCRIPT_HEADER: &str = "The following is the transcript of a lecture video.";

/// Bounded plain-text representation of one material, derived on demand
/// and never cached beyond the request.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    pub text: String,
}

impl NormalizedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Normalizes ingested material into prompt-ready text.
pub struct Normalizer {
    extractor: TranscriptExtractor,
    max_document_chars: usize,
}

impl Normalizer {
    /// Normalizer with the production transcript capability.
    pub fn new(settings: &Settings) -> Self {
        let extractor = TranscriptExtractor::new(
            Arc::new(YoutubeTranscriptApi::new()),
            settings.transcript.languages.clone(),
        );
        Self::with_extractor(extractor, settings.document.max_chars)
    }

    pub fn with_extractor(extractor: TranscriptExtractor, max_document_chars: usize) -> Self {
        Self {
            extractor,
            max_document_chars,
        }
    }

    /// Produce the material's prompt text, or a structured error telling
    /// the user what to fix. Exactly one of the two ever exists.
    #[instrument(skip(self, material), fields(kind = %material.kind))]
    pub async fn normalize(&self, material: &IngestedMaterial) -> Result<NormalizedText> {
        match (&material.kind, &material.data) {
            (MaterialKind::Text, MaterialData::Text(content)) => {
                if content.trim().is_empty() {
                    return Err(PensumError::InvalidInput(
                        "Text material is empty.".to_string(),
                    ));
                }
                Ok(NormalizedText::new(content.clone()))
            }

            (MaterialKind::VideoLink, MaterialData::Text(url)) => {
                let transcript = self.extractor.extract(url).await?;
                info!(chars = transcript.len(), "Transcript normalized");
                Ok(NormalizedText::new(format!(
                    "{}\n\n{}",
                    TRANSCRIPT_HEADER, transcript
                )))
            }

            (MaterialKind::Document, MaterialData::Binary { bytes, filename }) => {
                let text = document::extract_document_text(filename, bytes)?;
                let text = document::truncate_chars(&text, self.max_document_chars);
                info!(chars = text.len(), "Document normalized");
                Ok(NormalizedText::new(text))
            }

            (MaterialKind::Unsupported, _) => Err(PensumError::InvalidInput(
                "This material kind is not supported.".to_string(),
            )),

            // Constructors keep kind and payload in agreement; reaching
            // here means a hand-built material.
            _ => Err(PensumError::InvalidInput(
                "Material kind and payload disagree.".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{
        TranscriptApi, TranscriptEntry, TranscriptFailure, TranscriptResult, TranscriptTrack,
    };
    use async_trait::async_trait;

    struct StubApi {
        outcome: TranscriptResult<Vec<TranscriptEntry>>,
    }

    #[async_trait]
    impl TranscriptApi for StubApi {
        async fn fetch(
            &self,
            _video_id: &str,
            _languages: &[String],
        ) -> TranscriptResult<Vec<TranscriptEntry>> {
            self.outcome.clone()
        }

        async fn list(&self, _video_id: &str) -> TranscriptResult<Vec<TranscriptTrack>> {
            Err(TranscriptFailure::Unknown("listing unavailable".to_string()))
        }

        async fn fetch_track(
            &self,
            _video_id: &str,
            _track: &TranscriptTrack,
        ) -> TranscriptResult<Vec<TranscriptEntry>> {
            Err(TranscriptFailure::Unknown("unused".to_string()))
        }
    }

    fn normalizer(outcome: TranscriptResult<Vec<TranscriptEntry>>) -> Normalizer {
        let extractor = TranscriptExtractor::new(
            std::sync::Arc::new(StubApi { outcome }),
            vec!["en".to_string()],
        );
        Normalizer::with_extractor(extractor, 8000)
    }

    #[tokio::test]
    async fn test_text_passthrough_unchanged() {
        let material = IngestedMaterial::text("Lecture on derivatives...").unwrap();
        let normalized = normalizer(Ok(vec![])).normalize(&material).await.unwrap();
        assert_eq!(normalized.text, "Lecture on derivatives...");
    }

    #[tokio::test]
    async fn test_video_link_wraps_transcript() {
        let entries = vec![TranscriptEntry {
            text: "limits and continuity".to_string(),
            start_seconds: 0.0,
            duration_seconds: 2.0,
        }];
        let material = IngestedMaterial::video_link("https://youtu.be/abc12345678").unwrap();
        let normalized = normalizer(Ok(entries)).normalize(&material).await.unwrap();
        assert!(normalized.text.starts_with(TRANSCRIPT_HEADER));
        assert!(normalized.text.contains("limits and continuity"));
    }

    #[tokio::test]
    async fn test_disabled_transcript_surfaces_error() {
        let material = IngestedMaterial::video_link("https://youtu.be/abc12345678").unwrap();
        let err = normalizer(Err(TranscriptFailure::Disabled))
            .normalize(&material)
            .await
            .unwrap_err();
        assert!(matches!(err, PensumError::Extraction(_)));
        assert!(err.to_string().contains("disabled"));
        assert!(err.is_user_guidance());
    }

    #[tokio::test]
    async fn test_unsupported_kind_is_terminal() {
        let material = IngestedMaterial::unsupported("mystery blob");
        let err = normalizer(Ok(vec![])).normalize(&material).await.unwrap_err();
        assert!(matches!(err, PensumError::InvalidInput(_)));
    }
}

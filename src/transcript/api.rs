//! Transcript retrieval capability interface.

use async_trait::async_trait;
use thiserror::Error;

/// One timed segment of a transcript.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub text: String,
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

/// One listed transcript variant of a video (language x manual/generated).
#[derive(Debug, Clone)]
pub struct TranscriptTrack {
    /// Language code as reported by the service (e.g. "en", "en-US").
    pub language: String,
    /// Whether the track is auto-generated rather than manually authored.
    pub generated: bool,
    /// Service-specific retrieval locator for this track.
    pub url: String,
}

/// Typed failures of the transcript capability.
#[derive(Debug, Clone, Error)]
pub enum TranscriptFailure {
    #[error("no transcript found for languages [{0}]")]
    NotFound(String),

    #[error("transcripts are disabled for this content")]
    Disabled,

    #[error("{0}")]
    Unknown(String),
}

pub type TranscriptResult<T> = std::result::Result<T, TranscriptFailure>;

/// External transcript capability.
///
/// Exposes both call shapes seen across versions of the underlying
/// service: a direct fetch taking a language preference list, and a
/// listing-then-selection pair. The extractor's strategies each use one
/// shape and fall back to the other.
#[async_trait]
pub trait TranscriptApi: Send + Sync {
    /// Fetch the best transcript for an ordered language preference list.
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> TranscriptResult<Vec<TranscriptEntry>>;

    /// List the available transcript tracks for a video.
    async fn list(&self, video_id: &str) -> TranscriptResult<Vec<TranscriptTrack>>;

    /// Fetch one specific listed track.
    async fn fetch_track(
        &self,
        video_id: &str,
        track: &TranscriptTrack,
    ) -> TranscriptResult<Vec<TranscriptEntry>>;
}

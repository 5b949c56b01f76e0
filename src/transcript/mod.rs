//! Video transcript extraction.
//!
//! Resolves a canonical video id from a pasted link, then retrieves a
//! transcript through an ordered chain of strategies with language
//! preference and fallback.

mod api;
mod youtube;

pub use api::{TranscriptApi, TranscriptEntry, TranscriptFailure, TranscriptResult, TranscriptTrack};
pub use youtube::YoutubeTranscriptApi;

use crate::error::{PensumError, Result};
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use url::Url;

/// Length of a canonical video id.
const VIDEO_ID_LEN: usize = 11;

/// Retrieval strategies, tried in order. Each maps to one call shape of
/// the transcript capability and catches its own failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Single call taking the language preference list directly.
    DirectFetch,
    /// List the available tracks, then select and fetch one.
    ListAndSelect,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::DirectFetch => write!(f, "direct language fetch"),
            Strategy::ListAndSelect => write!(f, "track listing"),
        }
    }
}

const STRATEGIES: [Strategy; 2] = [Strategy::DirectFetch, Strategy::ListAndSelect];

/// Transcript extractor over an external transcript capability.
pub struct TranscriptExtractor {
    api: Arc<dyn TranscriptApi>,
    languages: Vec<String>,
}

impl TranscriptExtractor {
    pub fn new(api: Arc<dyn TranscriptApi>, languages: Vec<String>) -> Self {
        Self { api, languages }
    }

    /// Extract a transcript as a single whitespace-joined string of all
    /// segments in chronological order.
    ///
    /// An unresolvable video id fails before any network call. A
    /// "transcripts disabled" answer from the service is terminal; other
    /// failures fall through to the next strategy, and exhausting the
    /// chain reports each strategy's failure reason.
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str) -> Result<String> {
        let video_id = extract_video_id(url).ok_or_else(|| {
            PensumError::InvalidInput(format!("'{}' is not a recognized video URL", url.trim()))
        })?;

        info!(video_id = %video_id, "Extracting transcript");

        let mut failures = Vec::new();
        for strategy in STRATEGIES {
            match self.run_strategy(strategy, &video_id).await {
                Ok(text) => {
                    debug!(strategy = %strategy, chars = text.len(), "Transcript retrieved");
                    return Ok(text);
                }
                Err(TranscriptFailure::Disabled) => {
                    return Err(PensumError::Extraction(
                        "transcripts are disabled for this content".to_string(),
                    ));
                }
                Err(e) => failures.push(format!("{}: {}", strategy, e)),
            }
        }

        Err(PensumError::Extraction(format!(
            "no transcript could be retrieved ({})",
            failures.join("; ")
        )))
    }

    async fn run_strategy(&self, strategy: Strategy, video_id: &str) -> TranscriptResult<String> {
        let entries = match strategy {
            Strategy::DirectFetch => self.api.fetch(video_id, &self.languages).await?,
            Strategy::ListAndSelect => {
                let tracks = self.api.list(video_id).await?;
                self.select_and_fetch(video_id, &tracks).await?
            }
        };
        join_segments(&entries)
    }

    /// Manually authored tracks in preference order, then auto-generated
    /// in the same order. A track that fails to fetch falls through to
    /// the next candidate unless the failure is terminal.
    async fn select_and_fetch(
        &self,
        video_id: &str,
        tracks: &[TranscriptTrack],
    ) -> TranscriptResult<Vec<TranscriptEntry>> {
        let manual = self
            .languages
            .iter()
            .filter_map(|lang| tracks.iter().find(|t| !t.generated && &t.language == lang));
        let generated = self
            .languages
            .iter()
            .filter_map(|lang| tracks.iter().find(|t| t.generated && &t.language == lang));

        let mut last_failure = None;
        for track in manual.chain(generated) {
            match self.api.fetch_track(video_id, track).await {
                Ok(entries) => return Ok(entries),
                Err(TranscriptFailure::Disabled) => return Err(TranscriptFailure::Disabled),
                Err(e) => last_failure = Some(e),
            }
        }

        Err(last_failure.unwrap_or_else(|| TranscriptFailure::NotFound(self.languages.join(", "))))
    }
}

/// Join transcript segments into one string. An empty result is a
/// failure; extraction never produces an empty success.
fn join_segments(entries: &[TranscriptEntry]) -> TranscriptResult<String> {
    let text = entries
        .iter()
        .map(|e| e.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        return Err(TranscriptFailure::Unknown("transcript was empty".to_string()));
    }
    Ok(text)
}

/// Resolve the canonical video id from a pasted link.
///
/// Resolution order: watch-URL query parameter, short-link path, embed
/// path, then a fallback scan for a fixed-length id token.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    if let Ok(url) = Url::parse(input) {
        // Query-parameter lookup (watch?v=).
        if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
            if is_valid_id(&v) {
                return Some(v.into_owned());
            }
        }

        let host = url.host_str().unwrap_or_default();
        let mut segments = url.path_segments().into_iter().flatten();

        // Short-link path lookup (youtu.be/<id>).
        if host.ends_with("youtu.be") {
            if let Some(first) = segments.next() {
                if is_valid_id(first) {
                    return Some(first.to_string());
                }
            }
        } else {
            // Embed-path pattern match (/embed/<id>, /v/<id>, /shorts/<id>).
            while let Some(segment) = segments.next() {
                if matches!(segment, "embed" | "v" | "shorts") {
                    if let Some(id) = segments.next() {
                        if is_valid_id(id) {
                            return Some(id.to_string());
                        }
                    }
                    break;
                }
            }
        }
    }

    // Fallback: scan for a fixed-length id token.
    let token_scan = Regex::new(r"(?:^|[^A-Za-z0-9_-])([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)")
        .expect("Invalid regex");
    token_scan
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn is_valid_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_extract_video_id() {
        // Query parameter
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        // Short link
        assert_eq!(
            extract_video_id("https://youtu.be/abc12345678"),
            Some("abc12345678".to_string())
        );
        // Embed paths
        assert_eq!(
            extract_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        // Fallback token scan
        assert_eq!(
            extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("watch this: youtube.com/watch?v=dQw4w9WgXcQ please"),
            Some("dQw4w9WgXcQ".to_string())
        );

        // Invalid inputs
        assert_eq!(extract_video_id("not a video id"), None);
        assert_eq!(extract_video_id("https://example.com/page"), None);
        assert_eq!(extract_video_id(""), None);
    }

    /// Stub capability with scriptable per-call-shape behavior.
    struct StubApi {
        direct: TranscriptResult<Vec<TranscriptEntry>>,
        tracks: TranscriptResult<Vec<TranscriptTrack>>,
        track_fetch: TranscriptResult<Vec<TranscriptEntry>>,
        list_calls: AtomicUsize,
    }

    impl StubApi {
        fn entries(texts: &[&str]) -> Vec<TranscriptEntry> {
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| TranscriptEntry {
                    text: t.to_string(),
                    start_seconds: i as f64,
                    duration_seconds: 1.0,
                })
                .collect()
        }

        fn track(language: &str, generated: bool) -> TranscriptTrack {
            TranscriptTrack {
                language: language.to_string(),
                generated,
                url: String::new(),
            }
        }
    }

    #[async_trait]
    impl TranscriptApi for StubApi {
        async fn fetch(
            &self,
            _video_id: &str,
            _languages: &[String],
        ) -> TranscriptResult<Vec<TranscriptEntry>> {
            self.direct.clone()
        }

        async fn list(&self, _video_id: &str) -> TranscriptResult<Vec<TranscriptTrack>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.tracks.clone()
        }

        async fn fetch_track(
            &self,
            _video_id: &str,
            _track: &TranscriptTrack,
        ) -> TranscriptResult<Vec<TranscriptEntry>> {
            self.track_fetch.clone()
        }
    }

    fn extractor(api: StubApi) -> TranscriptExtractor {
        TranscriptExtractor::new(Arc::new(api), vec!["en".to_string(), "en-US".to_string()])
    }

    #[tokio::test]
    async fn test_direct_fetch_joins_segments() {
        let api = StubApi {
            direct: Ok(StubApi::entries(&["Welcome to", "the lecture"])),
            tracks: Err(TranscriptFailure::Unknown("unused".to_string())),
            track_fetch: Err(TranscriptFailure::Unknown("unused".to_string())),
            list_calls: AtomicUsize::new(0),
        };
        let text = extractor(api)
            .extract("https://youtu.be/abc12345678")
            .await
            .unwrap();
        assert_eq!(text, "Welcome to the lecture");
    }

    #[tokio::test]
    async fn test_fallthrough_to_listing_strategy() {
        let api = StubApi {
            direct: Err(TranscriptFailure::NotFound("en".to_string())),
            tracks: Ok(vec![StubApi::track("en", true)]),
            track_fetch: Ok(StubApi::entries(&["generated", "captions"])),
            list_calls: AtomicUsize::new(0),
        };
        let text = extractor(api)
            .extract("https://youtu.be/abc12345678")
            .await
            .unwrap();
        assert_eq!(text, "generated captions");
    }

    #[tokio::test]
    async fn test_disabled_is_terminal() {
        let api = StubApi {
            direct: Err(TranscriptFailure::Disabled),
            tracks: Ok(vec![StubApi::track("en", false)]),
            track_fetch: Ok(StubApi::entries(&["never reached"])),
            list_calls: AtomicUsize::new(0),
        };
        let api_ref = Arc::new(api);
        let ext = TranscriptExtractor::new(api_ref.clone(), vec!["en".to_string()]);

        let err = ext.extract("https://youtu.be/abc12345678").await.unwrap_err();
        assert!(matches!(err, PensumError::Extraction(_)));
        assert!(err.to_string().contains("disabled"));
        // No fallback after a terminal failure.
        assert_eq!(api_ref.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhausted_chain_aggregates_failures() {
        let api = StubApi {
            direct: Err(TranscriptFailure::NotFound("en, en-US".to_string())),
            tracks: Err(TranscriptFailure::Unknown("listing timed out".to_string())),
            track_fetch: Err(TranscriptFailure::Unknown("unused".to_string())),
            list_calls: AtomicUsize::new(0),
        };
        let err = extractor(api)
            .extract("https://youtu.be/abc12345678")
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("direct language fetch"));
        assert!(msg.contains("track listing"));
        assert!(msg.contains("listing timed out"));
    }

    #[tokio::test]
    async fn test_empty_transcript_is_failure() {
        let api = StubApi {
            direct: Ok(StubApi::entries(&["", "   "])),
            tracks: Err(TranscriptFailure::NotFound("en".to_string())),
            track_fetch: Err(TranscriptFailure::Unknown("unused".to_string())),
            list_calls: AtomicUsize::new(0),
        };
        let err = extractor(api)
            .extract("https://youtu.be/abc12345678")
            .await
            .unwrap_err();
        assert!(matches!(err, PensumError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_any_call() {
        let api = StubApi {
            direct: Ok(StubApi::entries(&["should not be reached"])),
            tracks: Ok(vec![]),
            track_fetch: Ok(vec![]),
            list_calls: AtomicUsize::new(0),
        };
        let err = extractor(api).extract("not a url at all").await.unwrap_err();
        assert!(matches!(err, PensumError::InvalidInput(_)));
    }
}

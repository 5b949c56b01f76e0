//! YouTube implementation of the transcript capability.
//!
//! Reads the watch page for the caption track listing, then retrieves the
//! chosen track's timed-text XML. No API key required.

use super::api::{
    TranscriptApi, TranscriptEntry, TranscriptFailure, TranscriptResult, TranscriptTrack,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";

/// Transcript capability backed by YouTube's public watch page and
/// timed-text endpoints.
pub struct YoutubeTranscriptApi {
    http: reqwest::Client,
}

/// Caption track entry as embedded in the watch page player response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: String,
    language_code: String,
    /// "asr" marks an auto-generated track.
    kind: Option<String>,
}

impl YoutubeTranscriptApi {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; pensum)")
            .build()
            .expect("Failed to create HTTP client");

        Self { http }
    }

    #[instrument(skip(self))]
    async fn fetch_watch_page(&self, video_id: &str) -> TranscriptResult<String> {
        let url = format!("{}{}", WATCH_URL, video_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| TranscriptFailure::Unknown(format!("watch page request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(TranscriptFailure::Unknown(format!(
                "watch page returned status {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| TranscriptFailure::Unknown(format!("watch page read failed: {}", e)))
    }

    #[instrument(skip(self, track), fields(language = %track.language, generated = track.generated))]
    async fn fetch_timedtext(&self, track: &TranscriptTrack) -> TranscriptResult<Vec<TranscriptEntry>> {
        let response = self
            .http
            .get(&track.url)
            .send()
            .await
            .map_err(|e| TranscriptFailure::Unknown(format!("timed-text request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(TranscriptFailure::Unknown(format!(
                "timed-text returned status {}",
                response.status()
            )));
        }

        let xml = response
            .text()
            .await
            .map_err(|e| TranscriptFailure::Unknown(format!("timed-text read failed: {}", e)))?;

        let entries = parse_timedtext(&xml)?;
        debug!("Fetched {} transcript entries", entries.len());
        Ok(entries)
    }
}

impl Default for YoutubeTranscriptApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptApi for YoutubeTranscriptApi {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> TranscriptResult<Vec<TranscriptEntry>> {
        let tracks = self.list(video_id).await?;

        // Manually authored tracks in preference order, then generated.
        let track = languages
            .iter()
            .find_map(|lang| tracks.iter().find(|t| !t.generated && &t.language == lang))
            .or_else(|| {
                languages
                    .iter()
                    .find_map(|lang| tracks.iter().find(|t| t.generated && &t.language == lang))
            })
            .ok_or_else(|| TranscriptFailure::NotFound(languages.join(", ")))?;

        self.fetch_track(video_id, track).await
    }

    async fn list(&self, video_id: &str) -> TranscriptResult<Vec<TranscriptTrack>> {
        let page = self.fetch_watch_page(video_id).await?;
        parse_caption_tracks(&page)
    }

    async fn fetch_track(
        &self,
        _video_id: &str,
        track: &TranscriptTrack,
    ) -> TranscriptResult<Vec<TranscriptEntry>> {
        self.fetch_timedtext(track).await
    }
}

/// Pull the caption track listing out of the watch page HTML.
///
/// A page without the listing means captions are disabled for the video,
/// which the extractor treats as terminal.
fn parse_caption_tracks(page: &str) -> TranscriptResult<Vec<TranscriptTrack>> {
    let Some(key_pos) = page.find(CAPTION_TRACKS_KEY) else {
        return Err(TranscriptFailure::Disabled);
    };

    let json = &page[key_pos + CAPTION_TRACKS_KEY.len()..];
    let array = slice_json_array(json).ok_or_else(|| {
        TranscriptFailure::Unknown("malformed caption track listing".to_string())
    })?;

    let raw: Vec<RawCaptionTrack> = serde_json::from_str(array)
        .map_err(|e| TranscriptFailure::Unknown(format!("caption listing parse failed: {}", e)))?;

    if raw.is_empty() {
        return Err(TranscriptFailure::Disabled);
    }

    Ok(raw
        .into_iter()
        .map(|t| TranscriptTrack {
            language: t.language_code,
            generated: t.kind.as_deref() == Some("asr"),
            url: t.base_url.replace("\\u0026", "&"),
        })
        .collect())
}

/// Slice a balanced JSON array starting at the first `[` of `input`,
/// respecting string literals and escapes.
fn slice_json_array(input: &str) -> Option<&str> {
    let bytes = input.as_bytes();
    let start = input.find('[')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'[' if !in_string => depth += 1,
            b']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&input[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse timed-text XML (`<text start=".." dur="..">..</text>`) into
/// chronologically ordered entries.
fn parse_timedtext(xml: &str) -> TranscriptResult<Vec<TranscriptEntry>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<TranscriptEntry> = None;

    loop {
        match reader.read_event() {
            Ok(quick_xml::events::Event::Start(e)) if e.local_name().as_ref() == b"text" => {
                let mut start = 0.0;
                let mut duration = 0.0;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value);
                    match attr.key.as_ref() {
                        b"start" => start = value.parse().unwrap_or(0.0),
                        b"dur" => duration = value.parse().unwrap_or(0.0),
                        _ => {}
                    }
                }
                current = Some(TranscriptEntry {
                    text: String::new(),
                    start_seconds: start,
                    duration_seconds: duration,
                });
            }
            Ok(quick_xml::events::Event::Text(t)) => {
                if let Some(entry) = current.as_mut() {
                    entry.text.push_str(t.unescape().unwrap_or_default().as_ref());
                }
            }
            Ok(quick_xml::events::Event::End(e)) if e.local_name().as_ref() == b"text" => {
                if let Some(entry) = current.take() {
                    entries.push(entry);
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(TranscriptFailure::Unknown(format!(
                    "timed-text parse failed: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<transcript>
  <text start="0.0" dur="2.5">Welcome to the lecture</text>
  <text start="2.5" dur="3.1">on derivatives &amp; limits</text>
</transcript>"#;

        let entries = parse_timedtext(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "Welcome to the lecture");
        assert_eq!(entries[1].text, "on derivatives & limits");
        assert!((entries[1].start_seconds - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_caption_tracks() {
        let page = r#"stuff before "captionTracks":[{"baseUrl":"https://example.com/tt?lang=en","languageCode":"en","name":{"simpleText":"English"}},{"baseUrl":"https://example.com/tt?lang=en&kind=asr","languageCode":"en","kind":"asr"}],"other":1"#;

        let tracks = parse_caption_tracks(page).unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(!tracks[0].generated);
        assert!(tracks[1].generated);
        assert_eq!(tracks[0].language, "en");
    }

    #[test]
    fn test_missing_listing_means_disabled() {
        let err = parse_caption_tracks("<html>no captions here</html>").unwrap_err();
        assert!(matches!(err, TranscriptFailure::Disabled));
    }

    #[test]
    fn test_slice_json_array_respects_strings() {
        let input = r#"[{"a":"val with ] bracket"},{"b":[1,2]}] trailing"#;
        let sliced = slice_json_array(input).unwrap();
        assert!(sliced.ends_with("]}]"));
        let parsed: serde_json::Value = serde_json::from_str(sliced).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }
}

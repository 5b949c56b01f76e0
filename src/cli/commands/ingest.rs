//! Shared material ingestion from command-line input.

use crate::error::{PensumError, Result};
use crate::material::IngestedMaterial;
use std::io::Read;
use std::path::Path;

/// Build an [`IngestedMaterial`] from the command's input argument.
///
/// With `force_text` the input is raw lecture text (`-` reads stdin).
/// Otherwise an http(s) URL becomes a video link and an existing path
/// becomes a document; anything else is rejected with guidance.
pub(crate) fn ingest_input(input: &str, force_text: bool) -> Result<IngestedMaterial> {
    if force_text {
        let content = if input == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            input.to_string()
        };
        return IngestedMaterial::text(&content);
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        return IngestedMaterial::video_link(input);
    }

    let path = Path::new(input);
    if path.is_file() {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PensumError::InvalidInput(format!("'{}' has no usable filename", input)))?;
        let bytes = std::fs::read(path)?;
        return IngestedMaterial::document(filename, bytes);
    }

    Err(PensumError::InvalidInput(format!(
        "'{}' is neither an existing file nor a link. Pass a path, an http(s) URL, or use --text for raw lecture text.",
        input
    )))
}

/// Fail fast with a remedy when the API key is missing, before any
/// network-bound work starts.
pub(crate) fn require_api_key() -> Result<()> {
    if crate::openai::is_api_key_configured() {
        Ok(())
    } else {
        Err(PensumError::Config(
            "OPENAI_API_KEY is not set. Export your API key and retry.".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialKind;

    #[test]
    fn test_url_becomes_video_link() {
        let m = ingest_input("https://youtu.be/abc12345678", false).unwrap();
        assert_eq!(m.kind, MaterialKind::VideoLink);
    }

    #[test]
    fn test_forced_text() {
        let m = ingest_input("Lecture on derivatives...", true).unwrap();
        assert_eq!(m.kind, MaterialKind::Text);
    }

    #[test]
    fn test_missing_path_is_guidance_error() {
        let err = ingest_input("no-such-file.pdf", false).unwrap_err();
        assert!(matches!(err, PensumError::InvalidInput(_)));
        assert!(err.to_string().contains("--text"));
    }
}

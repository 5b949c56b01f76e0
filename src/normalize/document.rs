//! Document text extraction.
//!
//! Page-by-page (slide-by-slide) extraction with position markers, fully
//! in memory. Kinds that cannot yield text fail hard; the caller tells
//! the user to paste the text instead.

use crate::error::{PensumError, Result};
use std::io::Read;
use tracing::debug;

/// Maximum decompressed bytes read from a single archive entry.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extract text from a document's bytes, dispatching on the filename
/// extension.
pub(crate) fn extract_document_text(filename: &str, bytes: &[u8]) -> Result<String> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => extract_pdf(bytes)?,
        "pptx" => extract_pptx(bytes)?,
        "ppt" | "doc" | "mp4" | "mov" | "avi" | "mkv" | "webm" => {
            return Err(PensumError::Extraction(format!(
                "'.{}' files do not carry extractable text. Paste the lecture content with --text instead.",
                extension
            )));
        }
        _ => {
            return Err(PensumError::Extraction(format!(
                "unsupported document type '{}'. Supported: .pdf, .pptx; otherwise paste the text with --text.",
                filename
            )));
        }
    };

    if text.trim().is_empty() {
        return Err(PensumError::Extraction(format!(
            "no text could be extracted from '{}'",
            filename
        )));
    }

    Ok(text)
}

/// PDF text with a marker per page, head-first. Page boundaries come
/// from the extractor's form-feed separators; without them the text is
/// one page.
fn extract_pdf(bytes: &[u8]) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| PensumError::Extraction(format!("PDF extraction failed: {}", e)))?;

    let pages: Vec<&str> = text.split('\u{0c}').filter(|p| !p.trim().is_empty()).collect();
    debug!("Extracted {} PDF pages", pages.len());

    if pages.len() <= 1 {
        return Ok(text);
    }
    Ok(join_with_markers("Page", pages.into_iter()))
}

/// PPTX slide text in slide order, one marker per slide.
fn extract_pptx(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| PensumError::Extraction(format!("PPTX open failed: {}", e)))?;

    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .map(|s| s.to_string())
        .collect();
    slide_names.sort_by_key(|name| {
        name.trim_start_matches("ppt/slides/slide")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });

    if slide_names.is_empty() {
        return Err(PensumError::Extraction(
            "PPTX contains no slides".to_string(),
        ));
    }

    let mut slides = Vec::with_capacity(slide_names.len());
    for name in slide_names {
        let xml = read_zip_entry_bounded(&mut archive, &name)?;
        slides.push(extract_text_runs(&xml)?);
    }

    debug!("Extracted {} PPTX slides", slides.len());
    Ok(join_with_markers("Slide", slides.iter().map(|s| s.as_str())))
}

fn join_with_markers<'a>(label: &str, pages: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, page) in pages.enumerate() {
        let page = page.trim();
        if page.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&format!("[{} {}]\n{}", label, i + 1, page));
    }
    out
}

fn read_zip_entry_bounded(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
    name: &str,
) -> Result<Vec<u8>> {
    let entry = archive
        .by_name(name)
        .map_err(|e| PensumError::Extraction(format!("PPTX entry error: {}", e)))?;
    let mut out = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut out)
        .map_err(|e| PensumError::Extraction(format!("PPTX read error: {}", e)))?;
    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(PensumError::Extraction(format!(
            "PPTX entry {} exceeds size limit",
            name
        )));
    }
    Ok(out)
}

/// Collect the `a:t` text runs from one slide's XML.
fn extract_text_runs(xml: &[u8]) -> Result<String> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        if !out.is_empty() {
                            out.push(' ');
                        }
                        out.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(PensumError::Extraction(format!(
                    "PPTX slide parse failed: {}",
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

/// Truncate to at most `max_chars` characters, favoring head content.
/// Counting characters keeps the cut off multi-byte boundaries.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            debug!(
                kept = max_chars,
                dropped = text.chars().count() - max_chars,
                "Truncating extracted document text"
            );
            text[..byte_idx].to_string()
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_pptx(slides: &[&str]) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        for (i, body) in slides.iter().enumerate() {
            writer
                .start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
                .unwrap();
            let xml = format!(
                r#"<?xml version="1.0"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:t>{}</a:t></p:sld>"#,
                body
            );
            writer.write_all(xml.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_pptx_slide_markers_in_order() {
        let bytes = build_pptx(&["Intro to limits", "The chain rule"]);
        let text = extract_document_text("lecture.pptx", &bytes).unwrap();
        assert!(text.contains("[Slide 1]\nIntro to limits"));
        assert!(text.contains("[Slide 2]\nThe chain rule"));
        assert!(text.find("[Slide 1]").unwrap() < text.find("[Slide 2]").unwrap());
    }

    #[test]
    fn test_non_text_bearing_kind_fails_hard() {
        let err = extract_document_text("lecture.mp4", &[0u8; 16]).unwrap_err();
        assert!(matches!(err, PensumError::Extraction(_)));
        assert!(err.to_string().contains("--text"));
    }

    #[test]
    fn test_unknown_extension_fails() {
        let err = extract_document_text("notes.xyz", b"hello").unwrap_err();
        assert!(matches!(err, PensumError::Extraction(_)));
    }

    #[test]
    fn test_invalid_pdf_is_structured_error() {
        let err = extract_document_text("broken.pdf", b"not a pdf").unwrap_err();
        assert!(matches!(err, PensumError::Extraction(_)));
    }

    #[test]
    fn test_truncate_exact_cap() {
        let text = "a".repeat(100);
        let truncated = truncate_chars(&text, 40);
        assert_eq!(truncated.chars().count(), 40);
    }

    #[test]
    fn test_truncate_never_splits_multibyte() {
        // 3-byte characters; a byte-based cut at 40 would land mid-char.
        let text = "어".repeat(50);
        let truncated = truncate_chars(&text, 13);
        assert_eq!(truncated.chars().count(), 13);
        assert!(text.starts_with(&truncated));
    }

    #[test]
    fn test_truncate_short_input_unchanged() {
        assert_eq!(truncate_chars("short", 8000), "short");
    }
}

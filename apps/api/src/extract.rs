//! Document text extraction — thin wrappers over the parsing libraries.
//!
//! PDF goes through `pdf-extract`; DOCX is a zip archive whose
//! `word/document.xml` holds the text runs, read with `quick-xml`. Any failure
//! here is a document-parsing error the handler maps to 422.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(#[from] pdf_extract::OutputError),

    #[error("DOCX archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("DOCX XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document contains no extractable text")]
    Empty,
}

/// Supported upload formats, decided from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// `None` for anything other than `.pdf` / `.docx` (case-insensitive).
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

/// Extracts plain text from an in-memory document.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractError> {
    let text = match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)?,
        DocumentKind::Docx => extract_docx_text(bytes)?,
    };
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

/// Collects `w:t` text runs from `word/document.xml`, one line per paragraph.
fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut document_xml)?;

    let mut reader = Reader::from_reader(document_xml.as_bytes());
    let mut text = String::new();
    let mut in_text_run = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                text.push_str(&t.unescape()?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(DocumentKind::from_filename("resume.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_filename("Resume.DOCX"), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_filename("resume.txt"), None);
        assert_eq!(DocumentKind::from_filename("resume"), None);
    }

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_docx_text_runs_and_paragraphs() {
        let xml = r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>Collaborative engineer</w:t></w:r></w:p>
                <w:p><w:r><w:t>Python &amp; AWS</w:t></w:r></w:p>
              </w:body>
            </w:document>"#;
        let bytes = build_docx(xml);
        let text = extract_text(DocumentKind::Docx, &bytes).unwrap();
        assert_eq!(text, "Collaborative engineer\nPython & AWS");
    }

    #[test]
    fn test_docx_without_document_xml_is_parse_error() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default();
        writer.start_file("unrelated.txt", options).unwrap();
        writer.write_all(b"not a docx").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert!(matches!(
            extract_text(DocumentKind::Docx, &bytes),
            Err(ExtractError::Archive(_))
        ));
    }

    #[test]
    fn test_garbage_bytes_fail_for_both_kinds() {
        let garbage = b"definitely not a document";
        assert!(extract_text(DocumentKind::Docx, garbage).is_err());
        assert!(extract_text(DocumentKind::Pdf, garbage).is_err());
    }

    #[test]
    fn test_docx_with_no_text_is_empty_error() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body></w:body></w:document>"#;
        let bytes = build_docx(xml);
        assert!(matches!(
            extract_text(DocumentKind::Docx, &bytes),
            Err(ExtractError::Empty)
        ));
    }
}

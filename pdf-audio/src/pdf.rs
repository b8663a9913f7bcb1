// PDF text extraction

use log::debug;
use lopdf::Document;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{tool} not found. Install poppler-utils (provides pdftotext)")]
    ToolMissing { tool: &'static str },

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: &'static str, stderr: String },

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Extracted text is not valid UTF-8")]
    InvalidText,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text extraction backend; takes the raw file bytes and returns plain text.
pub trait PdfExtractor: Send + Sync {
    /// Extract the full text content of a PDF document.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError>;

    /// Backend name (for diagnostics).
    fn name(&self) -> &str;
}

/// Extractor that shells out to poppler's `pdftotext`.
pub struct PdftotextExtractor {
    binary: PathBuf,
}

impl PdftotextExtractor {
    /// Locate `pdftotext` on PATH.
    pub fn new() -> Result<Self, ExtractError> {
        let binary =
            which::which("pdftotext").map_err(|_| ExtractError::ToolMissing { tool: "pdftotext" })?;
        Ok(Self { binary })
    }

    /// Use a specific `pdftotext` binary.
    #[cfg(test)]
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        // pdftotext needs a seekable file, so stage the bytes on disk
        let mut staged = tempfile::Builder::new().suffix(".pdf").tempfile()?;
        staged.write_all(bytes)?;
        staged.flush()?;

        let output = Command::new(&self.binary)
            .args(["-q", "-enc", "UTF-8"])
            .arg(staged.path())
            .arg("-")
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ExtractError::ToolFailed {
                tool: "pdftotext",
                stderr: if stderr.is_empty() {
                    format!("exit status {}", output.status)
                } else {
                    stderr
                },
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ExtractError::InvalidText)
    }

    fn name(&self) -> &str {
        "pdftotext"
    }
}

/// In-process extractor built on `lopdf`; needs no external tools.
#[derive(Debug, Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Parse(e.to_string()))?;

        // Pages come back keyed and ordered by page number
        let mut text = String::new();
        for page in doc.get_pages().keys().copied() {
            match doc.extract_text(&[page]) {
                Ok(page_text) => {
                    if !text.is_empty() {
                        text.push_str("\n\n");
                    }
                    text.push_str(page_text.trim());
                }
                Err(e) => debug!("Page {}: no extractable text ({})", page, e),
            }
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}

/// Prefer `pdftotext` when installed, otherwise fall back to `lopdf`.
pub fn default_extractor() -> Box<dyn PdfExtractor> {
    match PdftotextExtractor::new() {
        Ok(extractor) => Box::new(extractor),
        Err(e) => {
            debug!("{}; using lopdf", e);
            Box::new(LopdfExtractor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_reports_io_error() {
        let extractor = PdftotextExtractor::with_binary("/nonexistent/pdftotext");
        let err = extractor.extract_text(b"%PDF-1.4").unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    #[test]
    fn test_locate_pdftotext() {
        // Either found on PATH or reports the missing tool
        match PdftotextExtractor::new() {
            Ok(extractor) => assert_eq!(extractor.name(), "pdftotext"),
            Err(e) => assert!(e.to_string().contains("poppler")),
        }
    }

    /// Single-page PDF showing `line` in Courier.
    fn one_page_pdf(line: &str) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{Object, Stream, dictionary};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_lopdf_extracts_page_text() {
        let bytes = one_page_pdf("Hello from page one");
        let text = LopdfExtractor.extract_text(&bytes).unwrap();
        assert!(text.contains("Hello from page one"), "{:?}", text);
    }

    #[test]
    fn test_lopdf_rejects_garbage() {
        let err = LopdfExtractor
            .extract_text(b"definitely not a pdf")
            .unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }

    #[test]
    fn test_default_extractor_is_available() {
        let name = default_extractor().name().to_string();
        assert!(name == "pdftotext" || name == "lopdf");
    }

    #[test]
    fn test_garbage_input_fails() {
        let Ok(extractor) = PdftotextExtractor::new() else {
            return;
        };
        let err = extractor.extract_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::ToolFailed { .. }));
    }
}

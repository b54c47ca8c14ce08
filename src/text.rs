use crate::{Error, Result};
use lopdf::Document;
use std::path::Path;

// ── PdfText ───────────────────────────────────────────────────────────────────

/// Plain-text view of a PDF document.
///
/// # Creating an extractor
///
/// ```no_run
/// use extractpdfrecord::PdfText;
///
/// // From a file path
/// let pdf = PdfText::from_path("study.pdf").unwrap();
///
/// // From an in-memory buffer
/// let bytes = std::fs::read("study.pdf").unwrap();
/// let pdf = PdfText::from_bytes(&bytes).unwrap();
///
/// println!("{} pages", pdf.page_count());
/// println!("{}", pdf.full_text().unwrap());
/// ```
pub struct PdfText {
    document: Document,
}

impl PdfText {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Load a PDF from the file system.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading PDF");
        Ok(Self {
            document: Document::load(path)?,
        })
    }

    /// Load a PDF from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            document: Document::load_mem(data)?,
        })
    }

    // ── Text ──────────────────────────────────────────────────────────────────

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Text of every page, in page order.
    ///
    /// A page whose content stream cannot be decoded fails the whole call;
    /// there is no partial result.
    pub fn page_texts(&self) -> Result<Vec<String>> {
        self.document
            .get_pages()
            .keys()
            .map(|&number| self.document.extract_text(&[number]).map_err(Error::from))
            .collect()
    }

    /// Every page's text followed by a newline, concatenated, then trimmed.
    ///
    /// A document without pages yields an empty string.
    pub fn full_text(&self) -> Result<String> {
        let pages = self.page_texts()?;
        let text = join_pages(&pages);
        tracing::debug!(pages = pages.len(), bytes = text.len(), "extracted text");
        Ok(text)
    }
}

/// Read the PDF at `path` and return its full text.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    PdfText::from_path(path)?.full_text()
}

fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref());
        text.push('\n');
    }
    text.trim().to_string()
}

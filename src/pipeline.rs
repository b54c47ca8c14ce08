//! One complete run: extract → query → parse → write.

use crate::{CsvWriter, Error, ModelClient, PdfText, RecordConfig, Result};
use std::path::PathBuf;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The CSV file that was written.
    pub output_path: PathBuf,
    /// Pages read from the PDF.
    pub pages: usize,
    /// Length of the extracted text in bytes.
    pub text_len: usize,
    /// Header row, in the order written.
    pub fields: Vec<String>,
}

/// Run the full extraction described by `config`.
///
/// PDF, network and API faults propagate as they occur. When the model's
/// reply holds no usable JSON, the writer is handed nothing, writes nothing,
/// and the reply error ([`Error::NoJsonFound`] or [`Error::MalformedJson`])
/// is returned so callers can tell the two apart.
pub fn run(config: &RecordConfig) -> Result<RunReport> {
    config.validate()?;

    let pdf = PdfText::from_path(&config.pdf_path)?;
    let pages = pdf.page_count();
    let text = pdf.full_text()?;
    drop(pdf);
    tracing::info!(path = %config.pdf_path.display(), pages, bytes = text.len(), "extracted PDF text");

    let client = ModelClient::from_config(config)?;
    let (json, reply_error) = match client.query(&text, &config.prompt) {
        Ok(json) => (Some(json), None),
        Err(e) if e.is_unusable_reply() => (None, Some(e)),
        Err(fault) => return Err(fault),
    };

    let record = CsvWriter::new(&config.output_path)
        .write_json(json.as_deref(), config.schema)
        .map_err(|e| match (e, reply_error) {
            (Error::NoRecord, Some(reply)) => reply,
            (e, _) => e,
        })?;

    Ok(RunReport {
        output_path: config.output_path.clone(),
        pages,
        text_len: text.len(),
        fields: record.keys().map(str::to_owned).collect(),
    })
}

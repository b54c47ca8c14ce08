//! # extractpdfrecord
//!
//! A Rust library that turns a PDF into a single structured CSV record with the
//! help of a hosted chat-completion model.
//!
//! ## What this crate does
//!
//! 1. **Extract text** — reads every page of the PDF and joins the page texts
//!    in document order.
//! 2. **Query the model** — sends a fixed system instruction plus the user
//!    prompt and the extracted text to an OpenAI-compatible
//!    `/chat/completions` endpoint (Mistral by default).
//! 3. **Recover the JSON** — pulls the first `{...}` span out of the reply and
//!    checks that it is well-formed JSON.
//! 4. **Write CSV** — stores the object's keys as the header row and its values
//!    as the single data row.
//!
//! ## Quick example
//!
//! ```no_run
//! use extractpdfrecord::{pipeline, RecordConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RecordConfig::new("study.pdf", std::env::var("MISTRAL_API_KEY")?);
//! let report = pipeline::run(&config)?;
//!
//! println!("{} fields written to {}", report.fields.len(), report.output_path.display());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub mod client;
pub mod config;
pub mod pipeline;
pub mod prompt;
pub mod record;
pub mod reply;
pub mod text;
pub mod writer;

pub use client::ModelClient;
pub use record::Record;
pub use text::PdfText;
pub use writer::CsvWriter;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "pixtral-12b-2409";

/// Chat-completion API root used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

// ── Configuration ────────────────────────────────────────────────────────────

/// How the record's keys are checked against the canonical field list in
/// [`prompt::FIELDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaMode {
    /// Write whatever keys the model returned, in the order it returned them.
    #[default]
    Passthrough,

    /// Write exactly the canonical fields in canonical order. Missing fields
    /// become empty strings; unknown keys are rejected with
    /// [`Error::UnknownFields`].
    Strict,
}

/// Runtime configuration for a single extraction run.
///
/// Build one with [`RecordConfig::new`] and adjust the public fields, or let
/// [`config::ConfigFile`] and the command line fill it in.
#[derive(Debug, Clone)]
pub struct RecordConfig {
    /// The PDF to read.
    pub pdf_path: PathBuf,

    /// Bearer token for the chat-completion API.
    pub api_key: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Destination CSV file. Created or truncated.
    pub output_path: PathBuf,

    /// User prompt placed in front of the extracted text.
    pub prompt: String,

    /// API root; `/chat/completions` is appended to it.
    pub base_url: String,

    /// Request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,

    /// Key checking applied before the CSV is written.
    pub schema: SchemaMode,
}

impl RecordConfig {
    /// Configuration with every optional setting at its default: the built-in
    /// 25-field prompt, [`DEFAULT_MODEL`], [`DEFAULT_BASE_URL`], no timeout,
    /// pass-through schema, and an output file next to the PDF with a `.csv`
    /// extension.
    pub fn new<P: Into<PathBuf>, K: Into<String>>(pdf_path: P, api_key: K) -> Self {
        let pdf_path = pdf_path.into();
        Self {
            output_path: default_output_path(&pdf_path),
            pdf_path,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            prompt: prompt::default_prompt(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            schema: SchemaMode::default(),
        }
    }

    /// Reject settings that cannot produce a request.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("API key is empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Config("model identifier is empty".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base URL is empty".into()));
        }
        Ok(())
    }
}

/// `report.pdf` → `report.csv`, in the same directory.
pub fn default_output_path(pdf_path: &Path) -> PathBuf {
    pdf_path.with_extension("csv")
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
#[derive(Error, Debug)]
pub enum Error {
    /// A filesystem I/O error occurred (reading the PDF or writing the CSV).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying lopdf parser could not load or decode the document.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// The chat-completion request failed in transport or decoding.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The API answered successfully but without any message content.
    #[error("API reply contained no message content")]
    EmptyReply,

    /// The configuration is incomplete or could not be read.
    #[error("configuration error: {0}")]
    Config(String),

    /// The model reply contains no `{...}` span.
    #[error("model did not return valid JSON")]
    NoJsonFound { raw: String },

    /// The `{...}` span in the model reply is not well-formed JSON.
    #[error("received invalid JSON response from the model: {message}")]
    MalformedJson { raw: String, message: String },

    /// The JSON parsed, but it is not an object (e.g. an array).
    #[error("extracted content is not a valid JSON object")]
    NotAnObject,

    /// The JSON object has no keys, so there is nothing to put in a row.
    #[error("extracted JSON object is empty")]
    EmptyRecord,

    /// Strict schema mode found keys outside the canonical field list.
    #[error("unexpected fields in record: {}", .0.join(", "))]
    UnknownFields(Vec<String>),

    /// The writer was handed no JSON text at all.
    #[error("no valid JSON data to save")]
    NoRecord,

    /// The CSV serialiser failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// `true` for failures caused by what the model returned, as opposed to
    /// I/O, network, or configuration faults.
    pub fn is_unusable_reply(&self) -> bool {
        matches!(
            self,
            Error::NoJsonFound { .. }
                | Error::MalformedJson { .. }
                | Error::NotAnObject
                | Error::EmptyRecord
                | Error::UnknownFields(_)
                | Error::NoRecord
        )
    }

    /// The raw model reply, when the error carries one.
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            Error::NoJsonFound { raw } | Error::MalformedJson { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

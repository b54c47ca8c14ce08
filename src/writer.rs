use crate::{Error, Record, Result, SchemaMode};
use std::path::{Path, PathBuf};

/// Writes one [`Record`] as a two-row CSV file: a header of field labels and a
/// single data row.
///
/// # Example
///
/// ```no_run
/// use extractpdfrecord::{CsvWriter, SchemaMode};
///
/// let writer = CsvWriter::new("out.csv");
/// let record = writer.write_json(Some(r#"{"X":"a","Y":"b"}"#), SchemaMode::Passthrough).unwrap();
/// assert_eq!(record.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CsvWriter {
    path: PathBuf,
}

impl CsvWriter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse `json` into a record, conform it to `schema`, and write it.
    ///
    /// `None` stands for "no usable reply": nothing is written and
    /// [`Error::NoRecord`] is returned. An object without keys is refused with
    /// [`Error::EmptyRecord`]. The destination is only opened once
    /// the record has been accepted, so every parse or schema failure leaves
    /// an existing file untouched.
    pub fn write_json(&self, json: Option<&str>, schema: SchemaMode) -> Result<Record> {
        let Some(json) = json else {
            tracing::error!(path = %self.path.display(), "no valid JSON data to save");
            return Err(Error::NoRecord);
        };

        let record = Record::from_json(json)
            .and_then(|r| r.conform(schema))
            .and_then(|r| if r.is_empty() { Err(Error::EmptyRecord) } else { Ok(r) })
            .inspect_err(|e| tracing::error!(error = %e, "record rejected"))?;

        self.write_record(&record)?;
        Ok(record)
    }

    /// Create or truncate the destination and write `record` to it.
    pub fn write_record(&self, record: &Record) -> Result<()> {
        let mut out = csv::Writer::from_path(&self.path)?;
        out.write_record(record.keys())?;
        out.write_record(record.values())?;
        out.flush()?;

        tracing::info!(path = %self.path.display(), fields = record.len(), "Data successfully saved to {}", self.path.display());
        Ok(())
    }
}

use crate::{prompt, Error, Result, SchemaMode};
use serde_json::Value;

// ── Record ───────────────────────────────────────────────────────────────────

/// One structured record: field labels paired with cell text, in the order
/// they will be written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    entries: Vec<(String, String)>,
}

impl Record {
    /// Parse the JSON text of an object, keeping its key order.
    ///
    /// Returns [`Error::NotAnObject`] for arrays and scalars and
    /// [`Error::MalformedJson`] when the text does not parse at all.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).map_err(|e| Error::MalformedJson {
            raw: json.to_string(),
            message: e.to_string(),
        })?;

        let Value::Object(map) = value else {
            return Err(Error::NotAnObject);
        };

        Ok(Self {
            entries: map
                .into_iter()
                .map(|(key, value)| (key, cell_text(value)))
                .collect(),
        })
    }

    /// Apply `mode` to the record.
    ///
    /// [`SchemaMode::Strict`] rebuilds the record over [`prompt::FIELDS`]:
    /// canonical order, missing fields as empty strings, and any key outside
    /// the list rejected with [`Error::UnknownFields`].
    pub fn conform(self, mode: SchemaMode) -> Result<Self> {
        match mode {
            SchemaMode::Passthrough => Ok(self),
            SchemaMode::Strict => {
                let unknown: Vec<String> = self
                    .entries
                    .iter()
                    .filter(|(key, _)| !prompt::is_field(key))
                    .map(|(key, _)| key.clone())
                    .collect();
                if !unknown.is_empty() {
                    return Err(Error::UnknownFields(unknown));
                }

                let entries = prompt::FIELDS
                    .iter()
                    .map(|field| {
                        let value = self.get(field).unwrap_or_default().to_string();
                        (field.to_string(), value)
                    })
                    .collect();
                Ok(Self { entries })
            }
        }
    }

    /// Field labels in write order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Cell values in write order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strings verbatim, `null` as an empty cell, anything else as compact JSON.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

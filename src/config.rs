//! Layered configuration: a TOML file, overridden by explicit settings
//! (environment and command line), resolved into a [`RecordConfig`].
//!
//! ```toml
//! pdf_path = "uploads/sgac006.pdf"
//! output_path = "uploads/sgac006.csv"
//! model = "pixtral-12b-2409"
//! prompt_file = "prompts/study.txt"
//! timeout_secs = 120
//! schema = "strict"
//! ```

use crate::{Error, RecordConfig, Result, SchemaMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One layer of settings. Every field is optional; unset fields fall through
/// to the layer below and finally to the [`RecordConfig::new`] defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub pdf_path: Option<PathBuf>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub output_path: Option<PathBuf>,
    pub prompt: Option<String>,
    /// Read the prompt from this file. Ignored when `prompt` is also set in
    /// the same layer.
    pub prompt_file: Option<PathBuf>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub schema: Option<SchemaMode>,
}

impl ConfigFile {
    /// Read and parse a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&text).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Layer `upper` on top of `self`; every field `upper` sets wins.
    pub fn merge(self, upper: ConfigFile) -> ConfigFile {
        // A prompt in the upper layer, inline or from a file, replaces both
        // prompt settings below it.
        let (prompt, prompt_file) = if upper.prompt.is_some() || upper.prompt_file.is_some() {
            (upper.prompt, upper.prompt_file)
        } else {
            (self.prompt, self.prompt_file)
        };

        ConfigFile {
            pdf_path: upper.pdf_path.or(self.pdf_path),
            api_key: upper.api_key.or(self.api_key),
            model: upper.model.or(self.model),
            output_path: upper.output_path.or(self.output_path),
            prompt,
            prompt_file,
            base_url: upper.base_url.or(self.base_url),
            timeout_secs: upper.timeout_secs.or(self.timeout_secs),
            schema: upper.schema.or(self.schema),
        }
    }

    /// Turn the merged layers into a validated [`RecordConfig`].
    ///
    /// `pdf_path` and `api_key` are required.
    pub fn resolve(self) -> Result<RecordConfig> {
        let pdf_path = self
            .pdf_path
            .ok_or_else(|| Error::Config("no PDF path given".into()))?;
        let api_key = self
            .api_key
            .ok_or_else(|| Error::Config("no API key given (set MISTRAL_API_KEY)".into()))?;

        let mut config = RecordConfig::new(pdf_path, api_key);

        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(output_path) = self.output_path {
            config.output_path = output_path;
        }
        if let Some(prompt) = self.prompt {
            config.prompt = prompt;
        } else if let Some(prompt_file) = self.prompt_file {
            config.prompt = std::fs::read_to_string(&prompt_file).map_err(|e| {
                Error::Config(format!("cannot read prompt file {}: {e}", prompt_file.display()))
            })?;
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(schema) = self.schema {
            config.schema = schema;
        }
        config.timeout_secs = self.timeout_secs;

        config.validate()?;
        Ok(config)
    }
}

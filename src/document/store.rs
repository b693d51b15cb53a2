/*!
 * Loading and saving JSON drawings in a chosen character encoding.
 */

use std::io::Write;
use std::path::Path;

use anyhow::{Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info, warn};
use tempfile::NamedTempFile;

use super::DocumentStore;
use super::model::Drawing;
use crate::errors::DocumentError;
use crate::sanitizer::encoding::{DEFAULT_CANDIDATE_ENCODINGS, encoding_for_label};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Store for `.json` drawings
#[derive(Debug, Clone)]
pub struct JsonDrawingStore {
    /// Tried in order when loading
    input_encodings: Vec<&'static Encoding>,
    /// Used when saving
    output_encoding: &'static Encoding,
}

impl Default for JsonDrawingStore {
    fn default() -> Self {
        Self::new(DEFAULT_CANDIDATE_ENCODINGS.clone(), UTF_8)
    }
}

impl JsonDrawingStore {
    pub fn new(input_encodings: Vec<&'static Encoding>, output_encoding: &'static Encoding) -> Self {
        Self {
            input_encodings,
            output_encoding,
        }
    }

    /// Build a store from encoding labels as found in the config file
    pub fn from_labels(input_labels: &[String], output_label: &str) -> Result<Self> {
        let input_encodings = input_labels
            .iter()
            .map(|label| {
                encoding_for_label(label).ok_or_else(|| anyhow!("Unknown input encoding: {}", label))
            })
            .collect::<Result<Vec<_>>>()?;
        let output_encoding = encoding_for_label(output_label)
            .ok_or_else(|| anyhow!("Unknown output encoding: {}", output_label))?;
        Ok(Self::new(input_encodings, output_encoding))
    }

    pub fn output_encoding(&self) -> &'static Encoding {
        self.output_encoding
    }

    /// Parse drawing bytes with the first encoding that yields a valid drawing
    pub fn parse(&self, bytes: &[u8]) -> Result<Drawing, DocumentError> {
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut last_error = String::from("no input encoding configured");

        for encoding in &self.input_encodings {
            let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(body) else {
                debug!("Drawing is not valid {}", encoding.name());
                last_error = format!("not valid {}", encoding.name());
                continue;
            };
            match serde_json::from_str::<Drawing>(&text) {
                Ok(drawing) => {
                    debug!("Drawing decoded as {}", encoding.name());
                    return Ok(drawing);
                }
                Err(e) => {
                    debug!("Drawing decoded as {} but did not parse: {}", encoding.name(), e);
                    last_error = e.to_string();
                }
            }
        }

        Err(DocumentError::Format(last_error))
    }

    /// Serialize a drawing into the output encoding
    pub fn serialize(&self, drawing: &Drawing) -> Result<Vec<u8>, DocumentError> {
        let json = serde_json::to_string_pretty(drawing)
            .map_err(|e| DocumentError::Format(e.to_string()))?;
        let (bytes, used, had_errors) = self.output_encoding.encode(&json);
        if had_errors {
            return Err(DocumentError::Encoding(format!(
                "drawing text cannot be represented in {}",
                self.output_encoding.name()
            )));
        }
        if used != self.output_encoding {
            warn!(
                "{} cannot be written, saving as {}",
                self.output_encoding.name(),
                used.name()
            );
        }
        Ok(bytes.into_owned())
    }
}

impl DocumentStore for JsonDrawingStore {
    type Doc = Drawing;

    fn load(&self, path: &Path) -> Result<Drawing, DocumentError> {
        let bytes = std::fs::read(path).map_err(|e| DocumentError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let drawing = self.parse(&bytes)?;
        info!(
            "Loaded {} ({} modelspace entities, {} layouts, {} blocks)",
            path.display(),
            drawing.modelspace.len(),
            drawing.layouts.len(),
            drawing.blocks.len()
        );
        Ok(drawing)
    }

    fn save(&self, drawing: &Drawing, path: &Path) -> Result<(), DocumentError> {
        let write_error = |reason: String| DocumentError::Write {
            path: path.to_path_buf(),
            reason,
        };
        let bytes = self.serialize(drawing)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| write_error(e.to_string()))?;
        temp.write_all(&bytes).map_err(|e| write_error(e.to_string()))?;
        temp.persist(path).map_err(|e| write_error(e.error.to_string()))?;

        info!("Saved {} as {}", path.display(), self.output_encoding.name());
        Ok(())
    }
}

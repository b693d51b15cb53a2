/*!
 * Drawing translation pipeline.
 *
 * A run reads a drawing, extracts its translatable labels, translates them
 * one after another, writes the results back, saves the drawing and writes
 * an audit report:
 *
 * - `walker`: Extraction of text items from every region
 * - `writer`: Write-back and the invalid-text purge pass
 * - `report`: CSV audit trail
 * - `orchestrator`: Run state machine, progress events and cancellation
 */

pub mod orchestrator;
pub mod report;
pub mod walker;
pub mod writer;

use crate::document::{ElementRef, EntityKind};
use crate::translation::TranslationOutcome;

pub use orchestrator::{
    CancellationToken, PipelineRun, ProgressEvent, RunOptions, RunState, RunSummary,
};
pub use report::write_report;
pub use walker::{Extraction, extract_text_items};
pub use writer::{purge_invalid_text, write_back};

/// One translatable label and where it lives
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    /// Address of the element in the drawing
    pub element: ElementRef,
    pub kind: EntityKind,
    /// Decoded label text, formatting codes included
    pub original_text: String,
    pub layer: String,
    /// `modelspace`, a layout name or `block:<name>`
    pub location: String,
    /// Set once the item has been dispatched
    pub translated_text: Option<String>,
    pub outcome: Option<TranslationOutcome>,
}

impl TextItem {
    pub fn new(
        element: ElementRef,
        kind: EntityKind,
        original_text: String,
        layer: &str,
        location: &str,
    ) -> Self {
        Self {
            element,
            kind,
            original_text,
            layer: layer.to_string(),
            location: location.to_string(),
            translated_text: None,
            outcome: None,
        }
    }

    pub fn is_processed(&self) -> bool {
        self.translated_text.is_some()
    }

    /// Translated text differs from the original
    pub fn is_changed(&self) -> bool {
        self.translated_text
            .as_deref()
            .is_some_and(|translated| translated != self.original_text)
    }
}

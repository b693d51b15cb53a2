/*!
 * Drawing document collaborator.
 *
 * The pipeline only sees the traits defined here: a document made of
 * regions (the primary canvas, layout pages and reusable blocks) holding
 * elements, some of which carry text. `model` provides the JSON drawing
 * interchange format and `store` loads and saves it in a chosen encoding.
 */

pub mod model;
pub mod store;

use std::fmt;
use std::path::Path;

use crate::errors::DocumentError;
use crate::sanitizer::RawText;

pub use model::{Block, Drawing, Entity, EntityKind, Layout};
pub use store::JsonDrawingStore;

/// Name of the primary canvas in locations
pub const PRIMARY_REGION_NAME: &str = "modelspace";

/// Prefix of location tags for reusable blocks
pub const GROUP_LOCATION_PREFIX: &str = "block:";

/// System-internal blocks (`*Model_Space`, `*D12`, ...) start with this
pub const SYSTEM_GROUP_PREFIX: char = '*';

/// Whether a block name is reserved by the host application
pub fn is_system_group(name: &str) -> bool {
    name.starts_with(SYSTEM_GROUP_PREFIX)
}

/// Capability of an element whose text can be read and replaced
pub trait TextBearingElement {
    /// Primary text attribute, falling back to the secondary one
    fn get_text(&self) -> Option<RawText>;

    /// Replace the text in whichever attribute the element uses
    fn set_text(&mut self, text: &str) -> Result<(), DocumentError>;
}

/// One entity of a drawing
pub trait Element {
    fn kind(&self) -> EntityKind;

    fn layer(&self) -> &str;

    fn as_text(&self) -> Option<&dyn TextBearingElement>;

    fn as_text_mut(&mut self) -> Option<&mut dyn TextBearingElement>;
}

/// Region of a document holding elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionRef {
    /// Primary canvas
    Primary,
    /// Secondary layout page, by index
    Layout(usize),
    /// Reusable symbol group, by index
    Group(usize),
}

/// Stable address of an element inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub region: RegionRef,
    pub index: usize,
}

impl ElementRef {
    pub fn new(region: RegionRef, index: usize) -> Self {
        Self { region, index }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.region {
            RegionRef::Primary => write!(f, "{}#{}", PRIMARY_REGION_NAME, self.index),
            RegionRef::Layout(layout) => write!(f, "layout {}#{}", layout, self.index),
            RegionRef::Group(group) => write!(f, "block {}#{}", group, self.index),
        }
    }
}

/// Object graph of a drawing as seen by the walker and the writer
pub trait Document {
    fn layout_count(&self) -> usize;

    fn group_count(&self) -> usize;

    /// Name of a region: `modelspace`, the layout name or the block name
    fn region_name(&self, region: RegionRef) -> Option<&str>;

    fn element_count(&self, region: RegionRef) -> usize;

    fn element(&self, at: ElementRef) -> Option<&dyn Element>;

    fn element_mut(&mut self, at: ElementRef) -> Option<&mut dyn Element>;

    /// Text capability of an element, or why it has none
    fn text_mut(&mut self, at: ElementRef) -> Result<&mut dyn TextBearingElement, DocumentError> {
        let element = self
            .element_mut(at)
            .ok_or_else(|| DocumentError::MissingElement(at.to_string()))?;
        let kind = element.kind();
        element
            .as_text_mut()
            .ok_or_else(|| DocumentError::NotTextBearing(kind.to_string()))
    }

    /// Primary canvas followed by every layout page
    fn canvas_regions(&self) -> Vec<RegionRef> {
        std::iter::once(RegionRef::Primary)
            .chain((0..self.layout_count()).map(RegionRef::Layout))
            .collect()
    }

    /// Every reusable group, system groups included
    fn group_regions(&self) -> Vec<RegionRef> {
        (0..self.group_count()).map(RegionRef::Group).collect()
    }

    /// Location tag used in reports
    fn location(&self, region: RegionRef) -> String {
        match region {
            RegionRef::Primary => PRIMARY_REGION_NAME.to_string(),
            RegionRef::Layout(_) => self.region_name(region).unwrap_or_default().to_string(),
            RegionRef::Group(_) => format!(
                "{}{}",
                GROUP_LOCATION_PREFIX,
                self.region_name(region).unwrap_or_default()
            ),
        }
    }
}

/// Loads and saves documents in a selectable text encoding
pub trait DocumentStore {
    type Doc: Document;

    fn load(&self, path: &Path) -> Result<Self::Doc, DocumentError>;

    fn save(&self, document: &Self::Doc, path: &Path) -> Result<(), DocumentError>;
}

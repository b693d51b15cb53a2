/*!
 * JSON drawing interchange model.
 *
 * A drawing is a modelspace, a list of layouts and a list of blocks, each
 * holding tagged entities. Fields the translator does not understand are
 * kept in `extra` and written back untouched, so geometry and styling
 * survive a round trip.
 */

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Document, Element, ElementRef, RegionRef, TextBearingElement};
use crate::errors::DocumentError;
use crate::sanitizer::{RawText, is_invalid_char};

fn default_layer() -> String {
    "0".to_string()
}

/// Kind discriminant of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Text,
    MText,
    AttDef,
    Attrib,
    Dimension,
    Line,
    Circle,
    Insert,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::MText => "MTEXT",
            Self::AttDef => "ATTDEF",
            Self::Attrib => "ATTRIB",
            Self::Dimension => "DIMENSION",
            Self::Line => "LINE",
            Self::Circle => "CIRCLE",
            Self::Insert => "INSERT",
        }
    }

    /// Kinds whose text is collected for translation
    pub fn is_translatable(&self) -> bool {
        matches!(self, Self::Text | Self::MText)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single-line text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEntity {
    #[serde(default = "default_layer")]
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<RawText>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Multi-line text with inline formatting codes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MTextEntity {
    #[serde(default = "default_layer")]
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<RawText>,
    /// Secondary attribute used by some exporters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<RawText>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Attribute definition or attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeEntity {
    #[serde(default = "default_layer")]
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<RawText>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Dimension with an optional text override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionEntity {
    #[serde(default = "default_layer")]
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_override: Option<RawText>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entity without text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryEntity {
    #[serde(default = "default_layer")]
    pub layer: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference to a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertEntity {
    #[serde(default = "default_layer")]
    pub layer: String,
    pub block: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Entity {
    Text(TextEntity),
    MText(MTextEntity),
    AttDef(AttributeEntity),
    Attrib(AttributeEntity),
    Dimension(DimensionEntity),
    Line(GeometryEntity),
    Circle(GeometryEntity),
    Insert(InsertEntity),
}

impl Entity {
    /// TEXT entity on `layer`
    pub fn text(layer: &str, text: impl Into<RawText>) -> Self {
        Self::Text(TextEntity {
            layer: layer.to_string(),
            text: Some(text.into()),
            extra: Map::new(),
        })
    }

    /// MTEXT entity on `layer` using the primary attribute
    pub fn mtext(layer: &str, text: impl Into<RawText>) -> Self {
        Self::MText(MTextEntity {
            layer: layer.to_string(),
            text: Some(text.into()),
            content: None,
            extra: Map::new(),
        })
    }

    pub fn line(layer: &str) -> Self {
        Self::Line(GeometryEntity {
            layer: layer.to_string(),
            extra: Map::new(),
        })
    }

    /// Raw value of the primary text attribute, for inspection
    pub fn raw_text(&self) -> Option<&RawText> {
        match self {
            Self::Text(e) => e.text.as_ref(),
            Self::MText(e) => e.text.as_ref().or(e.content.as_ref()),
            Self::AttDef(e) | Self::Attrib(e) => e.text.as_ref(),
            Self::Dimension(e) => e.text_override.as_ref(),
            Self::Line(_) | Self::Circle(_) | Self::Insert(_) => None,
        }
    }
}

/// Rejects text that would leave the element unsaveable
fn checked(text: &str) -> Result<RawText, DocumentError> {
    match text.chars().find(|c| is_invalid_char(*c)) {
        Some(c) => Err(DocumentError::Encoding(format!(
            "character U+{:04X} cannot be stored in a drawing",
            c as u32
        ))),
        None => Ok(RawText::Text(text.to_string())),
    }
}

fn non_empty(value: &Option<RawText>) -> Option<RawText> {
    value.as_ref().filter(|raw| !raw.is_empty()).cloned()
}

impl TextBearingElement for TextEntity {
    fn get_text(&self) -> Option<RawText> {
        non_empty(&self.text)
    }

    fn set_text(&mut self, text: &str) -> Result<(), DocumentError> {
        self.text = Some(checked(text)?);
        Ok(())
    }
}

impl TextBearingElement for MTextEntity {
    fn get_text(&self) -> Option<RawText> {
        non_empty(&self.text).or_else(|| non_empty(&self.content))
    }

    fn set_text(&mut self, text: &str) -> Result<(), DocumentError> {
        let value = checked(text)?;
        if self.text.is_none() && self.content.is_some() {
            self.content = Some(value);
        } else {
            self.text = Some(value);
        }
        Ok(())
    }
}

impl TextBearingElement for AttributeEntity {
    fn get_text(&self) -> Option<RawText> {
        non_empty(&self.text)
    }

    fn set_text(&mut self, text: &str) -> Result<(), DocumentError> {
        self.text = Some(checked(text)?);
        Ok(())
    }
}

impl TextBearingElement for DimensionEntity {
    fn get_text(&self) -> Option<RawText> {
        non_empty(&self.text_override)
    }

    fn set_text(&mut self, text: &str) -> Result<(), DocumentError> {
        self.text_override = Some(checked(text)?);
        Ok(())
    }
}

impl Element for Entity {
    fn kind(&self) -> EntityKind {
        match self {
            Self::Text(_) => EntityKind::Text,
            Self::MText(_) => EntityKind::MText,
            Self::AttDef(_) => EntityKind::AttDef,
            Self::Attrib(_) => EntityKind::Attrib,
            Self::Dimension(_) => EntityKind::Dimension,
            Self::Line(_) => EntityKind::Line,
            Self::Circle(_) => EntityKind::Circle,
            Self::Insert(_) => EntityKind::Insert,
        }
    }

    fn layer(&self) -> &str {
        match self {
            Self::Text(e) => &e.layer,
            Self::MText(e) => &e.layer,
            Self::AttDef(e) | Self::Attrib(e) => &e.layer,
            Self::Dimension(e) => &e.layer,
            Self::Line(e) | Self::Circle(e) => &e.layer,
            Self::Insert(e) => &e.layer,
        }
    }

    fn as_text(&self) -> Option<&dyn TextBearingElement> {
        match self {
            Self::Text(e) => Some(e),
            Self::MText(e) => Some(e),
            Self::AttDef(e) | Self::Attrib(e) => Some(e),
            Self::Dimension(e) => Some(e),
            Self::Line(_) | Self::Circle(_) | Self::Insert(_) => None,
        }
    }

    fn as_text_mut(&mut self) -> Option<&mut dyn TextBearingElement> {
        match self {
            Self::Text(e) => Some(e),
            Self::MText(e) => Some(e),
            Self::AttDef(e) | Self::Attrib(e) => Some(e),
            Self::Dimension(e) => Some(e),
            Self::Line(_) | Self::Circle(_) | Self::Insert(_) => None,
        }
    }
}

/// Secondary layout page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// Reusable symbol group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// Complete drawing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    /// Header variables, kept verbatim
    #[serde(default)]
    pub header: Map<String, Value>,
    #[serde(default)]
    pub modelspace: Vec<Entity>,
    #[serde(default)]
    pub layouts: Vec<Layout>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_modelspace(mut self, entity: Entity) -> Self {
        self.modelspace.push(entity);
        self
    }

    pub fn with_layout(mut self, name: &str, entities: Vec<Entity>) -> Self {
        self.layouts.push(Layout {
            name: name.to_string(),
            entities,
        });
        self
    }

    pub fn with_block(mut self, name: &str, entities: Vec<Entity>) -> Self {
        self.blocks.push(Block {
            name: name.to_string(),
            entities,
        });
        self
    }

    fn entities(&self, region: RegionRef) -> Option<&Vec<Entity>> {
        match region {
            RegionRef::Primary => Some(&self.modelspace),
            RegionRef::Layout(i) => self.layouts.get(i).map(|l| &l.entities),
            RegionRef::Group(i) => self.blocks.get(i).map(|b| &b.entities),
        }
    }

    fn entities_mut(&mut self, region: RegionRef) -> Option<&mut Vec<Entity>> {
        match region {
            RegionRef::Primary => Some(&mut self.modelspace),
            RegionRef::Layout(i) => self.layouts.get_mut(i).map(|l| &mut l.entities),
            RegionRef::Group(i) => self.blocks.get_mut(i).map(|b| &mut b.entities),
        }
    }

    /// Entity at `at`, typed
    pub fn entity(&self, at: ElementRef) -> Option<&Entity> {
        self.entities(at.region)?.get(at.index)
    }
}

impl Document for Drawing {
    fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    fn group_count(&self) -> usize {
        self.blocks.len()
    }

    fn region_name(&self, region: RegionRef) -> Option<&str> {
        match region {
            RegionRef::Primary => Some(super::PRIMARY_REGION_NAME),
            RegionRef::Layout(i) => self.layouts.get(i).map(|l| l.name.as_str()),
            RegionRef::Group(i) => self.blocks.get(i).map(|b| b.name.as_str()),
        }
    }

    fn element_count(&self, region: RegionRef) -> usize {
        self.entities(region).map_or(0, Vec::len)
    }

    fn element(&self, at: ElementRef) -> Option<&dyn Element> {
        self.entity(at).map(|e| e as &dyn Element)
    }

    fn element_mut(&mut self, at: ElementRef) -> Option<&mut dyn Element> {
        self.entities_mut(at.region)?
            .get_mut(at.index)
            .map(|e| e as &mut dyn Element)
    }
}

/*!
 * Extraction of translatable text items.
 */

use log::{debug, info};

use super::TextItem;
use crate::document::{Document, ElementRef, RegionRef, is_system_group};
use crate::sanitizer::{Script, TextSanitizer};
use crate::translation::PairKey;

/// Items worth translating plus the number of labels left out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub items: Vec<TextItem>,
    /// Labels rejected as invalid or not in the source script
    pub skipped: usize,
}

/// Collect every TEXT and MTEXT label of the canvas regions, and of the
/// non-system blocks when `include_groups` is set.
pub fn extract_text_items<D: Document + ?Sized>(
    document: &D,
    pair: PairKey,
    include_groups: bool,
    sanitizer: &TextSanitizer,
) -> Extraction {
    let source_script = pair.config().source_script;
    let mut regions = document.canvas_regions();
    if include_groups {
        regions.extend(document.group_regions().into_iter().filter(|region| {
            let name = document.region_name(*region).unwrap_or_default();
            if is_system_group(name) {
                debug!("Skipping system block {}", name);
                false
            } else {
                true
            }
        }));
    }

    let mut extraction = Extraction::default();
    for region in regions {
        let location = document.location(region);
        collect_region(document, region, &location, source_script, sanitizer, &mut extraction);
    }

    info!(
        "Extracted {} text item(s) for {}, {} skipped",
        extraction.items.len(),
        pair.config().display_name,
        extraction.skipped
    );
    extraction
}

fn collect_region<D: Document + ?Sized>(
    document: &D,
    region: RegionRef,
    location: &str,
    source_script: Script,
    sanitizer: &TextSanitizer,
    extraction: &mut Extraction,
) {
    for index in 0..document.element_count(region) {
        let at = ElementRef::new(region, index);
        let Some(element) = document.element(at) else {
            continue;
        };
        if !element.kind().is_translatable() {
            continue;
        }
        let Some(raw) = element.as_text().and_then(|text| text.get_text()) else {
            continue;
        };

        let decoded = sanitizer.decode_safely(&raw);
        let cleaned = sanitizer.clean_formatting(&decoded);
        if !sanitizer.is_valid_for_translation(&cleaned) {
            info!("Skipping invalid text at {} ({}): {:?}", at, location, cleaned);
            extraction.skipped += 1;
            continue;
        }
        if !cleaned.chars().any(|c| source_script.contains(c)) {
            info!("Skipping text without source script at {}: {:?}", at, cleaned);
            extraction.skipped += 1;
            continue;
        }

        extraction.items.push(TextItem::new(
            at,
            element.kind(),
            decoded,
            element.layer(),
            location,
        ));
    }
}

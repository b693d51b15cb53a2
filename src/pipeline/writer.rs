/*!
 * Write-back of translated text and the invalid-text purge pass.
 */

use log::{debug, warn};

use super::TextItem;
use crate::document::{Document, ElementRef, EntityKind};
use crate::sanitizer::{RawText, TextSanitizer, strip_invalid_chars};

/// Wrap MTEXT in a font group so CJK glyphs render
pub fn wrap_mtext_font(text: &str, font: &str) -> String {
    format!("{{\\f{}|b0|i0|c134;{}}}", font, text)
}

/// Write `new_text` into the item's element.
///
/// Returns whether the element was updated. On failure the element keeps
/// its previous text.
pub fn write_back<D: Document + ?Sized>(
    document: &mut D,
    item: &TextItem,
    new_text: &str,
    sanitizer: &TextSanitizer,
    mtext_font: Option<&str>,
) -> bool {
    let safe = strip_invalid_chars(&sanitizer.encode_safely(new_text));
    let value = match (item.kind, mtext_font) {
        (EntityKind::MText, Some(font)) if !font.is_empty() => wrap_mtext_font(&safe, font),
        _ => safe,
    };

    match document
        .text_mut(item.element)
        .and_then(|text| text.set_text(&value))
    {
        Ok(()) => {
            debug!("Wrote {:?} to {}", value, item.element);
            true
        }
        Err(e) => {
            warn!("Failed to write text to {}: {}", item.element, e);
            false
        }
    }
}

/// Re-encode the text of every text-bearing element, system blocks included.
///
/// Returns the number of elements whose stored text changed.
pub fn purge_invalid_text<D: Document + ?Sized>(
    document: &mut D,
    sanitizer: &TextSanitizer,
) -> usize {
    let mut regions = document.canvas_regions();
    regions.extend(document.group_regions());

    let mut repaired = 0;
    for region in regions {
        for index in 0..document.element_count(region) {
            let at = ElementRef::new(region, index);
            let Some(text) = document.element_mut(at).and_then(|e| e.as_text_mut()) else {
                continue;
            };
            let Some(raw) = text.get_text() else {
                continue;
            };
            let safe = strip_invalid_chars(&sanitizer.encode_safely(&sanitizer.decode_safely(&raw)));
            if raw == RawText::Text(safe.clone()) {
                continue;
            }
            match text.set_text(&safe) {
                Ok(()) => repaired += 1,
                Err(e) => warn!("Could not purge text at {}: {}", at, e),
            }
        }
    }

    if repaired > 0 {
        warn!("Repaired stored text of {} element(s)", repaired);
    }
    repaired
}

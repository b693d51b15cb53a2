/*!
 * Expansion of French drawing abbreviations into Chinese.
 *
 * Level codes (`RDC`, `B2`, `R+1`) and dimension prefixes (`W:800mm`,
 * `W400*H650`) confuse general-purpose backends, so they are rewritten
 * before dispatch. A label made only of such codes needs no backend at all.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const LEVEL_CODES: &[(&str, &str)] = &[
    ("B1", "负一楼"),
    ("B2", "负二楼"),
    ("B3", "负三楼"),
    ("F1", "一楼"),
    ("F2", "二楼"),
    ("F3", "三楼"),
    ("F4", "四楼"),
    ("RDC", "底层"),
    ("SSL", "地下室"),
    ("SS1", "地下室一层"),
    ("SS2", "地下室二层"),
    ("R+1", "二层"),
    ("R+2", "三层"),
    ("R+3", "四层"),
    ("PLAN", "平面图"),
    ("SHEMA", "示意图"),
    ("SCHEMA", "示意图"),
];

static DIMENSION_PRODUCT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([WHDL])\s*(\d+(?:[.,]\d+)?)\s*[*xX×]\s*([WHDL])\s*(\d+(?:[.,]\d+)?)")
        .expect("dimension product regex is valid")
});

static DIMENSION_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([WHDL])\s*[:=]\s*(\d)").expect("dimension prefix regex is valid")
});

/// Latin letters left once unit suffixes are ignored
static LEFTOVER_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{Latin}+").expect("leftover word regex is valid")
});

fn dimension_name(letter: &str) -> &'static str {
    match letter {
        "W" => "宽度",
        "H" => "高度",
        "D" => "深度",
        _ => "长度",
    }
}

fn is_unit(word: &str) -> bool {
    matches!(word, "mm" | "cm" | "m" | "M" | "MM" | "CM")
}

/// Result of abbreviation expansion
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub text: String,
    /// Nothing left that needs a backend
    pub complete: bool,
}

/// Expand abbreviations in a cleaned label; `None` when nothing matched
pub fn expand_abbreviations(cleaned: &str) -> Option<Expansion> {
    let trimmed = cleaned.trim();
    let upper = trimmed.to_uppercase();
    if let Some((_, expanded)) = LEVEL_CODES.iter().find(|(code, _)| *code == upper) {
        return Some(Expansion {
            text: expanded.to_string(),
            complete: true,
        });
    }

    let products = DIMENSION_PRODUCT.replace_all(trimmed, |caps: &Captures<'_>| {
        format!(
            "{}{}×{}{}",
            dimension_name(&caps[1]),
            &caps[2],
            dimension_name(&caps[3]),
            &caps[4]
        )
    });
    let prefixed = DIMENSION_PREFIX.replace_all(&products, |caps: &Captures<'_>| {
        format!("{}:{}", dimension_name(&caps[1]), &caps[2])
    });

    if prefixed == trimmed {
        return None;
    }
    let complete = LEFTOVER_WORD
        .find_iter(&prefixed)
        .all(|word| is_unit(word.as_str()));
    Some(Expansion {
        text: prefixed.into_owned(),
        complete,
    })
}

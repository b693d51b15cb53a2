/*!
 * Language pairs and their architectural glossaries.
 *
 * Pairs are built once per process and shared read-only. Each pair carries
 * the glossary used for context hints and exact-term overrides, and the
 * ordered table of known mistranslations the post-processor repairs.
 */

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::sanitizer::Script;

/// Label placed in front of hint terms
pub const HINT_TERMS_LABEL: &str = "Architectural terms:";

/// Label placed in front of the original text in a hint
pub const HINT_TEXT_LABEL: &str = "Text:";

/// Maximum number of glossary matches quoted in a hint
pub const MAX_HINT_TERMS: usize = 3;

/// Identifier of a translation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PairKey {
    #[default]
    ZhToFr,
    FrToZh,
    ZhToEn,
    EnToZh,
}

impl PairKey {
    pub const ALL: [PairKey; 4] = [Self::ZhToFr, Self::FrToZh, Self::ZhToEn, Self::EnToZh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZhToFr => "zh_to_fr",
            Self::FrToZh => "fr_to_zh",
            Self::ZhToEn => "zh_to_en",
            Self::EnToZh => "en_to_zh",
        }
    }

    /// Shared configuration of this pair
    pub fn config(&self) -> Arc<LanguagePairConfig> {
        Arc::clone(&LANGUAGE_PAIRS[self])
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PairKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', '>'], "_");
        match normalized.as_str() {
            "zh_to_fr" | "zh__fr" => Ok(Self::ZhToFr),
            "fr_to_zh" | "fr__zh" => Ok(Self::FrToZh),
            "zh_to_en" | "zh__en" => Ok(Self::ZhToEn),
            "en_to_zh" | "en__zh" => Ok(Self::EnToZh),
            _ => Err(anyhow!("Unknown language pair: {}", s)),
        }
    }
}

/// Read-only term table preserving declaration order
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Glossary {
    pub fn new(terms: &[(&str, &str)]) -> Self {
        let mut glossary = Self::default();
        for (source, target) in terms {
            if glossary.index.contains_key(*source) {
                continue;
            }
            glossary.index.insert(source.to_string(), glossary.entries.len());
            glossary
                .entries
                .push((source.to_string(), target.to_string()));
        }
        glossary
    }

    /// Exact lookup of a source term
    pub fn get(&self, term: &str) -> Option<&str> {
        self.index
            .get(term)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Entries whose source term occurs in `text`, in declaration order
    pub fn matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.entries
            .iter()
            .filter(move |(source, _)| text.contains(source.as_str()))
            .map(|(source, target)| (source.as_str(), target.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Static description of one translation direction
#[derive(Debug)]
pub struct LanguagePairConfig {
    pub key: PairKey,
    /// ISO 639-1 source code
    pub source_code: &'static str,
    /// ISO 639-1 target code
    pub target_code: &'static str,
    pub display_name: &'static str,
    /// Script a label must contain to be worth translating
    pub source_script: Script,
    pub glossary: Glossary,
    /// Ordered (wrong, right) replacements applied to backend output
    pub corrections: Vec<(&'static str, &'static str)>,
    /// Expand French drawing abbreviations before dispatch
    pub expands_abbreviations: bool,
}

/// Build the advisory context hint for a cleaned label
///
/// Returns the input unchanged when no glossary term occurs in it. The hint
/// is for logs only and is never sent to a backend.
pub fn build_hint(cleaned_text: &str, pair: &LanguagePairConfig) -> String {
    let hints: Vec<String> = pair
        .glossary
        .matches(cleaned_text)
        .take(MAX_HINT_TERMS)
        .map(|(source, target)| format!("{}={}", source, target))
        .collect();

    if hints.is_empty() {
        return cleaned_text.to_string();
    }
    format!(
        "{} {}. {} {}",
        HINT_TERMS_LABEL,
        hints.join("; "),
        HINT_TEXT_LABEL,
        cleaned_text
    )
}

const ZH_FR_TERMS: &[(&str, &str)] = &[
    ("天花", "plafond"),
    ("吊顶", "faux plafond"),
    ("地面", "sol"),
    ("墙面", "mur"),
    ("卫生间", "salle de bain"),
    ("厨房", "cuisine"),
    ("门窗", "portes et fenêtres"),
    ("入口", "entrée"),
    ("出口", "sortie"),
    ("走廊", "couloir"),
    ("楼梯", "escalier"),
    ("电梯", "ascenseur"),
    ("照明", "éclairage"),
    ("插座", "prise"),
    ("开关", "interrupteur"),
    ("强电", "courant fort"),
    ("弱电", "courant faible"),
    ("监控", "vidéosurveillance"),
    ("消防", "sécurité incendie"),
    ("报警", "alarme"),
    ("空调", "climatisation"),
    ("新风", "ventilation"),
    ("排风", "extraction d'air"),
    ("排烟", "évacuation fumée"),
    ("风口", "grille d'air"),
    ("出风口", "bouche de soufflage"),
    ("回风口", "bouche de reprise"),
    ("风管", "conduite d'air"),
    ("风机", "ventilateur"),
    ("风机盘管", "ventilo-convecteur"),
    ("新风机", "unité de ventilation"),
    ("冷却塔", "tour de refroidissement"),
    ("空调机", "unité de climatisation"),
    ("冷热水", "eau chaude et froide"),
    ("排水管", "évacuation d'eau"),
    ("冷凝水管", "conduite de condensat"),
    ("水管", "conduite d'eau"),
    ("配电箱", "tableau de distribution"),
    ("桥架", "chemin de câbles"),
    ("管道井", "gaine technique"),
    ("设备间", "local technique"),
    ("机房", "local des machines"),
    ("天花图", "plan de plafond"),
    ("控制屏", "écran de contrôle"),
    ("屏幕", "écran"),
    ("控制", "contrôle"),
];

const ZH_EN_TERMS: &[(&str, &str)] = &[
    ("天花", "ceiling"),
    ("吊顶", "suspended ceiling"),
    ("地面", "floor"),
    ("墙面", "wall"),
    ("卫生间", "bathroom"),
    ("厨房", "kitchen"),
    ("门窗", "doors and windows"),
    ("入口", "entrance"),
    ("出口", "exit"),
    ("走廊", "corridor"),
    ("楼梯", "staircase"),
    ("电梯", "elevator"),
    ("照明", "lighting"),
    ("插座", "outlet"),
    ("开关", "switch"),
    ("强电", "power supply"),
    ("弱电", "low voltage"),
    ("监控", "surveillance"),
    ("消防", "fire safety"),
    ("报警", "alarm"),
    ("空调", "air conditioning"),
    ("新风", "fresh air"),
    ("排风", "exhaust air"),
    ("排烟", "smoke exhaust"),
    ("风口", "air vent"),
    ("出风口", "supply air outlet"),
    ("回风口", "return air inlet"),
    ("风管", "air duct"),
    ("风机", "fan"),
    ("风机盘管", "fan coil unit"),
    ("新风机", "fresh air unit"),
    ("冷却塔", "cooling tower"),
    ("空调机", "air handling unit"),
    ("冷热水", "chilled and hot water"),
    ("排水管", "drain pipe"),
    ("冷凝水管", "condensate pipe"),
    ("水管", "water pipe"),
    ("配电箱", "distribution panel"),
    ("桥架", "cable tray"),
    ("管道井", "utility shaft"),
    ("设备间", "equipment room"),
    ("机房", "machine room"),
    ("天花图", "ceiling plan"),
    ("控制屏", "control screen"),
    ("屏幕", "screen"),
    ("控制", "control"),
];

/// Drawing-title words that only appear on the French side
const FR_ZH_EXTRA_TERMS: &[(&str, &str)] = &[("plan", "平面图"), ("shema", "示意图"), ("schéma", "示意图")];

const ZH_FR_CORRECTIONS: &[(&str, &str)] = &[
    ("variole", "plafond"),
    ("Variole", "Plafond"),
    ("virus du plafond", "plafond"),
    ("maladie du plafond", "plafond"),
    ("plan de variole", "plan de plafond"),
    ("fleur de plafond", "plafond"),
    ("toilettes salle de bain", "salle de bain"),
    ("cuisine cuisine", "cuisine"),
];

const ZH_EN_CORRECTIONS: &[(&str, &str)] = &[
    ("smallpox", "ceiling"),
    ("Smallpox", "Ceiling"),
    ("ceiling flower", "ceiling"),
    ("toilet bathroom", "bathroom"),
    ("kitchen kitchen", "kitchen"),
];

const TO_ZH_CORRECTIONS: &[(&str, &str)] = &[("天花板", "天花"), ("厨房厨房", "厨房")];

fn reversed(terms: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
    terms.iter().map(|(zh, other)| (*other, *zh)).collect()
}

/// Longest source terms first, so hints quote the most specific matches
fn longest_first(mut terms: Vec<(&'static str, &'static str)>) -> Vec<(&'static str, &'static str)> {
    terms.sort_by_key(|(source, _)| std::cmp::Reverse(source.chars().count()));
    terms
}

static LANGUAGE_PAIRS: Lazy<HashMap<PairKey, Arc<LanguagePairConfig>>> = Lazy::new(|| {
    let mut fr_zh = reversed(ZH_FR_TERMS);
    fr_zh.extend_from_slice(FR_ZH_EXTRA_TERMS);

    let pairs = [
        LanguagePairConfig {
            key: PairKey::ZhToFr,
            source_code: "zh",
            target_code: "fr",
            display_name: "Chinese → French",
            source_script: Script::Han,
            glossary: Glossary::new(&longest_first(ZH_FR_TERMS.to_vec())),
            corrections: ZH_FR_CORRECTIONS.to_vec(),
            expands_abbreviations: false,
        },
        LanguagePairConfig {
            key: PairKey::FrToZh,
            source_code: "fr",
            target_code: "zh",
            display_name: "French → Chinese",
            source_script: Script::Latin,
            glossary: Glossary::new(&longest_first(fr_zh)),
            corrections: TO_ZH_CORRECTIONS.to_vec(),
            expands_abbreviations: true,
        },
        LanguagePairConfig {
            key: PairKey::ZhToEn,
            source_code: "zh",
            target_code: "en",
            display_name: "Chinese → English",
            source_script: Script::Han,
            glossary: Glossary::new(&longest_first(ZH_EN_TERMS.to_vec())),
            corrections: ZH_EN_CORRECTIONS.to_vec(),
            expands_abbreviations: false,
        },
        LanguagePairConfig {
            key: PairKey::EnToZh,
            source_code: "en",
            target_code: "zh",
            display_name: "English → Chinese",
            source_script: Script::Latin,
            glossary: Glossary::new(&longest_first(reversed(ZH_EN_TERMS))),
            corrections: TO_ZH_CORRECTIONS.to_vec(),
            expands_abbreviations: false,
        },
    ];

    pairs
        .into_iter()
        .map(|pair| (pair.key, Arc::new(pair)))
        .collect()
});

/*!
 * Translation of drawing labels.
 *
 * This module turns one cleaned label into its translation. It is split into
 * several submodules:
 *
 * - `core`: Dispatcher with cache short-circuit and auto-detect fallback
 * - `cache`: In-memory cache with optional SQLite persistence
 * - `glossary`: Language pairs, glossaries and correction tables
 * - `abbreviations`: French drawing abbreviations expanded before dispatch
 * - `postprocess`: Hint stripping, corrections and encoding of backend output
 */

// Re-export main types for easier usage
pub use self::cache::TranslationCache;
pub use self::core::{
    BackendOutcome, DispatchOptions, Translation, TranslationOutcome, TranslationService,
};
pub use self::glossary::{Glossary, LanguagePairConfig, PairKey, build_hint};
pub use self::postprocess::post_process;

// Submodules
pub mod abbreviations;
pub mod cache;
pub mod core;
pub mod glossary;
pub mod postprocess;

/*!
 * Cache-aside translation orchestration.
 *
 * - `core`: the translation service (cache check, pipeline fallback, write-back)
 * - `batch`: ordered all-or-nothing batch translation
 * - `cache`: cache store contract and in-memory backend
 */

// Re-export main types for easier usage
pub use self::batch::{BatchTranslator, TranslatedItem, TranslationItem};
pub use self::cache::{CacheLookup, CacheStats, CacheStore, MemoryCache};
pub use self::core::{DEFAULT_CACHE_TTL, TranslationService};

// Submodules
pub mod batch;
pub mod cache;
pub mod core;

/// Shorten text for log output, appending "..." when cut
pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for the codes the relay accepts
///
/// The upstream pipelines only serve English and a fixed set of Indian
/// languages, all addressed by ISO 639-1 (2-letter) codes.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "hi", "mr", "ta", "te", "gu", "pa", "or", "ml"];

/// Check whether a code is on the supported list (exact, lowercase match)
pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}

/// Validate a language code against the supported list
pub fn validate_language_code(code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(anyhow!("Language code cannot be empty"));
    }

    if is_supported_language(code) {
        Ok(())
    } else {
        Err(anyhow!(
            "Unsupported language code: {} (supported: {})",
            code,
            SUPPORTED_LANGUAGES.join(", ")
        ))
    }
}

/// Get the English language name from an ISO 639-1 code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();
    let lang = Language::from_639_1(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}

/// Supported codes paired with their English names, in list order
pub fn supported_languages() -> Vec<(&'static str, String)> {
    SUPPORTED_LANGUAGES
        .iter()
        .map(|code| {
            let name = get_language_name(code).unwrap_or_else(|_| code.to_string());
            (*code, name)
        })
        .collect()
}

use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;

/// Language utilities for the language codes used as translation keys
///
/// Codes are ISO 639-1 (2-letter) or ISO 639-3 (3-letter), optionally
/// followed by a region subtag (`zh-cn`, `pt-br`). Keys are always stored
/// trimmed and lowercased.
static LANGUAGE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<primary>[a-z]{2,3})(?:-(?P<region>[a-z0-9]{2,8}))?$").unwrap()
});

/// Normalize a language code to the form used for lookups and cache keys
pub fn normalize_language(code: &str) -> String {
    code.trim().to_ascii_lowercase().replace('_', "-")
}

/// Validate a language code against ISO 639 and return its normalized form
pub fn validate_language_code(code: &str) -> Result<String> {
    let normalized = normalize_language(code);

    let captures = LANGUAGE_TAG
        .captures(&normalized)
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    let primary = &captures["primary"];

    let known = match primary.len() {
        2 => Language::from_639_1(primary).is_some(),
        3 => Language::from_639_3(primary).is_some(),
        _ => false,
    };

    if known {
        Ok(normalized)
    } else {
        Err(anyhow!("Invalid language code: {}", code))
    }
}

/// Check if two language codes refer to the same key
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    normalize_language(code1) == normalize_language(code2)
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = validate_language_code(code)?;
    let primary = normalized.split('-').next().unwrap_or(&normalized);

    let lang = if primary.len() == 2 {
        Language::from_639_1(primary)
    } else {
        Language::from_639_3(primary)
    }
    .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}

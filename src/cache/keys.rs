//! Cache key families.
//!
//! `record:<id>` holds a full snapshot of one record. Everything under
//! `list:` holds an already resolved listing for one language, so a single
//! `delete_prefix(LIST_PREFIX)` drops every listing at once.

/// Prefix shared by every listing key
pub const LIST_PREFIX: &str = "list:";

/// Key of a single record snapshot
pub fn record_key(id: i64) -> String {
    format!("record:{}", id)
}

/// Key of one resolved page
///
/// The page size is only part of the key when it differs from the default,
/// so the common case keeps the short `list:<language>:<page>` form.
pub fn page_key(language: &str, page: usize, page_size: usize, default_page_size: usize) -> String {
    if page_size == default_page_size {
        format!("{}{}:{}", LIST_PREFIX, language, page)
    } else {
        format!("{}{}:{}:{}", LIST_PREFIX, language, page, page_size)
    }
}

/// Key of the unpaginated listing of a language
pub fn list_key(language: &str) -> String {
    format!("{}{}", LIST_PREFIX, language)
}

//! Maps flattened key paths into the remote parameter namespace.

/// Separator between prefix and path segments in parameter names.
pub const SEPARATOR: char = '/';

/// Ensures `prefix` starts and ends with the separator.
pub fn normalize_prefix(prefix: &str) -> String {
    let mut normalized = String::with_capacity(prefix.len() + 2);
    if !prefix.starts_with(SEPARATOR) {
        normalized.push(SEPARATOR);
    }
    normalized.push_str(prefix);
    if !normalized.ends_with(SEPARATOR) {
        normalized.push(SEPARATOR);
    }
    normalized
}

/// Builds the parameter name for `path` under `prefix`.
///
/// Segments are used verbatim: no trimming, no case folding.
pub fn to_external_key(prefix: &str, path: &[String]) -> String {
    let mut key = normalize_prefix(prefix);
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            key.push(SEPARATOR);
        }
        key.push_str(segment);
    }
    key
}

/// Path handed to the store's listing call for `prefix`.
///
/// The trailing separator is dropped except for the root.
pub fn listing_path(prefix: &str) -> String {
    let normalized = normalize_prefix(prefix);
    if normalized.len() > 1 {
        normalized[..normalized.len() - 1].to_string()
    } else {
        normalized
    }
}

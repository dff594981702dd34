//! Instance prefixing of names, GUIDs and resolution URIs
//!
//! A prefix lets several instances of one bundle live side by side on a
//! target. An absent or empty prefix leaves every value untouched.

/// Length of a canonical GUID string
pub const GUID_LENGTH: usize = 36;

/// `None` for absent or blank prefixes, the trimmed prefix otherwise
pub fn normalize_prefix(prefix: Option<&str>) -> Option<&str> {
    prefix.map(str::trim).filter(|p| !p.is_empty())
}

/// `name` with the prefix and a single space in front of it
pub fn prefixed_name(prefix: Option<&str>, name: &str) -> String {
    match normalize_prefix(prefix) {
        Some(prefix) => format!("{prefix} {name}"),
        None => name.to_string(),
    }
}

/// The first [`GUID_LENGTH`] characters of `prefix + guid`
///
/// Distinct GUIDs can collide after truncation when the prefix is long;
/// prefixes of 36 characters or more yield the same value for every GUID.
pub fn prefixed_guid(prefix: Option<&str>, guid: &str) -> String {
    match normalize_prefix(prefix) {
        Some(prefix) => prefix.chars().chain(guid.chars()).take(GUID_LENGTH).collect(),
        None => guid.to_string(),
    }
}

/// `uri` with the prefix inserted as its leading path segment
pub fn prefixed_uri(prefix: Option<&str>, uri: &str) -> String {
    let Some(prefix) = normalize_prefix(prefix) else {
        return uri.to_string();
    };
    let prefix = prefix.trim_matches('/');
    if uri.starts_with('/') {
        format!("/{prefix}{uri}")
    } else {
        format!("/{prefix}/{uri}")
    }
}

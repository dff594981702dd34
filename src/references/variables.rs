//! Install variables inside policy bodies
//!
//! A body may carry `${install.NAME}` placeholders for values that differ
//! between targets, such as host names or credentials aliases. They are
//! filled in right before the body is saved. Other `${...}` expressions are
//! gateway context variables and stay untouched.

use std::collections::BTreeMap;

use thiserror::Error;

const OPEN: &str = "${install.";

/// A placeholder naming a variable that has no value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown install variable '{name}'")]
pub struct UnknownVariable {
    pub name: String,
}

/// `body` with every `${install.NAME}` placeholder replaced by its XML-escaped value
///
/// # Errors
///
/// Returns the first placeholder whose name is missing from `values`.
pub fn expand(body: &str, values: &BTreeMap<String, String>) -> Result<String, UnknownVariable> {
    if !body.contains(OPEN) {
        return Ok(body.to_string());
    }

    let mut expanded = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        let value = values.get(name).ok_or_else(|| UnknownVariable {
            name: name.to_string(),
        })?;
        expanded.push_str(&rest[..start]);
        expanded.push_str(&quick_xml::escape::escape(value.as_str()));
        rest = &after[end + 1..];
    }
    expanded.push_str(rest);
    Ok(expanded)
}

/// Whether `name` can be written inside a placeholder
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

//! Cypher identifier escaping and literal rendering
//!
//! Values sent to a store always travel as statement parameters. Identifiers
//! such as relationship types cannot be parameterized, so they are escaped
//! here before being spliced into statement text. Literal rendering is used
//! for log output.

use crate::error::{Error, Result};
use crate::model::{Properties, PropertyValue};
use std::fmt::Write;

/// Whether an identifier can appear in Cypher without backticks
fn is_simple_identifier(identifier: &str) -> bool {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Return a Cypher identifier, escaped with backticks if required
///
/// Backticks inside the identifier are doubled.
///
/// ```
/// use graphlink_core::cypher::cypher_escape;
///
/// assert_eq!(cypher_escape("KNOWS").unwrap(), "KNOWS");
/// assert_eq!(cypher_escape("WORKS WITH").unwrap(), "`WORKS WITH`");
/// assert_eq!(cypher_escape("a`b").unwrap(), "`a``b`");
/// ```
pub fn cypher_escape(identifier: &str) -> Result<String> {
    if identifier.is_empty() {
        return Err(Error::invalid_input("Cypher identifier must not be empty"));
    }
    if is_simple_identifier(identifier) {
        Ok(identifier.to_string())
    } else {
        Ok(format!("`{}`", identifier.replace('`', "``")))
    }
}

/// Render a property value as a Cypher literal
pub fn cypher_repr(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Null => "null".to_string(),
        PropertyValue::Boolean(b) => b.to_string(),
        PropertyValue::Integer(i) => i.to_string(),
        PropertyValue::Float(f) => {
            if f.is_finite() && f.fract() == 0.0 {
                format!("{f:.1}")
            } else {
                f.to_string()
            }
        }
        PropertyValue::String(s) => encode_string(s),
    }
}

/// Render a property value for human-readable output
///
/// Same as [`cypher_repr`] except that strings are returned unquoted.
pub fn cypher_str(value: &PropertyValue) -> String {
    match value {
        PropertyValue::String(s) => s.clone(),
        other => cypher_repr(other),
    }
}

/// Render a property map as a Cypher map literal, e.g. `{reason: 'youth'}`
pub fn cypher_map(properties: &Properties) -> Result<String> {
    let mut out = String::from("{");
    for (i, (key, value)) in properties.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&cypher_escape(key)?);
        out.push_str(": ");
        out.push_str(&cypher_repr(value));
    }
    out.push('}');
    Ok(out)
}

fn encode_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

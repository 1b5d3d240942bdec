//! Canonical equality keys for configuration items.
//!
//! Two items are "the same rule" when their comparison-relevant fields are
//! equal by value, regardless of handle state or field declaration order.
//! The [`EqualityKey`] is a canonical string encoding of exactly those
//! fields, usable both for direct equality tests and as a map key.
//!
//! Encoding rules:
//!
//! - fields are sorted by name; the handle is never encoded
//! - fields the [`KeyProfile`] marks as non-comparison (server metadata)
//!   are excluded
//! - scalars carry a type tag, so `Int(1)` never collides with `Str("1")`
//! - sub-lists are encoded as multisets: element encodings are sorted
//!   lexicographically before joining, because the remote system does not
//!   preserve sub-list ordering
//! - nested items are encoded recursively under the same profile

use secsync_types::{ConfigItem, Value};
use std::collections::HashSet;
use std::fmt;

/// Per-rule-type projection of comparison-relevant fields.
///
/// Each rule type declares once which of its fields identify the rule's
/// configuration and which are server-populated metadata (creation time,
/// modify time, numeric policy ids). The engine itself has no knowledge of
/// any concrete schema.
pub trait KeyProfile {
    /// Returns true if the field participates in value comparison.
    fn is_comparison_field(&self, field: &str) -> bool;
}

/// Profile that compares every field (the handle is always excluded).
///
/// Suitable for rule types whose list responses carry no server metadata
/// beyond the handle itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllFields;

impl KeyProfile for AllFields {
    fn is_comparison_field(&self, _field: &str) -> bool {
        true
    }
}

/// Profile that excludes an explicit set of metadata fields.
///
/// # Examples
///
/// ```
/// use secsync_recon::{FieldFilter, KeyProfile};
///
/// let profile = FieldFilter::ignoring(["create_time", "modify_time", "policy_id"]);
/// assert!(profile.is_comparison_field("action"));
/// assert!(!profile.is_comparison_field("create_time"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldFilter {
    ignored: HashSet<String>,
}

impl FieldFilter {
    /// Creates a filter that ignores the given fields.
    pub fn ignoring<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds another ignored field.
    pub fn and(mut self, field: impl Into<String>) -> Self {
        self.ignored.insert(field.into());
        self
    }
}

impl KeyProfile for FieldFilter {
    fn is_comparison_field(&self, field: &str) -> bool {
        !self.ignored.contains(field)
    }
}

/// Canonical, order-normalized encoding of an item's comparison-relevant
/// fields.
///
/// Two items with equal keys are the same configuration; attached handles
/// and profile-ignored metadata play no part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EqualityKey(String);

impl EqualityKey {
    /// Computes the key of an item under a profile.
    pub fn of<P>(item: &ConfigItem, profile: &P) -> Self
    where
        P: KeyProfile + ?Sized,
    {
        let mut out = String::new();
        encode_item(item, profile, &mut out);
        EqualityKey(out)
    }

    /// Returns the canonical encoding.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EqualityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn encode_item<P>(item: &ConfigItem, profile: &P, out: &mut String)
where
    P: KeyProfile + ?Sized,
{
    let mut fields: Vec<&(String, Value)> = item
        .fields()
        .iter()
        .filter(|(name, _)| profile.is_comparison_field(name))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    out.push('{');
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        encode_str(name, out);
        out.push('=');
        encode_value(value, profile, out);
    }
    out.push('}');
}

fn encode_value<P>(value: &Value, profile: &P, out: &mut String)
where
    P: KeyProfile + ?Sized,
{
    match value {
        Value::Bool(b) => {
            out.push_str("b:");
            out.push_str(if *b { "true" } else { "false" });
        }
        Value::Int(i) => {
            out.push_str("i:");
            out.push_str(&i.to_string());
        }
        Value::Str(s) => {
            out.push_str("s:");
            encode_str(s, out);
        }
        Value::List(items) => {
            // Multiset semantics: sort element encodings before joining.
            let mut encoded: Vec<String> = items
                .iter()
                .map(|element| {
                    let mut buf = String::new();
                    encode_value(element, profile, &mut buf);
                    buf
                })
                .collect();
            encoded.sort();

            out.push_str("l:[");
            out.push_str(&encoded.join(","));
            out.push(']');
        }
        Value::Item(nested) => {
            out.push_str("m:");
            encode_item(nested, profile, out);
        }
    }
}

/// Escapes the structural characters so encodings stay unambiguous.
fn encode_str(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push('"');
}

//! Declarative configuration items.

use crate::{Handle, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One declarative rule (an ACL entry, a geo-block rule, a speed-limit
/// config, a precision-policy entry, a black/white IP entry).
///
/// Fields are kept in declaration order as name/value pairs. An item has
/// no inherent identity; the optional [`Handle`] is attached only once the
/// rule is known to exist remotely (either because it came back from a
/// list call, or because the matcher resolved it after a create). The
/// handle never participates in value comparisons.
///
/// Items are immutable value objects for the duration of one
/// reconciliation pass.
///
/// # Examples
///
/// ```
/// use secsync_types::ConfigItem;
///
/// let rule = ConfigItem::new()
///     .with("action", "drop")
///     .with("d_port_start", 80)
///     .with("d_port_end", 80);
///
/// assert_eq!(rule.get("action").and_then(|v| v.as_str()), Some("drop"));
/// assert!(rule.handle().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigItem {
    /// Field name/value pairs in declaration order.
    fields: Vec<(String, Value)>,
    /// Server-assigned identifier, if known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    handle: Option<Handle>,
}

impl ConfigItem {
    /// Creates an empty item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, builder style.
    ///
    /// An existing field with the same name is overwritten in place.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Attaches a handle, builder style.
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Sets a field, overwriting any existing field with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self.fields.iter_mut().find(|(f, _)| *f == name) {
            existing.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(f, _)| f == name)
            .map(|(_, v)| v)
    }

    /// Returns true if the item has the given field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(f, _)| f == name)
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the item has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the server-assigned handle, if known.
    pub fn handle(&self) -> Option<&Handle> {
        self.handle.as_ref()
    }

    /// Sets the server-assigned handle.
    pub fn set_handle(&mut self, handle: Handle) {
        self.handle = Some(handle);
    }

    /// Returns a copy of this item without its handle.
    ///
    /// Useful when a listed remote item is fed back as desired
    /// configuration.
    pub fn without_handle(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            handle: None,
        }
    }
}

impl fmt::Display for ConfigItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        if let Some(handle) = &self.handle {
            if !self.fields.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "handle={}", handle)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, Value)> for ConfigItem {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut item = ConfigItem::new();
        for (name, value) in iter {
            item.set(name, value);
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_and_accessors() {
        let item = ConfigItem::new()
            .with("action", "drop")
            .with("d_port_start", 443)
            .with("enabled", true);

        assert_eq!(item.len(), 3);
        assert_eq!(item.get("action").and_then(|v| v.as_str()), Some("drop"));
        assert_eq!(item.get("d_port_start").and_then(|v| v.as_int()), Some(443));
        assert!(item.has_field("enabled"));
        assert!(!item.has_field("d_port_end"));
        assert!(item.get("missing").is_none());
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut item = ConfigItem::new().with("action", "drop").with("priority", 10);
        item.set("action", "forward");

        // Field order is preserved on overwrite.
        assert_eq!(item.fields()[0].0, "action");
        assert_eq!(item.get("action").and_then(|v| v.as_str()), Some("forward"));
        assert_eq!(item.len(), 2);
    }

    #[test]
    fn test_handle_attach_and_strip() {
        let handle: Handle = "acl-1".parse().unwrap();
        let item = ConfigItem::new().with("action", "drop").with_handle(handle.clone());

        assert_eq!(item.handle(), Some(&handle));

        let stripped = item.without_handle();
        assert!(stripped.handle().is_none());
        assert_eq!(stripped.fields(), item.fields());
    }

    #[test]
    fn test_display() {
        let item = ConfigItem::new()
            .with("action", "drop")
            .with("d_port_start", 80)
            .with_handle("acl-1".parse().unwrap());

        assert_eq!(item.to_string(), "{action=drop, d_port_start=80, handle=acl-1}");
    }

    #[test]
    fn test_serde_round_trip() {
        let item = ConfigItem::new()
            .with("action", "drop")
            .with("protocols", vec![Value::from("tcp"), Value::from("udp")]);

        let json = serde_json::to_string(&item).unwrap();
        let back: ConfigItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}

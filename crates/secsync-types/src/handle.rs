//! Server-assigned rule identifier.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier assigned by the remote control plane.
///
/// Handles are stable for the lifetime of a remote rule but are unknown at
/// creation time; they are discovered by listing the sibling rules and
/// matching the just-submitted configuration by value.
///
/// # Examples
///
/// ```
/// use secsync_types::Handle;
///
/// let h: Handle = "acl-20481".parse().unwrap();
/// assert_eq!(h.as_str(), "acl-20481");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Creates a handle from a remote identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ParseError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ParseError::InvalidHandle(id));
        }
        Ok(Handle(id))
    }

    /// Returns the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Handle {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Handle::new(s)
    }
}

impl From<Handle> for String {
    fn from(h: Handle) -> String {
        h.0
    }
}

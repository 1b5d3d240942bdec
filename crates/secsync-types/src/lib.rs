//! Common types for the secsync reconciliation engine.
//!
//! This crate provides the value model shared by the engine and its
//! per-rule-type adapters:
//!
//! - [`Value`]: a scalar, sub-list, or nested-item field value
//! - [`ConfigItem`]: one declarative rule as an ordered field map
//! - [`Handle`]: the server-assigned identifier of a remote rule
//!
//! A [`ConfigItem`] has no inherent identity. Its [`Handle`] is populated
//! only after the rule is known to exist remotely, and is never part of
//! value comparisons.

mod handle;
mod item;
mod value;

pub use handle::Handle;
pub use item::ConfigItem;
pub use value::Value;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid handle: {0:?} (must be non-empty)")]
    InvalidHandle(String),

    #[error("invalid integer value: {0}")]
    InvalidInt(String),

    #[error("invalid boolean value: {0}")]
    InvalidBool(String),
}

//! Integration test infrastructure for the secsync reconciliation engine
//!
//! Provides:
//! - In-memory remote gateway with fault injection and delayed visibility
//! - Fixture builders for common rule shapes
//! - Call accounting for asserting retry behavior

pub mod fixtures;
mod gateway;

pub use fixtures::*;
pub use gateway::{CallCounts, MemoryGateway};

//! Reconciliation engine for remote rule collections without stable
//! identifiers.
//!
//! Cloud network-security control planes (anti-DDoS policies, ACLs,
//! rate-limit rules, black/white IP lists) frequently do not return an
//! identifier when a rule is created, and offer no idempotent set-membership
//! API. Convergence has to be computed client side:
//!
//! 1. [`diff`] compares a desired rule collection against the currently
//!    observed remote collection and yields the minimal create/delete sets
//!    (a multiset symmetric difference keyed by [`EqualityKey`]).
//! 2. Creates are submitted, then the siblings are re-listed and
//!    [`find_handle`] locates the just-created rule by field-wise value
//!    equality, discovering its server-assigned handle.
//! 3. Deletes use the handles already known from the observed listing.
//!
//! [`Reconciler`] drives one full pass of this workflow over a
//! [`RemoteGateway`], retrying each RPC under an explicit [`RetryPolicy`].
//! Both [`diff`] and [`find_handle`] are pure functions; a pass that fails
//! partway is safely resumed by simply running another pass against fresh
//! observed state.
//!
//! Which fields of a rule are comparison-relevant (versus server-populated
//! metadata such as creation timestamps) is declared per rule type through
//! a [`KeyProfile`].

mod diff;
mod error;
mod gateway;
mod key;
mod matcher;
mod pass;
mod retry;

pub use diff::{diff, DiffResult};
pub use error::{ReconError, ReconResult};
pub use gateway::{GatewayError, RemoteGateway, Scope};
pub use key::{AllFields, EqualityKey, FieldFilter, KeyProfile};
pub use matcher::find_handle;
pub use pass::{PassReport, Reconciler, ReconcilerConfig};
pub use retry::{Retryable, RetryPolicy};

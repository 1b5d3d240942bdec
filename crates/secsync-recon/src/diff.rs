//! Multiset diff between desired and observed rule collections.

use crate::key::{EqualityKey, KeyProfile};
use secsync_types::ConfigItem;
use std::collections::HashMap;

/// Outcome of one [`diff`] computation.
///
/// `to_create` and `to_delete` are disjoint from each other and from the
/// unchanged items. Applying all creates and all deletes remotely converges
/// the remote collection to exactly the desired one, as multisets, absent
/// concurrent external mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiffResult {
    /// Items present in desired but absent remotely, in desired order.
    pub to_create: Vec<ConfigItem>,
    /// Items present remotely but absent in desired, in observed order.
    /// These carry the handles learned from the observed listing.
    pub to_delete: Vec<ConfigItem>,
}

impl DiffResult {
    /// Returns true if remote state already matches desired state.
    pub fn is_converged(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }
}

/// Computes the minimal create/delete sets that converge an observed remote
/// collection to a desired one, correlating items by value equality.
///
/// Both collections describe the same logical sub-resource scope (all ACL
/// rules on one instance, for example); mixing scopes is a caller error
/// this function cannot detect.
///
/// This is a multiset symmetric difference, not a plain set difference:
/// items appearing the same number of times on both sides are untouched,
/// surplus desired instances become creates, surplus observed instances
/// become deletes. Duplicate-valued rules (two structurally identical ACL
/// entries) are therefore counted correctly.
///
/// Pure and total; either collection may be empty.
pub fn diff<P>(desired: &[ConfigItem], observed: &[ConfigItem], profile: &P) -> DiffResult
where
    P: KeyProfile + ?Sized,
{
    let observed_keys: Vec<EqualityKey> = observed
        .iter()
        .map(|item| EqualityKey::of(item, profile))
        .collect();

    let mut remaining: HashMap<&EqualityKey, usize> = HashMap::new();
    for key in &observed_keys {
        *remaining.entry(key).or_insert(0) += 1;
    }

    let mut to_create = Vec::new();
    for item in desired {
        let key = EqualityKey::of(item, profile);
        match remaining.get_mut(&key) {
            Some(count) if *count > 0 => *count -= 1,
            _ => to_create.push(item.clone()),
        }
    }

    // Whatever was never matched by a desired item is surplus.
    let mut to_delete = Vec::new();
    for (item, key) in observed.iter().zip(&observed_keys) {
        if let Some(count) = remaining.get_mut(key) {
            if *count > 0 {
                *count -= 1;
                to_delete.push(item.clone());
            }
        }
    }

    DiffResult {
        to_create,
        to_delete,
    }
}

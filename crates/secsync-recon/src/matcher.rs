//! Handle resolution by field-equality matching.

use crate::key::{EqualityKey, KeyProfile};
use log::warn;
use secsync_types::{ConfigItem, Handle};

/// Locates the remote handle of a just-submitted item by scanning a freshly
/// listed observed collection for a value-equal sibling.
///
/// The observed collection must have been fetched after the create call is
/// believed to have taken effect; this function does not retry the list
/// itself. `None` means "not yet visible" — the caller may re-list and try
/// again under its own backoff budget.
///
/// If the submitted configuration is not unique among its siblings, the
/// first match in list order wins. That ambiguity is a documented
/// limitation of identifier-less rule types: rule types that can carry a
/// uniqueness field (an explicit name) should declare it comparison-relevant
/// in their [`KeyProfile`] to avoid it. Observed candidates without a
/// handle cannot resolve identity and are skipped.
///
/// Pure function; no side effects beyond a warning log for handle-less
/// matches.
pub fn find_handle<P>(submitted: &ConfigItem, observed: &[ConfigItem], profile: &P) -> Option<Handle>
where
    P: KeyProfile + ?Sized,
{
    let wanted = EqualityKey::of(submitted, profile);

    for candidate in observed {
        if EqualityKey::of(candidate, profile) != wanted {
            continue;
        }
        match candidate.handle() {
            Some(handle) => return Some(handle.clone()),
            None => {
                warn!(
                    "observed item {} matches submitted configuration but carries no handle; skipping",
                    candidate
                );
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::AllFields;
    use secsync_types::Value;

    fn handle(id: &str) -> Handle {
        id.parse().unwrap()
    }

    fn acl(action: &str, port: i64) -> ConfigItem {
        ConfigItem::new()
            .with("action", action)
            .with("d_port_start", port)
            .with("d_port_end", port)
    }

    #[test]
    fn test_finds_matching_item() {
        let submitted = acl("drop", 443);
        let observed = vec![
            acl("drop", 80).with_handle(handle("acl-1")),
            acl("drop", 443).with_handle(handle("acl-2")),
        ];

        assert_eq!(
            find_handle(&submitted, &observed, &AllFields),
            Some(handle("acl-2"))
        );
    }

    #[test]
    fn test_empty_observed_returns_none() {
        assert_eq!(find_handle(&acl("drop", 80), &[], &AllFields), None);
    }

    #[test]
    fn test_any_scalar_mismatch_returns_none() {
        let observed = vec![acl("drop", 80).with_handle(handle("acl-1"))];

        // Each comparison-relevant field changed in isolation must miss.
        assert_eq!(find_handle(&acl("forward", 80), &observed, &AllFields), None);
        assert_eq!(find_handle(&acl("drop", 81), &observed, &AllFields), None);

        let extra_field = acl("drop", 80).with("protocol", "tcp");
        assert_eq!(find_handle(&extra_field, &observed, &AllFields), None);
    }

    #[test]
    fn test_sub_list_order_is_insensitive() {
        let submitted = ConfigItem::new()
            .with("action", "drop")
            .with("tags", vec![Value::from("x"), Value::from("y")]);
        let observed = vec![ConfigItem::new()
            .with("action", "drop")
            .with("tags", vec![Value::from("y"), Value::from("x")])
            .with_handle(handle("geo-9"))];

        assert_eq!(
            find_handle(&submitted, &observed, &AllFields),
            Some(handle("geo-9"))
        );
    }

    #[test]
    fn test_ambiguous_match_takes_first_in_list_order() {
        let submitted = acl("drop", 80);
        let observed = vec![
            acl("drop", 80).with_handle(handle("acl-1")),
            acl("drop", 80).with_handle(handle("acl-2")),
        ];

        assert_eq!(
            find_handle(&submitted, &observed, &AllFields),
            Some(handle("acl-1"))
        );
    }

    #[test]
    fn test_handle_less_candidate_is_skipped() {
        let submitted = acl("drop", 80);
        let observed = vec![
            acl("drop", 80),
            acl("drop", 80).with_handle(handle("acl-2")),
        ];

        assert_eq!(
            find_handle(&submitted, &observed, &AllFields),
            Some(handle("acl-2"))
        );
    }
}

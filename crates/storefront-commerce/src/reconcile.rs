//! Child-collection reconciliation.
//!
//! Bundle items, order items and product special properties all update
//! the same way: incoming records are matched against stored children
//! by a key, matches are updated in place and the rest are inserted.
//! Stored children omitted from the request are kept (merge); no call
//! site in this system removes them, and that behavior is part of the
//! service contract. Replace semantics exist for callers that do want
//! omitted children dropped.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// What to do with stored children the request did not mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Keep them (every service call site uses this).
    Merge,
    /// Remove them.
    Replace,
}

/// Counts of what a reconciliation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub updated: usize,
    pub inserted: usize,
    pub removed: usize,
}

/// Reconcile `incoming` records into `existing` children.
///
/// `existing_key` keys the stored children; `incoming_key` keys a
/// request record (`None` means "always insert", e.g. a record without
/// an id). Matches are passed to `apply`; the rest are materialized
/// with `insert` and appended in request order.
pub fn reconcile<E, I, K>(
    existing: &mut Vec<E>,
    incoming: Vec<I>,
    mode: ReconcileMode,
    existing_key: impl Fn(&E) -> K,
    incoming_key: impl Fn(&I) -> Option<K>,
    mut apply: impl FnMut(&mut E, &I),
    mut insert: impl FnMut(I) -> E,
) -> ReconcileOutcome
where
    K: Eq + Hash,
{
    let original_len = existing.len();
    let index: HashMap<K, usize> = existing
        .iter()
        .enumerate()
        .map(|(position, child)| (existing_key(child), position))
        .collect();

    let mut matched: HashSet<usize> = HashSet::new();
    let mut outcome = ReconcileOutcome::default();

    for record in incoming {
        let position = incoming_key(&record).and_then(|key| index.get(&key).copied());
        match position {
            Some(position) => {
                apply(&mut existing[position], &record);
                matched.insert(position);
                outcome.updated += 1;
            }
            None => {
                existing.push(insert(record));
                outcome.inserted += 1;
            }
        }
    }

    if mode == ReconcileMode::Replace {
        // Inserted children sit past original_len and are never removed.
        for position in (0..original_len).rev() {
            if !matched.contains(&position) {
                existing.remove(position);
                outcome.removed += 1;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Child {
        id: u32,
        value: String,
    }

    struct Incoming {
        id: Option<u32>,
        value: String,
    }

    fn run(existing: &mut Vec<Child>, incoming: Vec<Incoming>, mode: ReconcileMode) -> ReconcileOutcome {
        let mut next_id = 100;
        reconcile(
            existing,
            incoming,
            mode,
            |child| child.id,
            |record| record.id,
            |child, record| child.value = record.value.clone(),
            |record| {
                next_id += 1;
                Child {
                    id: next_id,
                    value: record.value,
                }
            },
        )
    }

    #[test]
    fn test_merge_updates_matches_and_inserts_rest() {
        let mut existing = vec![
            Child { id: 1, value: "a".into() },
            Child { id: 2, value: "b".into() },
        ];
        let outcome = run(
            &mut existing,
            vec![
                Incoming { id: Some(1), value: "a2".into() },
                Incoming { id: None, value: "new".into() },
            ],
            ReconcileMode::Merge,
        );
        assert_eq!(outcome, ReconcileOutcome { updated: 1, inserted: 1, removed: 0 });
        assert_eq!(existing.len(), 3);
        assert_eq!(existing[0].value, "a2");
        // The omitted child survives under merge semantics.
        assert_eq!(existing[1].value, "b");
    }

    #[test]
    fn test_unmatched_incoming_id_inserts() {
        let mut existing = vec![Child { id: 1, value: "a".into() }];
        let outcome = run(
            &mut existing,
            vec![Incoming { id: Some(42), value: "stray".into() }],
            ReconcileMode::Merge,
        );
        assert_eq!(outcome.inserted, 1);
        assert_eq!(existing.len(), 2);
    }

    #[test]
    fn test_replace_removes_omitted_children() {
        let mut existing = vec![
            Child { id: 1, value: "a".into() },
            Child { id: 2, value: "b".into() },
            Child { id: 3, value: "c".into() },
        ];
        let outcome = run(
            &mut existing,
            vec![Incoming { id: Some(2), value: "b2".into() }],
            ReconcileMode::Replace,
        );
        assert_eq!(outcome, ReconcileOutcome { updated: 1, inserted: 0, removed: 2 });
        assert_eq!(existing, vec![Child { id: 2, value: "b2".into() }]);
    }

    #[test]
    fn test_empty_incoming_merge_is_a_no_op() {
        let mut existing = vec![Child { id: 1, value: "a".into() }];
        let outcome = run(&mut existing, Vec::new(), ReconcileMode::Merge);
        assert_eq!(outcome, ReconcileOutcome::default());
        assert_eq!(existing.len(), 1);
    }
}

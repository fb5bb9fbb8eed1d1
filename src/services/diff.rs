//! Field-level diff-and-apply helper
//!
//! Every update in the data store funnels its partial input through a
//! [`ChangeSet`]. For each recognised field the caller hands over the live
//! slot and the requested value; the change set applies the value only when it
//! differs and remembers `{previous, newValue}` for the audit trail.
//!
//! Comparison rule:
//! - an absent input (`None`) leaves the field untouched;
//! - values are compared with `PartialEq` on the typed value, so lists compare
//!   by length and order, and an unset optional equals an explicit clear;
//! - recorded values are the JSON serialisation of the typed value, so an
//!   unset optional shows up as `null`.

use serde::Serialize;
use serde_json::Value;

use crate::models::{DiffMap, FieldChange};

/// Accumulates the fields changed by a single update call
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    changes: DiffMap,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `next` to `slot` when it differs, recording the change under `field`
    ///
    /// Returns `true` when the slot was modified.
    pub fn track<T>(&mut self, field: &str, slot: &mut T, next: Option<T>) -> bool
    where
        T: PartialEq + Serialize,
    {
        let Some(next) = next else {
            return false;
        };
        if *slot == next {
            return false;
        }
        let previous = to_json(&*slot);
        let new_value = to_json(&next);
        *slot = next;
        self.changes
            .insert(field.to_string(), FieldChange { previous, new_value });
        true
    }

    /// Record a change that was applied elsewhere (derived fields, nested records)
    ///
    /// Nothing is recorded when both sides serialise to the same value.
    pub fn record<P, N>(&mut self, field: &str, previous: &P, next: &N)
    where
        P: Serialize + ?Sized,
        N: Serialize + ?Sized,
    {
        let previous = to_json(previous);
        let new_value = to_json(next);
        if previous != new_value {
            self.changes
                .insert(field.to_string(), FieldChange { previous, new_value });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.changes.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.get(field)
    }

    /// The diff map, or `None` when nothing changed
    pub fn into_diff(self) -> Option<DiffMap> {
        if self.changes.is_empty() {
            None
        } else {
            Some(self.changes)
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

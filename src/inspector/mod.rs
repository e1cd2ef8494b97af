//! The inspector graph.
//!
//! Leaves first: value inspectors wrap one condition or action each
//! ([`condition`], [`action`]); [`list`] aggregates them per field and
//! kind; [`field`] owns the two lists of one (rule, field) pair and reacts
//! to field mutations; [`rule`] collects the field inspectors of one rule
//! and propagates invalidation upward.
//!
//! ```text
//! Field ──▶ ConditionInspector / ActionInspector   (one per value)
//!               └──▶ InspectorList                 (per field, per kind)
//!                        └──▶ FieldInspector       (per rule+field)
//!                                 └──▶ RuleInspector (per rule)
//! ```
//!
//! Every relationship query is a total function: any pair of inspectors
//! yields a definite `bool`/[`Conflict`] answer. Mismatched fields,
//! mismatched variants and unknown inspectors answer `false`, never an
//! error, so one malformed cell cannot abort analysis of the rest.

pub mod action;
pub mod condition;
pub mod field;
pub mod list;
pub mod rule;

mod value_set;

pub use action::{ActionInspector, ActionInspectorFactory};
pub use condition::{ConditionInspector, ConditionInspectorFactory};
pub use field::FieldInspector;
pub use list::{InspectorFactory, InspectorList, UpdatableInspectorList};
pub use rule::{RuleInspector, RuleInspectorUpdater};

use crate::keys::UuidKey;
use serde::Serialize;

/// Pairwise relationship queries every inspector answers.
pub trait InspectorRelations {
    /// True when no value can satisfy both sides (for conditions) or the
    /// two sides write contradictory effects (for actions). Symmetric.
    fn conflicts(&self, other: &Self) -> bool;

    /// True when every case covered by `other` is covered by `self` —
    /// the broader side subsumes the narrower.
    fn subsumes(&self, other: &Self) -> bool;

    /// Logical equivalence for decision purposes: mutual subsumption.
    fn is_redundant(&self, other: &Self) -> bool {
        self.subsumes(other) && other.subsumes(self)
    }
}

/// Human-oriented rendering for reports and status panels.
pub trait HumanReadable {
    fn to_human_readable_string(&self) -> String;
}

/// Inspectors that own identity keys.
///
/// Ancestors diff old vs new inspector sets by key, so every inspector
/// that participates in higher-level aggregation reports the keys it owns.
pub trait HasKeys {
    fn keys(&self) -> Vec<UuidKey>;
}

/// Result of a pairwise conflict scan: the first conflicting pair found,
/// or the empty sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Conflict {
    /// No conflicting pair.
    Empty,
    /// First conflicting pair, in scan order.
    Pair {
        first: ConflictSource,
        second: ConflictSource,
    },
}

/// One side of a reported conflict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictSource {
    /// Identity key of the conflicting inspector.
    pub key: UuidKey,
    /// Human-readable rendering of the conflicting constraint.
    pub description: String,
}

impl Conflict {
    pub(crate) fn of<I>(first: &I, second: &I) -> Self
    where
        I: HasKeys + HumanReadable,
    {
        let source = |inspector: &I| ConflictSource {
            // Leaf inspectors own exactly one key.
            key: inspector.keys()[0],
            description: inspector.to_human_readable_string(),
        };
        Conflict::Pair { first: source(first), second: source(second) }
    }

    /// True for the no-conflict sentinel.
    pub fn is_empty(&self) -> bool {
        matches!(self, Conflict::Empty)
    }
}

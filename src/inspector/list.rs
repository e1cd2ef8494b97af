//! Ordered inspector containers.
//!
//! An [`InspectorList`] holds the inspectors of one field and one kind
//! (conditions or actions), in collection insertion order, and answers the
//! aggregate relationship queries. [`UpdatableInspectorList`] adds the
//! single mutation entry point: `update` atomically replaces the whole
//! list from the field's current values — there are no partial edits, so
//! there are no incremental-update corruption bugs.

use crate::inspector::{HasKeys, InspectorRelations};
use crate::keys::UuidKey;
use tracing::debug;

/// Builds one inspector per raw value. Construction never fails: input the
/// factory cannot classify yields an inert unknown inspector.
pub trait InspectorFactory {
    type Value;
    type Inspector;

    fn make(&self, value: &Self::Value) -> Self::Inspector;
}

/// Ordered sequence of inspectors of one kind.
#[derive(Debug, Clone, Default)]
pub struct InspectorList<I> {
    items: Vec<I>,
}

impl<I> InspectorList<I> {
    pub fn new() -> Self {
        InspectorList { items: Vec::new() }
    }

    pub(crate) fn from_items(items: Vec<I>) -> Self {
        InspectorList { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&I> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, I> {
        self.items.iter()
    }

    pub fn items(&self) -> &[I] {
        &self.items
    }
}

impl<I: InspectorRelations> InspectorRelations for InspectorList<I> {
    /// Any cross pair conflicts; short-circuits on the first match.
    fn conflicts(&self, other: &Self) -> bool {
        self.items
            .iter()
            .any(|a| other.items.iter().any(|b| a.conflicts(b)))
    }

    /// Every constraint in `other` is covered by something here. An empty
    /// `other` is vacuously subsumed.
    fn subsumes(&self, other: &Self) -> bool {
        other
            .items
            .iter()
            .all(|o| self.items.iter().any(|s| s.subsumes(o)))
    }

    /// Structural equivalence: every element on each side has a redundant
    /// counterpart on the other.
    fn is_redundant(&self, other: &Self) -> bool {
        fn matched<I: InspectorRelations>(from: &[I], into: &[I]) -> bool {
            from.iter().all(|a| into.iter().any(|b| a.is_redundant(b)))
        }
        matched(&self.items, &other.items) && matched(&other.items, &self.items)
    }
}

impl<I: HasKeys> HasKeys for InspectorList<I> {
    fn keys(&self) -> Vec<UuidKey> {
        self.items.iter().flat_map(HasKeys::keys).collect()
    }
}

/// An [`InspectorList`] with atomic replace-on-change semantics.
pub struct UpdatableInspectorList<F: InspectorFactory> {
    factory: F,
    list: InspectorList<F::Inspector>,
}

impl<F: InspectorFactory> UpdatableInspectorList<F> {
    pub fn new(factory: F) -> Self {
        UpdatableInspectorList { factory, list: InspectorList::new() }
    }

    /// Discard all inspectors and rebuild one per input value, in input
    /// order. Element identity keys are fresh on every rebuild.
    pub fn update(&mut self, values: &[F::Value]) {
        debug!(count = values.len(), "rebuilding inspector list");
        self.list = InspectorList::from_items(
            values.iter().map(|value| self.factory.make(value)).collect(),
        );
    }

    pub fn list(&self) -> &InspectorList<F::Inspector> {
        &self.list
    }
}

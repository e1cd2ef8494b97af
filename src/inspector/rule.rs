//! Rule-level aggregation and upward invalidation.
//!
//! Field inspectors do not hold a pointer back into the rule aggregate.
//! They notify a [`RuleInspectorUpdater`] — a cheap cloneable handle over
//! shared dirty flags — and the owning [`RuleInspector`] drains those
//! flags before answering, recomputing whatever the flags invalidated.
//! This keeps invalidation an explicit upward message instead of a
//! reference cycle.

use crate::config::AnalyzerConfiguration;
use crate::field::Field;
use crate::inspector::field::FieldInspector;
use crate::inspector::{Conflict, HasKeys, HumanReadable, InspectorRelations};
use crate::keys::UuidKey;
use crate::model::ObjectField;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::trace;

#[derive(Debug, Default)]
struct UpdaterState {
    conditions_dirty: Cell<bool>,
    actions_dirty: Cell<bool>,
    condition_resets: Cell<u64>,
    action_resets: Cell<u64>,
}

/// Invalidation channel from field inspectors to their rule aggregate.
///
/// Cloning yields another handle to the same state; every field inspector
/// of one rule shares the rule's handle.
#[derive(Debug, Clone, Default)]
pub struct RuleInspectorUpdater {
    state: Rc<UpdaterState>,
}

impl RuleInspectorUpdater {
    pub fn new() -> Self {
        RuleInspectorUpdater::default()
    }

    /// A field inspector rebuilt its condition list; rule-level condition
    /// aggregates are stale.
    pub fn reset_conditions_inspectors(&self) {
        trace!("condition inspectors reset");
        self.state.conditions_dirty.set(true);
        self.state
            .condition_resets
            .set(self.state.condition_resets.get() + 1);
    }

    /// A field inspector rebuilt its action list; rule-level action
    /// aggregates are stale.
    pub fn reset_actions_inspectors(&self) {
        trace!("action inspectors reset");
        self.state.actions_dirty.set(true);
        self.state
            .action_resets
            .set(self.state.action_resets.get() + 1);
    }

    /// Drain the dirty flags, returning `(conditions, actions)`.
    pub fn take_dirty(&self) -> (bool, bool) {
        (
            self.state.conditions_dirty.replace(false),
            self.state.actions_dirty.replace(false),
        )
    }

    /// Peek without draining.
    pub fn is_dirty(&self) -> bool {
        self.state.conditions_dirty.get() || self.state.actions_dirty.get()
    }

    /// Total condition resets seen, across all field inspectors sharing
    /// this handle.
    pub fn condition_reset_count(&self) -> u64 {
        self.state.condition_resets.get()
    }

    /// Total action resets seen.
    pub fn action_reset_count(&self) -> u64 {
        self.state.action_resets.get()
    }
}

/// Aggregate inspector for one rule: the field inspectors of every field
/// the rule touches, plus a cached intra-rule conflict scan.
pub struct RuleInspector {
    rule_name: String,
    uuid_key: UuidKey,
    config: Rc<AnalyzerConfiguration>,
    updater: RuleInspectorUpdater,
    fields: Vec<FieldInspector>,
    conflict_cache: RefCell<Option<Conflict>>,
}

impl RuleInspector {
    pub fn new(rule_name: impl Into<String>, config: Rc<AnalyzerConfiguration>) -> Self {
        let uuid_key = config.next_key();
        RuleInspector {
            rule_name: rule_name.into(),
            uuid_key,
            config,
            updater: RuleInspectorUpdater::new(),
            fields: Vec::new(),
            conflict_cache: RefCell::new(None),
        }
    }

    pub fn rule_name(&self) -> &str {
        &self.rule_name
    }

    /// The invalidation handle shared with this rule's field inspectors.
    pub fn updater(&self) -> &RuleInspectorUpdater {
        &self.updater
    }

    pub fn field_inspectors(&self) -> &[FieldInspector] {
        &self.fields
    }

    /// Start inspecting a field: builds a [`FieldInspector`] subscribed to
    /// it and wired to this rule's updater.
    pub fn add_field(&mut self, field: &Field) {
        let inspector = FieldInspector::from_field(field, &self.updater, &self.config);
        self.fields.push(inspector);
        self.conflict_cache.borrow_mut().take();
    }

    /// Stop inspecting a field. Dropping the inspector unsubscribes it
    /// from the underlying field. Returns whether anything was removed.
    pub fn remove_field(&mut self, object_field: &ObjectField) -> bool {
        let before = self.fields.len();
        self.fields
            .retain(|inspector| inspector.object_field() != object_field);
        let removed = self.fields.len() != before;
        if removed {
            self.conflict_cache.borrow_mut().take();
        }
        removed
    }

    /// First intra-rule condition contradiction across all fields, or the
    /// empty sentinel. The answer is cached until a field inspector
    /// signals a rebuild through the updater.
    pub fn has_conflicts(&self) -> Conflict {
        self.invalidate_if_dirty();
        if let Some(cached) = self.conflict_cache.borrow().as_ref() {
            return cached.clone();
        }
        let conflict = self
            .fields
            .iter()
            .map(FieldInspector::has_conflicts)
            .find(|found| !found.is_empty())
            .unwrap_or(Conflict::Empty);
        *self.conflict_cache.borrow_mut() = Some(conflict.clone());
        conflict
    }

    fn invalidate_if_dirty(&self) {
        let (conditions, actions) = self.updater.take_dirty();
        if conditions || actions {
            trace!(rule = %self.rule_name, "dropping cached rule aggregates");
            self.conflict_cache.borrow_mut().take();
        }
    }
}

impl InspectorRelations for RuleInspector {
    /// Two rules conflict when any pair of same-field inspectors does.
    fn conflicts(&self, other: &Self) -> bool {
        self.fields
            .iter()
            .any(|mine| other.fields.iter().any(|theirs| mine.conflicts(theirs)))
    }

    /// Every field inspector of `other` must have a same-field counterpart
    /// here that subsumes it.
    fn subsumes(&self, other: &Self) -> bool {
        other
            .fields
            .iter()
            .all(|theirs| self.fields.iter().any(|mine| mine.subsumes(theirs)))
    }

    /// Structural both-ways matching of redundant field inspectors.
    fn is_redundant(&self, other: &Self) -> bool {
        fn matched(from: &[FieldInspector], into: &[FieldInspector]) -> bool {
            from.iter()
                .all(|a| into.iter().any(|b| a.is_redundant(b)))
        }
        matched(&self.fields, &other.fields) && matched(&other.fields, &self.fields)
    }
}

impl HumanReadable for RuleInspector {
    fn to_human_readable_string(&self) -> String {
        self.rule_name.clone()
    }
}

impl HasKeys for RuleInspector {
    fn keys(&self) -> Vec<UuidKey> {
        let mut keys = vec![self.uuid_key];
        for field in &self.fields {
            keys.extend(field.keys());
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, Condition, DataType, Operator};
    use pretty_assertions::assert_eq;

    fn config() -> Rc<AnalyzerConfiguration> {
        Rc::new(AnalyzerConfiguration::default())
    }

    fn age_field() -> Field {
        Field::new(ObjectField::new("Person", "age", DataType::Numeric).unwrap())
    }

    fn status_field() -> Field {
        Field::new(ObjectField::new("Application", "status", DataType::Text).unwrap())
    }

    #[test]
    fn test_updater_drains_dirty_flags() {
        let updater = RuleInspectorUpdater::new();
        assert!(!updater.is_dirty());

        updater.reset_conditions_inspectors();
        updater.reset_conditions_inspectors();
        updater.reset_actions_inspectors();

        assert!(updater.is_dirty());
        assert_eq!(updater.take_dirty(), (true, true));
        assert_eq!(updater.take_dirty(), (false, false));
        assert_eq!(updater.condition_reset_count(), 2);
        assert_eq!(updater.action_reset_count(), 1);
    }

    #[test]
    fn test_rule_cache_invalidates_on_field_mutation() {
        let field = age_field();
        field.add_condition(Condition::literal("18", Operator::LessThan));

        let mut rule = RuleInspector::new("age gate", config());
        rule.add_field(&field);
        assert!(rule.has_conflicts().is_empty());

        field.add_condition(Condition::literal("18", Operator::GreaterOrEqual));
        assert!(rule.updater().is_dirty());
        assert!(!rule.has_conflicts().is_empty());

        // The recomputed answer is cached again.
        assert!(!rule.updater().is_dirty());
        assert!(!rule.has_conflicts().is_empty());
    }

    #[test]
    fn test_removed_field_stops_contributing() {
        let field = age_field();
        field.add_condition(Condition::literal("18", Operator::LessThan));
        field.add_condition(Condition::literal("18", Operator::GreaterOrEqual));

        let mut rule = RuleInspector::new("age gate", config());
        rule.add_field(&field);
        assert!(!rule.has_conflicts().is_empty());

        assert!(rule.remove_field(field.object_field()));
        assert!(rule.has_conflicts().is_empty());

        // The dropped inspector also unsubscribed.
        let resets = rule.updater().condition_reset_count();
        field.add_condition(Condition::literal("10", Operator::LessThan));
        assert_eq!(rule.updater().condition_reset_count(), resets);
    }

    #[test]
    fn test_rules_conflict_through_actions() {
        let approve = status_field();
        approve.add_action(Action::literal("APPROVED"));
        let decline = status_field();
        decline.add_action(Action::literal("DECLINED"));

        let mut first = RuleInspector::new("approve", config());
        first.add_field(&approve);
        let mut second = RuleInspector::new("decline", config());
        second.add_field(&decline);

        assert!(first.conflicts(&second));
        assert!(second.conflicts(&first));
        assert!(!first.is_redundant(&second));
    }

    #[test]
    fn test_broader_rule_subsumes_narrower() {
        let broad_field = age_field();
        broad_field.add_condition(Condition::literal("18", Operator::LessThan));
        let narrow_field = age_field();
        narrow_field.add_condition(Condition::literal("10", Operator::LessThan));

        let mut broad = RuleInspector::new("minors", config());
        broad.add_field(&broad_field);
        let mut narrow = RuleInspector::new("children", config());
        narrow.add_field(&narrow_field);

        assert!(broad.subsumes(&narrow));
        assert!(!narrow.subsumes(&broad));
    }

    #[test]
    fn test_equivalent_rules_are_redundant() {
        let config = config();
        let a_field = status_field();
        a_field.add_condition(Condition::literal("OPEN", Operator::Equals));
        a_field.add_action(Action::literal("APPROVED"));
        let b_field = status_field();
        b_field.add_condition(Condition::literal("OPEN", Operator::Equals));
        b_field.add_action(Action::literal("APPROVED"));

        let mut a = RuleInspector::new("a", Rc::clone(&config));
        a.add_field(&a_field);
        let mut b = RuleInspector::new("b", config);
        b.add_field(&b_field);

        assert!(a.is_redundant(&b));
        assert!(a.subsumes(&b) && b.subsumes(&a));
    }

    #[test]
    fn test_keys_cover_rule_and_fields() {
        let field = age_field();
        let mut rule = RuleInspector::new("age gate", config());
        rule.add_field(&field);
        // One key for the rule, one per field inspector.
        assert_eq!(rule.keys().len(), 2);
    }
}

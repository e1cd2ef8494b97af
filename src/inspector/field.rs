//! Per-(rule, field) aggregate.
//!
//! A [`FieldInspector`] owns one condition list and one action list for a
//! specific [`ObjectField`], keeps them in sync with the underlying
//! [`Field`] through its subscription registry, and answers the
//! field-level relationship queries. The inspector survives rebuilds: only
//! its contained lists are replaced when the field mutates.

use crate::config::AnalyzerConfiguration;
use crate::field::{Field, Subscription};
use crate::inspector::action::{ActionInspector, ActionInspectorFactory};
use crate::inspector::condition::{ConditionInspector, ConditionInspectorFactory};
use crate::inspector::list::{InspectorList, UpdatableInspectorList};
use crate::inspector::rule::RuleInspectorUpdater;
use crate::inspector::{Conflict, HasKeys, HumanReadable, InspectorRelations};
use crate::keys::UuidKey;
use crate::model::{Action, Condition, ObjectField};
use std::cell::RefCell;
use std::rc::Rc;

struct Lists {
    conditions: UpdatableInspectorList<ConditionInspectorFactory>,
    actions: UpdatableInspectorList<ActionInspectorFactory>,
}

/// Aggregate inspector for one field of one rule.
pub struct FieldInspector {
    object_field: ObjectField,
    uuid_key: UuidKey,
    lists: Rc<RefCell<Lists>>,
    updater: RuleInspectorUpdater,
    _subscriptions: Vec<Subscription>,
}

impl FieldInspector {
    /// Bare construction from a field identity: empty lists, no
    /// subscriptions. Used for composition in synthetic aggregates and
    /// tests; populate through [`update_conditions`] /
    /// [`update_actions`].
    ///
    /// [`update_conditions`]: FieldInspector::update_conditions
    /// [`update_actions`]: FieldInspector::update_actions
    pub fn new(
        object_field: ObjectField,
        updater: &RuleInspectorUpdater,
        config: &Rc<AnalyzerConfiguration>,
    ) -> Self {
        let conditions = UpdatableInspectorList::new(ConditionInspectorFactory::new(
            object_field.clone(),
            Rc::clone(config),
        ));
        let actions = UpdatableInspectorList::new(ActionInspectorFactory::new(
            object_field.clone(),
            Rc::clone(config),
        ));
        FieldInspector {
            object_field,
            uuid_key: config.next_key(),
            lists: Rc::new(RefCell::new(Lists { conditions, actions })),
            updater: updater.clone(),
            _subscriptions: Vec::new(),
        }
    }

    /// Construct from a live field: populate from its current conditions
    /// and actions, then subscribe to both collections. Each future
    /// mutation rebuilds the affected list and notifies `updater` once.
    /// The initial population does not notify.
    pub fn from_field(
        field: &Field,
        updater: &RuleInspectorUpdater,
        config: &Rc<AnalyzerConfiguration>,
    ) -> Self {
        let mut inspector = FieldInspector::new(field.object_field().clone(), updater, config);
        {
            let mut lists = inspector.lists.borrow_mut();
            lists.conditions.update(&field.conditions());
            lists.actions.update(&field.actions());
        }

        let lists = Rc::clone(&inspector.lists);
        let condition_updater = updater.clone();
        let on_conditions = field.on_conditions_changed(move |all: &[Condition]| {
            lists.borrow_mut().conditions.update(all);
            condition_updater.reset_conditions_inspectors();
        });

        let lists = Rc::clone(&inspector.lists);
        let action_updater = updater.clone();
        let on_actions = field.on_actions_changed(move |all: &[Action]| {
            lists.borrow_mut().actions.update(all);
            action_updater.reset_actions_inspectors();
        });

        inspector._subscriptions = vec![on_conditions, on_actions];
        inspector
    }

    pub fn object_field(&self) -> &ObjectField {
        &self.object_field
    }

    /// Rebuild the condition list from the given values and notify the
    /// updater, exactly as a field mutation would.
    pub fn update_conditions(&self, conditions: &[Condition]) {
        self.lists.borrow_mut().conditions.update(conditions);
        self.updater.reset_conditions_inspectors();
    }

    /// Rebuild the action list from the given values and notify the
    /// updater, exactly as a field mutation would.
    pub fn update_actions(&self, actions: &[Action]) {
        self.lists.borrow_mut().actions.update(actions);
        self.updater.reset_actions_inspectors();
    }

    /// Identity keys of the current condition inspectors, in list order.
    pub fn condition_keys(&self) -> Vec<UuidKey> {
        self.lists.borrow().conditions.list().keys()
    }

    /// Identity keys of the current action inspectors, in list order.
    pub fn action_keys(&self) -> Vec<UuidKey> {
        self.lists.borrow().actions.list().keys()
    }

    /// Scan this field's conditions for an intra-rule contradiction.
    ///
    /// Conflict is symmetric, so each unordered pair is checked once: for
    /// every index `i`, only indexes `j > i` are compared. Returns the
    /// first conflicting pair in scan order, or the empty sentinel.
    pub fn has_conflicts(&self) -> Conflict {
        let lists = self.lists.borrow();
        let conditions = lists.conditions.list();
        for (i, left) in conditions.iter().enumerate() {
            for right in conditions.iter().skip(i + 1) {
                if left.conflicts(right) {
                    return Conflict::of(left, right);
                }
            }
        }
        Conflict::Empty
    }

    fn with_lists<R>(
        &self,
        other: &FieldInspector,
        query: impl Fn(
            &InspectorList<ConditionInspector>,
            &InspectorList<ActionInspector>,
            &InspectorList<ConditionInspector>,
            &InspectorList<ActionInspector>,
        ) -> R,
    ) -> R {
        // Comparing an inspector against itself takes two shared borrows
        // of the same RefCell, which is fine.
        let mine = self.lists.borrow();
        let theirs = other.lists.borrow();
        query(
            mine.conditions.list(),
            mine.actions.list(),
            theirs.conditions.list(),
            theirs.actions.list(),
        )
    }
}

impl InspectorRelations for FieldInspector {
    /// Field inspectors are comparable only on the same `ObjectField`.
    /// Actions are checked first: an action-level contradiction is
    /// decisive regardless of conditions.
    fn conflicts(&self, other: &Self) -> bool {
        if self.object_field != other.object_field {
            return false;
        }
        self.with_lists(other, |my_conditions, my_actions, their_conditions, their_actions| {
            my_actions.conflicts(their_actions) || my_conditions.conflicts(their_conditions)
        })
    }

    /// Both dimensions must hold: the action lists and the condition lists
    /// each subsume their counterpart.
    fn subsumes(&self, other: &Self) -> bool {
        if self.object_field != other.object_field {
            return false;
        }
        self.with_lists(other, |my_conditions, my_actions, their_conditions, their_actions| {
            my_actions.subsumes(their_actions) && my_conditions.subsumes(their_conditions)
        })
    }

    /// Both dimensions must hold, structurally, in both directions.
    fn is_redundant(&self, other: &Self) -> bool {
        if self.object_field != other.object_field {
            return false;
        }
        self.with_lists(other, |my_conditions, my_actions, their_conditions, their_actions| {
            my_actions.is_redundant(their_actions)
                && my_conditions.is_redundant(their_conditions)
        })
    }
}

impl HumanReadable for FieldInspector {
    fn to_human_readable_string(&self) -> String {
        self.object_field.name().to_string()
    }
}

impl HasKeys for FieldInspector {
    fn keys(&self) -> Vec<UuidKey> {
        vec![self.uuid_key]
    }
}

impl std::fmt::Debug for FieldInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lists = self.lists.borrow();
        f.debug_struct("FieldInspector")
            .field("object_field", &self.object_field)
            .field("uuid_key", &self.uuid_key)
            .field("conditions", &lists.conditions.list().len())
            .field("actions", &lists.actions.list().len())
            .finish()
    }
}

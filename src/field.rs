//! Observable rule field.
//!
//! A [`Field`] owns the ordered condition and action collections that
//! reference one fact attribute within one rule, plus a subscription
//! registry. Every mutation delivers the **complete current collection** to
//! each registered callback — not a diff — which keeps downstream rebuild
//! logic trivially correct at the cost of O(collection) work per edit.
//!
//! Callbacks fire synchronously: after the mutation is applied, before the
//! mutator returns. Code that mutates a field and immediately queries
//! derived state therefore observes the rebuilt state. Callbacks must not
//! mutate the field they observe.

use crate::model::{Action, Condition, ObjectField};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type ConditionCallback = Rc<dyn Fn(&[Condition])>;
type ActionCallback = Rc<dyn Fn(&[Action])>;

#[derive(Default)]
struct FieldState {
    conditions: Vec<Condition>,
    actions: Vec<Action>,
    next_subscription_id: u64,
    condition_listeners: Vec<(u64, ConditionCallback)>,
    action_listeners: Vec<(u64, ActionCallback)>,
}

/// A named fact attribute with observable condition/action collections.
///
/// Cloning a `Field` produces another handle to the same underlying state;
/// the editor keeps one handle while each inspector subscribes through its
/// own.
#[derive(Clone)]
pub struct Field {
    object_field: ObjectField,
    state: Rc<RefCell<FieldState>>,
}

impl Field {
    pub fn new(object_field: ObjectField) -> Self {
        Field { object_field, state: Rc::new(RefCell::new(FieldState::default())) }
    }

    pub fn object_field(&self) -> &ObjectField {
        &self.object_field
    }

    /// Snapshot of the current conditions, in insertion order.
    pub fn conditions(&self) -> Vec<Condition> {
        self.state.borrow().conditions.clone()
    }

    /// Snapshot of the current actions, in insertion order.
    pub fn actions(&self) -> Vec<Action> {
        self.state.borrow().actions.clone()
    }

    // -------------------------------------------------------------------------
    // Mutators. Each one notifies condition/action listeners with the full
    // current collection before returning.
    // -------------------------------------------------------------------------

    pub fn set_conditions(&self, conditions: Vec<Condition>) {
        self.state.borrow_mut().conditions = conditions;
        self.notify_conditions();
    }

    pub fn add_condition(&self, condition: Condition) {
        self.state.borrow_mut().conditions.push(condition);
        self.notify_conditions();
    }

    /// Remove the condition at `index`; out-of-range indexes are a no-op
    /// and do not notify.
    pub fn remove_condition(&self, index: usize) -> Option<Condition> {
        let removed = {
            let mut state = self.state.borrow_mut();
            if index < state.conditions.len() {
                Some(state.conditions.remove(index))
            } else {
                None
            }
        };
        if removed.is_some() {
            self.notify_conditions();
        }
        removed
    }

    pub fn set_actions(&self, actions: Vec<Action>) {
        self.state.borrow_mut().actions = actions;
        self.notify_actions();
    }

    pub fn add_action(&self, action: Action) {
        self.state.borrow_mut().actions.push(action);
        self.notify_actions();
    }

    /// Remove the action at `index`; out-of-range indexes are a no-op and
    /// do not notify.
    pub fn remove_action(&self, index: usize) -> Option<Action> {
        let removed = {
            let mut state = self.state.borrow_mut();
            if index < state.actions.len() {
                Some(state.actions.remove(index))
            } else {
                None
            }
        };
        if removed.is_some() {
            self.notify_actions();
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Register a callback invoked with the complete condition collection on
    /// every condition mutation. Returns the handle that removes it.
    pub fn on_conditions_changed(&self, callback: impl Fn(&[Condition]) + 'static) -> Subscription {
        let id = self.next_subscription_id();
        self.state
            .borrow_mut()
            .condition_listeners
            .push((id, Rc::new(callback)));
        Subscription { id, state: Rc::downgrade(&self.state) }
    }

    /// Register a callback invoked with the complete action collection on
    /// every action mutation. Returns the handle that removes it.
    pub fn on_actions_changed(&self, callback: impl Fn(&[Action]) + 'static) -> Subscription {
        let id = self.next_subscription_id();
        self.state
            .borrow_mut()
            .action_listeners
            .push((id, Rc::new(callback)));
        Subscription { id, state: Rc::downgrade(&self.state) }
    }

    fn next_subscription_id(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        let id = state.next_subscription_id;
        state.next_subscription_id += 1;
        id
    }

    fn notify_conditions(&self) {
        // Snapshot outside the borrow so callbacks cannot observe a held
        // RefCell borrow.
        let (snapshot, listeners): (Vec<Condition>, Vec<ConditionCallback>) = {
            let state = self.state.borrow();
            (
                state.conditions.clone(),
                state
                    .condition_listeners
                    .iter()
                    .map(|(_, callback)| Rc::clone(callback))
                    .collect(),
            )
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn notify_actions(&self) {
        let (snapshot, listeners): (Vec<Action>, Vec<ActionCallback>) = {
            let state = self.state.borrow();
            (
                state.actions.clone(),
                state
                    .action_listeners
                    .iter()
                    .map(|(_, callback)| Rc::clone(callback))
                    .collect(),
            )
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Field")
            .field("object_field", &self.object_field)
            .field("conditions", &state.conditions)
            .field("actions", &state.actions)
            .finish()
    }
}

/// Handle for one registered callback.
///
/// The callback stays registered for as long as the handle lives; dropping
/// the handle (or calling [`unsubscribe`](Subscription::unsubscribe))
/// removes it. A subscriber that goes away therefore detaches from the
/// field automatically.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    state: Weak<RefCell<FieldState>>,
}

impl Subscription {
    /// Remove the callback this handle was returned for.
    pub fn unsubscribe(self) {
        // Removal happens in Drop.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            let mut state = state.borrow_mut();
            state.condition_listeners.retain(|(id, _)| *id != self.id);
            state.action_listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

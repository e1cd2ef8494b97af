//! Action inspectors: typed comparators over authored actions.
//!
//! An action writes a value to a field when its rule fires. Two literal
//! actions on the same field conflict when they write different values and
//! are redundant when they write the same one. Variables and formulas are
//! opaque; unclassifiable input becomes an inert unknown inspector.

use crate::config::AnalyzerConfiguration;
use crate::error::CoercionError;
use crate::inspector::condition::coerce_scalar;
use crate::inspector::list::InspectorFactory;
use crate::inspector::{HasKeys, HumanReadable, InspectorRelations};
use crate::keys::UuidKey;
use crate::model::{Action, ObjectField, RuleValue, Value};
use std::rc::Rc;
use tracing::debug;

/// Semantic wrapper around one action.
#[derive(Debug, Clone)]
pub enum ActionInspector {
    /// Writes a literal value to the field.
    SetValue {
        key: UuidKey,
        field: ObjectField,
        value: Value,
    },
    /// Writes the value of a bound variable.
    BoundVariable {
        key: UuidKey,
        field: ObjectField,
        name: String,
    },
    /// Writes the result of a formula; opaque, related only by identical
    /// text.
    Formula {
        key: UuidKey,
        field: ObjectField,
        expression: String,
    },
    /// Unclassifiable input. Answers `false` to every query.
    Unknown { key: UuidKey, field: ObjectField },
}

impl ActionInspector {
    /// The field this action writes to.
    pub fn field(&self) -> &ObjectField {
        match self {
            ActionInspector::SetValue { field, .. }
            | ActionInspector::BoundVariable { field, .. }
            | ActionInspector::Formula { field, .. }
            | ActionInspector::Unknown { field, .. } => field,
        }
    }

    fn key(&self) -> UuidKey {
        match self {
            ActionInspector::SetValue { key, .. }
            | ActionInspector::BoundVariable { key, .. }
            | ActionInspector::Formula { key, .. }
            | ActionInspector::Unknown { key, .. } => *key,
        }
    }

    fn same_field(&self, other: &ActionInspector) -> bool {
        self.field() == other.field()
    }
}

impl InspectorRelations for ActionInspector {
    fn conflicts(&self, other: &Self) -> bool {
        if !self.same_field(other) {
            return false;
        }
        match (self, other) {
            // Two rules writing different values to the same field
            // contradict each other regardless of their conditions.
            (
                ActionInspector::SetValue { value: a, .. },
                ActionInspector::SetValue { value: b, .. },
            ) => a != b,
            _ => false,
        }
    }

    fn subsumes(&self, other: &Self) -> bool {
        if !self.same_field(other) {
            return false;
        }
        match (self, other) {
            (
                ActionInspector::SetValue { value: a, .. },
                ActionInspector::SetValue { value: b, .. },
            ) => a == b,
            (
                ActionInspector::BoundVariable { name: a, .. },
                ActionInspector::BoundVariable { name: b, .. },
            ) => a == b,
            (
                ActionInspector::Formula { expression: a, .. },
                ActionInspector::Formula { expression: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

impl HumanReadable for ActionInspector {
    fn to_human_readable_string(&self) -> String {
        match self {
            ActionInspector::SetValue { field, value, .. } => {
                format!("set {} = {value}", field.name())
            }
            ActionInspector::BoundVariable { field, name, .. } => {
                format!("set {} = ${name}", field.name())
            }
            ActionInspector::Formula { field, expression, .. } => {
                format!("set {} = {expression}", field.name())
            }
            ActionInspector::Unknown { field, .. } => {
                format!("set {}: unrecognized value", field.name())
            }
        }
    }
}

impl HasKeys for ActionInspector {
    fn keys(&self) -> Vec<UuidKey> {
        vec![self.key()]
    }
}

// =============================================================================
// FACTORY
// =============================================================================

/// Builds one [`ActionInspector`] per authored action of one field.
#[derive(Clone)]
pub struct ActionInspectorFactory {
    field: ObjectField,
    config: Rc<AnalyzerConfiguration>,
}

impl ActionInspectorFactory {
    pub fn new(field: ObjectField, config: Rc<AnalyzerConfiguration>) -> Self {
        ActionInspectorFactory { field, config }
    }

    fn classify(&self, action: &Action) -> Result<ActionInspector, CoercionError> {
        match &action.value {
            RuleValue::Literal(text) => {
                let value = coerce_scalar(text, self.field.data_type(), &self.config)?;
                Ok(ActionInspector::SetValue {
                    key: self.config.next_key(),
                    field: self.field.clone(),
                    value,
                })
            }
            RuleValue::Variable(name) if name.is_empty() => {
                Err(CoercionError::UnsupportedValueKind {
                    detail: "unnamed variable in an action".to_string(),
                })
            }
            RuleValue::Variable(name) => Ok(ActionInspector::BoundVariable {
                key: self.config.next_key(),
                field: self.field.clone(),
                name: name.clone(),
            }),
            RuleValue::Formula(expression) => {
                if expression.trim().is_empty() {
                    return Err(CoercionError::EmptyLiteral);
                }
                Ok(ActionInspector::Formula {
                    key: self.config.next_key(),
                    field: self.field.clone(),
                    expression: expression.clone(),
                })
            }
            RuleValue::Other(detail) => {
                Err(CoercionError::UnsupportedValueKind { detail: detail.clone() })
            }
        }
    }
}

impl InspectorFactory for ActionInspectorFactory {
    type Value = Action;
    type Inspector = ActionInspector;

    fn make(&self, action: &Action) -> ActionInspector {
        match self.classify(action) {
            Ok(inspector) => inspector,
            Err(error) => {
                debug!(field = %self.field, %error, "action not classifiable, using unknown inspector");
                ActionInspector::Unknown {
                    key: self.config.next_key(),
                    field: self.field.clone(),
                }
            }
        }
    }
}

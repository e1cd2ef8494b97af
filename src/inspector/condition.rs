//! Condition inspectors: typed comparators over authored conditions.
//!
//! The factory classifies each raw [`Condition`] against the owning
//! field's data type into one of a closed set of variants. Anything it
//! cannot classify becomes an inert [`ConditionInspector::Unknown`], so a
//! single malformed cell never aborts analysis of the rest of the rule.

use crate::config::AnalyzerConfiguration;
use crate::error::CoercionError;
use crate::inspector::list::InspectorFactory;
use crate::inspector::value_set::{self, ValueSet};
use crate::inspector::{HasKeys, HumanReadable, InspectorRelations};
use crate::keys::UuidKey;
use crate::model::{Condition, DataType, ObjectField, Operator, RuleValue, Value};
use std::rc::Rc;
use tracing::debug;

/// Semantic wrapper around one condition.
#[derive(Debug, Clone)]
pub enum ConditionInspector {
    /// A literal constraint over an orderable or enumerable domain.
    Comparable(ComparableCondition),
    /// A named variable binding; constrains nothing by itself.
    BoundVariable {
        key: UuidKey,
        field: ObjectField,
        name: String,
    },
    /// A boolean column, authored either as a literal or as the
    /// zero-parameter flag form. `!= true` folds to `value: false`.
    BooleanFlag {
        key: UuidKey,
        field: ObjectField,
        value: bool,
    },
    /// A free-form formula; opaque, related only by identical text.
    Formula {
        key: UuidKey,
        field: ObjectField,
        expression: String,
    },
    /// Unclassifiable input. Answers `false` to every query.
    Unknown { key: UuidKey, field: ObjectField },
}

/// The literal-condition payload: operator plus coerced value(s).
///
/// `values` holds exactly one element for scalar operators and one or
/// more for `in`/`not in`; the factory maintains that invariant.
#[derive(Debug, Clone)]
pub struct ComparableCondition {
    key: UuidKey,
    field: ObjectField,
    operator: Operator,
    values: Vec<Value>,
}

impl ComparableCondition {
    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn as_value_set(&self) -> Option<ValueSet<'_>> {
        ValueSet::new(self.operator, &self.values)
    }

    fn disjoint(&self, other: &ComparableCondition) -> bool {
        match (self.as_value_set(), other.as_value_set()) {
            (Some(a), Some(b)) => value_set::disjoint(&a, &b),
            _ => false,
        }
    }

    fn covers(&self, other: &ComparableCondition) -> bool {
        match (self.as_value_set(), other.as_value_set()) {
            (Some(a), Some(b)) => value_set::covers(&a, &b),
            _ => false,
        }
    }
}

impl ConditionInspector {
    /// The field this condition constrains.
    pub fn field(&self) -> &ObjectField {
        match self {
            ConditionInspector::Comparable(c) => &c.field,
            ConditionInspector::BoundVariable { field, .. }
            | ConditionInspector::BooleanFlag { field, .. }
            | ConditionInspector::Formula { field, .. }
            | ConditionInspector::Unknown { field, .. } => field,
        }
    }

    fn key(&self) -> UuidKey {
        match self {
            ConditionInspector::Comparable(c) => c.key,
            ConditionInspector::BoundVariable { key, .. }
            | ConditionInspector::BooleanFlag { key, .. }
            | ConditionInspector::Formula { key, .. }
            | ConditionInspector::Unknown { key, .. } => *key,
        }
    }

    fn same_field(&self, other: &ConditionInspector) -> bool {
        self.field() == other.field()
    }
}

impl InspectorRelations for ConditionInspector {
    fn conflicts(&self, other: &Self) -> bool {
        if !self.same_field(other) {
            return false;
        }
        match (self, other) {
            (ConditionInspector::Comparable(a), ConditionInspector::Comparable(b)) => {
                a.disjoint(b)
            }
            (
                ConditionInspector::BooleanFlag { value: a, .. },
                ConditionInspector::BooleanFlag { value: b, .. },
            ) => a != b,
            // Variables, formulas, unknowns and cross-variant pairs make no
            // conflict claim.
            _ => false,
        }
    }

    fn subsumes(&self, other: &Self) -> bool {
        if !self.same_field(other) {
            return false;
        }
        match (self, other) {
            (ConditionInspector::Comparable(a), ConditionInspector::Comparable(b)) => {
                a.covers(b)
            }
            (
                ConditionInspector::BoundVariable { name: a, .. },
                ConditionInspector::BoundVariable { name: b, .. },
            ) => a == b,
            (
                ConditionInspector::BooleanFlag { value: a, .. },
                ConditionInspector::BooleanFlag { value: b, .. },
            ) => a == b,
            (
                ConditionInspector::Formula { expression: a, .. },
                ConditionInspector::Formula { expression: b, .. },
            ) => a == b,
            // Unknown subsumes nothing, not even itself.
            _ => false,
        }
    }
}

impl HumanReadable for ConditionInspector {
    fn to_human_readable_string(&self) -> String {
        match self {
            ConditionInspector::Comparable(c) => {
                if c.operator.is_list() {
                    let list = c
                        .values
                        .iter()
                        .map(Value::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{} {} ({list})", c.field.name(), c.operator)
                } else {
                    format!("{} {} {}", c.field.name(), c.operator, c.values[0])
                }
            }
            ConditionInspector::BoundVariable { field, name, .. } => {
                format!("{} == ${name}", field.name())
            }
            ConditionInspector::BooleanFlag { field, value, .. } => {
                format!("{} == {value}", field.name())
            }
            ConditionInspector::Formula { field, expression, .. } => {
                format!("{}: {expression}", field.name())
            }
            ConditionInspector::Unknown { field, .. } => {
                format!("{}: unrecognized value", field.name())
            }
        }
    }
}

impl HasKeys for ConditionInspector {
    fn keys(&self) -> Vec<UuidKey> {
        vec![self.key()]
    }
}

// =============================================================================
// FACTORY
// =============================================================================

/// Builds one [`ConditionInspector`] per authored condition of one field.
#[derive(Clone)]
pub struct ConditionInspectorFactory {
    field: ObjectField,
    config: Rc<AnalyzerConfiguration>,
}

impl ConditionInspectorFactory {
    pub fn new(field: ObjectField, config: Rc<AnalyzerConfiguration>) -> Self {
        ConditionInspectorFactory { field, config }
    }

    fn classify(&self, condition: &Condition) -> Result<ConditionInspector, CoercionError> {
        match &condition.value {
            RuleValue::Literal(text) => self.classify_literal(text, condition.operator),
            RuleValue::Variable(name) if name.is_empty() => self.classify_flag(condition),
            RuleValue::Variable(name) => Ok(ConditionInspector::BoundVariable {
                key: self.config.next_key(),
                field: self.field.clone(),
                name: name.clone(),
            }),
            RuleValue::Formula(expression) => {
                if expression.trim().is_empty() {
                    return Err(CoercionError::EmptyLiteral);
                }
                Ok(ConditionInspector::Formula {
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

    /// The zero-parameter case: a boolean column asserted with no value.
    /// `==` asserts the flag, `!=` negates it.
    fn classify_flag(&self, condition: &Condition) -> Result<ConditionInspector, CoercionError> {
        if self.field.data_type() != DataType::Bool {
            return Err(CoercionError::UnsupportedValueKind {
                detail: "unnamed variable on a non-boolean field".to_string(),
            });
        }
        let value = match condition.operator {
            Operator::Equals => true,
            Operator::NotEquals => false,
            operator => {
                return Err(CoercionError::OperatorNotApplicable {
                    operator,
                    data_type: DataType::Bool,
                })
            }
        };
        Ok(ConditionInspector::BooleanFlag {
            key: self.config.next_key(),
            field: self.field.clone(),
            value,
        })
    }

    fn classify_literal(
        &self,
        text: &str,
        operator: Operator,
    ) -> Result<ConditionInspector, CoercionError> {
        let data_type = self.field.data_type();
        if text.trim().is_empty() {
            return Err(CoercionError::EmptyLiteral);
        }

        // Boolean columns fold to a flag so the literal and zero-parameter
        // spellings of the same constraint stay comparable.
        if data_type == DataType::Bool {
            if operator.is_ordered() || operator.is_list() {
                return Err(CoercionError::OperatorNotApplicable { operator, data_type });
            }
            let parsed = match coerce_scalar(text, data_type, &self.config)? {
                Value::Bool(parsed) => parsed,
                _ => return Err(CoercionError::InvalidBool { text: text.to_string() }),
            };
            return Ok(ConditionInspector::BooleanFlag {
                key: self.config.next_key(),
                field: self.field.clone(),
                value: parsed == (operator == Operator::Equals),
            });
        }

        if data_type == DataType::Text && operator.is_ordered() {
            return Err(CoercionError::OperatorNotApplicable { operator, data_type });
        }

        let values = if operator.is_list() {
            text.split(',')
                .map(|item| coerce_scalar(item, data_type, &self.config))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            vec![coerce_scalar(text, data_type, &self.config)?]
        };

        Ok(ConditionInspector::Comparable(ComparableCondition {
            key: self.config.next_key(),
            field: self.field.clone(),
            operator,
            values,
        }))
    }
}

impl InspectorFactory for ConditionInspectorFactory {
    type Value = Condition;
    type Inspector = ConditionInspector;

    fn make(&self, condition: &Condition) -> ConditionInspector {
        match self.classify(condition) {
            Ok(inspector) => inspector,
            Err(error) => {
                debug!(field = %self.field, %error, "condition not classifiable, using unknown inspector");
                ConditionInspector::Unknown {
                    key: self.config.next_key(),
                    field: self.field.clone(),
                }
            }
        }
    }
}

/// Coerce one literal into the field's value domain.
pub(crate) fn coerce_scalar(
    text: &str,
    data_type: DataType,
    config: &AnalyzerConfiguration,
) -> Result<Value, CoercionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoercionError::EmptyLiteral);
    }
    match data_type {
        DataType::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(CoercionError::InvalidBool { text: trimmed.to_string() }),
        },
        DataType::Numeric => trimmed
            .parse()
            .map(Value::Numeric)
            .map_err(|_| CoercionError::InvalidNumber { text: trimmed.to_string() }),
        DataType::Text => Ok(Value::Text(trimmed.to_string())),
        DataType::Date => config.parse_date(trimmed).map(Value::Date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Rc<AnalyzerConfiguration> {
        Rc::new(AnalyzerConfiguration::default())
    }

    fn age_factory() -> ConditionInspectorFactory {
        ConditionInspectorFactory::new(
            ObjectField::new("Person", "age", DataType::Numeric).unwrap(),
            config(),
        )
    }

    fn status_factory() -> ConditionInspectorFactory {
        ConditionInspectorFactory::new(
            ObjectField::new("Application", "status", DataType::Text).unwrap(),
            config(),
        )
    }

    fn approved_factory() -> ConditionInspectorFactory {
        ConditionInspectorFactory::new(
            ObjectField::new("Application", "approved", DataType::Bool).unwrap(),
            config(),
        )
    }

    fn age(text: &str, operator: Operator) -> ConditionInspector {
        age_factory().make(&Condition::literal(text, operator))
    }

    #[test]
    fn test_opposing_rays_conflict_symmetrically() {
        let under = age("18", Operator::LessThan);
        let over = age("18", Operator::GreaterOrEqual);
        assert!(under.conflicts(&over));
        assert!(over.conflicts(&under));
    }

    #[test]
    fn test_broader_condition_subsumes_narrower() {
        let broad = age("18", Operator::LessThan);
        let narrow = age("10", Operator::LessThan);
        assert!(broad.subsumes(&narrow));
        assert!(!narrow.subsumes(&broad));
        assert!(!broad.conflicts(&narrow));
        assert!(!broad.is_redundant(&narrow));
    }

    #[test]
    fn test_equal_conditions_are_redundant() {
        let a = age("18", Operator::LessThan);
        let b = age("18", Operator::LessThan);
        assert!(a.is_redundant(&b));
        assert!(b.is_redundant(&a));
    }

    #[test]
    fn test_different_fields_never_relate() {
        let a = age("18", Operator::LessThan);
        let b = status_factory().make(&Condition::literal("OPEN", Operator::Equals));
        assert!(!a.conflicts(&b));
        assert!(!a.subsumes(&b));
        assert!(!a.is_redundant(&b));
    }

    #[test]
    fn test_text_in_lists() {
        let factory = status_factory();
        let open_or_held =
            factory.make(&Condition::literal("OPEN, HELD", Operator::In));
        let open = factory.make(&Condition::literal("OPEN", Operator::Equals));
        let closed = factory.make(&Condition::literal("CLOSED", Operator::Equals));

        assert!(open_or_held.subsumes(&open));
        assert!(!open_or_held.conflicts(&open));
        assert!(open_or_held.conflicts(&closed));
    }

    #[test]
    fn test_boolean_literal_and_flag_spellings_fold_together() {
        let factory = approved_factory();
        let literal_true = factory.make(&Condition::literal("true", Operator::Equals));
        let not_false = factory.make(&Condition::literal("false", Operator::NotEquals));
        let flag = factory.make(&Condition::new(
            RuleValue::Variable(String::new()),
            Operator::Equals,
        ));
        let literal_false = factory.make(&Condition::literal("false", Operator::Equals));

        assert!(literal_true.is_redundant(&not_false));
        assert!(literal_true.is_redundant(&flag));
        assert!(literal_true.conflicts(&literal_false));
        assert!(!literal_true.conflicts(&flag));
    }

    #[test]
    fn test_bound_variables_relate_by_name() {
        let factory = age_factory();
        let a = factory.make(&Condition::new(
            RuleValue::Variable("candidate".into()),
            Operator::Equals,
        ));
        let b = factory.make(&Condition::new(
            RuleValue::Variable("candidate".into()),
            Operator::Equals,
        ));
        let c = factory.make(&Condition::new(
            RuleValue::Variable("applicant".into()),
            Operator::Equals,
        ));
        assert!(a.is_redundant(&b));
        assert!(!a.is_redundant(&c));
        assert!(!a.conflicts(&c));
    }

    #[test]
    fn test_formulas_relate_by_identical_text() {
        let factory = age_factory();
        let a = factory.make(&Condition::new(
            RuleValue::Formula("age * 2 > income".into()),
            Operator::Equals,
        ));
        let b = factory.make(&Condition::new(
            RuleValue::Formula("age * 2 > income".into()),
            Operator::Equals,
        ));
        let c = factory.make(&Condition::new(
            RuleValue::Formula("age * 3 > income".into()),
            Operator::Equals,
        ));
        assert!(a.is_redundant(&b));
        assert!(!a.is_redundant(&c));
        assert!(!a.conflicts(&c));
    }

    #[test]
    fn test_unclassifiable_input_is_inert() {
        let factory = age_factory();
        let unknown = factory.make(&Condition::literal("eighteen", Operator::LessThan));
        assert!(matches!(unknown, ConditionInspector::Unknown { .. }));

        let other = age("18", Operator::LessThan);
        assert!(!unknown.conflicts(&other));
        assert!(!other.conflicts(&unknown));
        assert!(!unknown.subsumes(&other));
        assert!(!unknown.is_redundant(&unknown.clone()));
    }

    #[test]
    fn test_ordered_operator_on_text_is_unknown() {
        let inspector = status_factory().make(&Condition::literal("OPEN", Operator::LessThan));
        assert!(matches!(inspector, ConditionInspector::Unknown { .. }));
    }

    #[test]
    fn test_date_conditions_compare_under_configured_format() {
        let factory = ConditionInspectorFactory::new(
            ObjectField::new("Loan", "issued", DataType::Date).unwrap(),
            config(),
        );
        let before = factory.make(&Condition::literal("01-Jan-2020", Operator::LessThan));
        let after = factory.make(&Condition::literal("01-Jan-2020", Operator::GreaterOrEqual));
        let early = factory.make(&Condition::literal("15-Mar-2019", Operator::LessThan));

        assert!(before.conflicts(&after));
        assert!(before.subsumes(&early));
    }

    #[test]
    fn test_human_readable_rendering() {
        let condition = age("18", Operator::LessThan);
        assert_eq!(condition.to_human_readable_string(), "age < 18");

        let list = status_factory().make(&Condition::literal("OPEN,HELD", Operator::In));
        assert_eq!(list.to_human_readable_string(), "status in (OPEN, HELD)");
    }

    #[test]
    fn test_each_inspector_owns_one_fresh_key() {
        let a = age("18", Operator::LessThan);
        let b = age("18", Operator::LessThan);
        assert_eq!(a.keys().len(), 1);
        assert_ne!(a.keys(), b.keys());
    }
}

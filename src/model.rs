//! Rule data model consumed by the analyzer.
//!
//! These types mirror what a decision-table editor hands the analysis
//! engine: fields identified by fact type + name, and the raw authored
//! condition/action cells referencing them. The analyzer never parses rule
//! source text; the editor delivers values already split into kind,
//! operator and text.

use crate::error::ModelError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// DATA TYPES AND LITERAL VALUES
// =============================================================================

/// Declared data type of a fact field.
///
/// Fields of any other type classify every authored value as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    Numeric,
    Text,
    Date,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Bool => "boolean",
            DataType::Numeric => "numeric",
            DataType::Text => "text",
            DataType::Date => "date",
        };
        write!(f, "{name}")
    }
}

/// A typed literal value after coercion.
///
/// Ordering is defined only between values of the same variant, and only
/// for numbers and dates; the factories reject ordered operators on text
/// and boolean fields before a comparison can be asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Numeric(Decimal),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    /// The data type this value belongs to.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Bool(_) => DataType::Bool,
            Value::Numeric(_) => DataType::Numeric,
            Value::Text(_) => DataType::Text,
            Value::Date(_) => DataType::Date,
        }
    }

    /// Compare two values of the same orderable type.
    ///
    /// Returns `None` for mixed types and for types without an ordering
    /// the analyzer trusts (text collation is locale business, not ours).
    pub(crate) fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Numeric(a), Value::Numeric(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Numeric(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{d}"),
        }
    }
}

// =============================================================================
// OPERATORS
// =============================================================================

/// Comparison operator of a condition cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Equals,
    NotEquals,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    In,
    NotIn,
}

impl Operator {
    /// True for the operators that require an ordered domain.
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            Operator::LessThan
                | Operator::LessOrEqual
                | Operator::GreaterThan
                | Operator::GreaterOrEqual
        )
    }

    /// True for the list-valued operators.
    pub fn is_list(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    /// The operator as it appears in rule source.
    pub fn as_symbol(&self) -> &'static str {
        match self {
            Operator::Equals => "==",
            Operator::NotEquals => "!=",
            Operator::LessThan => "<",
            Operator::LessOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::In => "in",
            Operator::NotIn => "not in",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_symbol())
    }
}

// =============================================================================
// RAW AUTHORED VALUES
// =============================================================================

/// Raw value of one condition or action cell, as the rule model reports it.
///
/// Classification into a typed comparator happens in the inspector
/// factories; this type only records what the author wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleValue {
    /// Literal text, coerced against the owning field's data type.
    /// For `in`/`not in` operators the text is a comma-separated list.
    Literal(String),
    /// A bound variable name. The empty string denotes the zero-parameter
    /// case (a boolean column asserted without a named binding).
    Variable(String),
    /// A free-form formula. Opaque to the analyzer: two formulas relate
    /// only when their text is identical.
    Formula(String),
    /// A value kind the rule model could not describe.
    Other(String),
}

/// One authored condition on a field within one rule.
///
/// Immutable from the analyzer's perspective; edits replace the whole
/// condition through [`Field`](crate::field::Field) mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub value: RuleValue,
    pub operator: Operator,
}

impl Condition {
    pub fn new(value: RuleValue, operator: Operator) -> Self {
        Condition { value, operator }
    }

    /// Shorthand for the common literal case.
    pub fn literal(text: impl Into<String>, operator: Operator) -> Self {
        Condition::new(RuleValue::Literal(text.into()), operator)
    }
}

/// One authored action on a field within one rule: the value written to the
/// field when the rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub value: RuleValue,
}

impl Action {
    pub fn new(value: RuleValue) -> Self {
        Action { value }
    }

    /// Shorthand for the common literal case.
    pub fn literal(text: impl Into<String>) -> Self {
        Action::new(RuleValue::Literal(text.into()))
    }
}

// =============================================================================
// OBJECT FIELD
// =============================================================================

/// Declared identity of a fact attribute, independent of any rule instance.
///
/// Two field inspectors are comparable only when their `ObjectField`s are
/// equal, so this is the equality key of the whole per-field layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectField {
    fact_type: String,
    name: String,
    data_type: DataType,
}

impl ObjectField {
    /// Create a field identity. Rejects empty fact type or field name.
    pub fn new(
        fact_type: impl Into<String>,
        name: impl Into<String>,
        data_type: DataType,
    ) -> Result<Self, ModelError> {
        let fact_type = fact_type.into();
        let name = name.into();
        if fact_type.trim().is_empty() {
            return Err(ModelError::EmptyFactType);
        }
        if name.trim().is_empty() {
            return Err(ModelError::EmptyFieldName);
        }
        Ok(ObjectField { fact_type, name, data_type })
    }

    pub fn fact_type(&self) -> &str {
        &self.fact_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

impl fmt::Display for ObjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.fact_type, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_object_field_rejects_empty_names() {
        assert_eq!(
            ObjectField::new("", "age", DataType::Numeric),
            Err(ModelError::EmptyFactType)
        );
        assert_eq!(
            ObjectField::new("Person", "  ", DataType::Numeric),
            Err(ModelError::EmptyFieldName)
        );
    }

    #[test]
    fn test_object_field_equality_is_the_comparability_key() {
        let a = ObjectField::new("Person", "age", DataType::Numeric).unwrap();
        let b = ObjectField::new("Person", "age", DataType::Numeric).unwrap();
        let c = ObjectField::new("Person", "name", DataType::Text).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_value_compare_is_same_type_only() {
        let n = Value::Numeric(Decimal::from(18));
        let d = Value::Date(NaiveDate::from_ymd_opt(2017, 6, 27).unwrap());
        assert_eq!(n.compare(&d), None);
        assert_eq!(
            Value::Numeric(Decimal::from(10)).compare(&n),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_text_has_no_trusted_ordering() {
        let a = Value::Text("alpha".into());
        let b = Value::Text("beta".into());
        assert_eq!(a.compare(&b), None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(Operator::GreaterOrEqual.as_symbol(), ">=");
        assert_eq!(Operator::NotIn.as_symbol(), "not in");
        assert!(Operator::LessThan.is_ordered());
        assert!(!Operator::In.is_ordered());
        assert!(Operator::In.is_list());
    }
}

//! Error types for the rule analysis model.

use crate::model::{DataType, Operator};
use thiserror::Error;

/// Errors constructing model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Object fields must name the fact type they belong to.
    #[error("Object field requires a non-empty fact type")]
    EmptyFactType,

    /// Object fields must carry a field name.
    #[error("Object field requires a non-empty field name")]
    EmptyFieldName,
}

/// Failure coercing an authored value into a typed comparator.
///
/// These never escape the inspector factories: a condition or action whose
/// value cannot be coerced is classified as an inert unknown inspector and
/// analysis of the remaining values continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// Literal text where a value was expected, but the text is empty.
    #[error("Empty literal value")]
    EmptyLiteral,

    /// Literal did not parse as a number.
    #[error("'{text}' is not a valid number")]
    InvalidNumber {
        /// The offending literal text.
        text: String,
    },

    /// Literal did not parse as a boolean.
    #[error("'{text}' is not a boolean (expected 'true' or 'false')")]
    InvalidBool {
        /// The offending literal text.
        text: String,
    },

    /// Literal did not parse under the configured date format.
    #[error("'{text}' does not match date format '{format}'")]
    InvalidDate {
        /// The offending literal text.
        text: String,
        /// The chrono format string in effect.
        format: String,
    },

    /// The operator makes no sense for the field's data type,
    /// e.g. `<` on a text field or `in` on a boolean field.
    #[error("Operator '{operator}' is not applicable to {data_type} values")]
    OperatorNotApplicable {
        /// The authored operator.
        operator: Operator,
        /// The field's declared data type.
        data_type: DataType,
    },

    /// A value kind the analyzer has no comparator for.
    #[error("Unsupported value kind: {detail}")]
    UnsupportedValueKind {
        /// Short description of what was encountered.
        detail: String,
    },
}

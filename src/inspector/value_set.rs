//! Set algebra over literal constraints.
//!
//! A comparable condition denotes a set of field values: a point (`==`),
//! an excluded point (`!=`), a ray (`<`, `<=`, `>`, `>=`), a finite set
//! (`in`) or the complement of one (`not in`). Conflict between two
//! conditions is disjointness of their sets; subsumption is coverage.
//!
//! The ordered domains (numbers, dates) are treated as dense: `< 19` and
//! `> 18` are not reported as conflicting even on integer-typed data,
//! because the analyzer cannot see the declared integer width and a false
//! negative is cheaper for the author than a false alarm.

use crate::model::{Operator, Value};
use std::cmp::Ordering;

/// The set of field values admitted by one literal constraint.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ValueSet<'a> {
    /// Exactly one value (`==`).
    Point(&'a Value),
    /// Everything except one value (`!=`).
    Excluded(&'a Value),
    /// A half-line (`<`, `<=`, `>`, `>=`).
    Ray { operator: Operator, bound: &'a Value },
    /// A finite set of values (`in`). Never empty.
    OneOf(&'a [Value]),
    /// The complement of a finite set (`not in`). Never empty.
    NoneOf(&'a [Value]),
}

impl<'a> ValueSet<'a> {
    /// Build the set denoted by `operator` over `values`.
    ///
    /// Returns `None` for shapes the factories should have rejected
    /// (missing scalar value, empty list).
    pub fn new(operator: Operator, values: &'a [Value]) -> Option<ValueSet<'a>> {
        match operator {
            Operator::Equals => values.first().map(ValueSet::Point),
            Operator::NotEquals => values.first().map(ValueSet::Excluded),
            Operator::LessThan
            | Operator::LessOrEqual
            | Operator::GreaterThan
            | Operator::GreaterOrEqual => {
                values.first().map(|bound| ValueSet::Ray { operator, bound })
            }
            Operator::In => (!values.is_empty()).then_some(ValueSet::OneOf(values)),
            Operator::NotIn => (!values.is_empty()).then_some(ValueSet::NoneOf(values)),
        }
    }

    /// Whether this set admits `candidate`.
    pub fn contains(&self, candidate: &Value) -> bool {
        match self {
            ValueSet::Point(v) => *v == candidate,
            ValueSet::Excluded(v) => *v != candidate,
            ValueSet::Ray { operator, bound } => ray_contains(*operator, bound, candidate),
            ValueSet::OneOf(values) => values.contains(candidate),
            ValueSet::NoneOf(values) => !values.contains(candidate),
        }
    }
}

/// True when no value belongs to both sets.
pub(crate) fn disjoint(a: &ValueSet, b: &ValueSet) -> bool {
    match (a, b) {
        (ValueSet::Point(v), _) => !b.contains(v),
        (_, ValueSet::Point(v)) => !a.contains(v),
        (ValueSet::OneOf(values), _) => values.iter().all(|v| !b.contains(v)),
        (_, ValueSet::OneOf(values)) => values.iter().all(|v| !a.contains(v)),
        (
            ValueSet::Ray { operator: op_a, bound: bound_a },
            ValueSet::Ray { operator: op_b, bound: bound_b },
        ) => ray_disjoint(*op_a, bound_a, *op_b, bound_b),
        // Excluded points and complements of finite sets always leave room.
        _ => false,
    }
}

/// True when every value of `b` belongs to `a`.
pub(crate) fn covers(a: &ValueSet, b: &ValueSet) -> bool {
    match (a, b) {
        (_, ValueSet::Point(v)) => a.contains(v),
        (_, ValueSet::OneOf(values)) => values.iter().all(|v| a.contains(v)),
        // Finite sets never cover an infinite one.
        (ValueSet::Point(_), _) | (ValueSet::OneOf(_), _) => false,
        (ValueSet::Excluded(x), ValueSet::Excluded(y)) => x == y,
        (ValueSet::Excluded(x), ValueSet::Ray { .. }) => !b.contains(x),
        (ValueSet::Excluded(x), ValueSet::NoneOf(values)) => values.contains(x),
        (
            ValueSet::Ray { operator: op_a, bound: bound_a },
            ValueSet::Ray { operator: op_b, bound: bound_b },
        ) => ray_covers(*op_a, bound_a, *op_b, bound_b),
        // A ray is bounded on one side; excluded-point sets are not.
        (ValueSet::Ray { .. }, _) => false,
        (ValueSet::NoneOf(values), ValueSet::Excluded(y)) => values.iter().all(|v| v == *y),
        (ValueSet::NoneOf(values), ValueSet::Ray { .. }) => {
            values.iter().all(|v| !b.contains(v))
        }
        (ValueSet::NoneOf(values), ValueSet::NoneOf(others)) => {
            values.iter().all(|v| others.contains(v))
        }
    }
}

fn ray_contains(operator: Operator, bound: &Value, candidate: &Value) -> bool {
    let Some(ordering) = candidate.compare(bound) else {
        return false;
    };
    match operator {
        Operator::LessThan => ordering == Ordering::Less,
        Operator::LessOrEqual => ordering != Ordering::Greater,
        Operator::GreaterThan => ordering == Ordering::Greater,
        Operator::GreaterOrEqual => ordering != Ordering::Less,
        _ => false,
    }
}

fn is_upper(operator: Operator) -> bool {
    matches!(operator, Operator::LessThan | Operator::LessOrEqual)
}

fn is_inclusive(operator: Operator) -> bool {
    matches!(operator, Operator::LessOrEqual | Operator::GreaterOrEqual)
}

fn ray_disjoint(op_a: Operator, bound_a: &Value, op_b: Operator, bound_b: &Value) -> bool {
    // Two rays pointing the same way always intersect.
    if is_upper(op_a) == is_upper(op_b) {
        return false;
    }
    let (upper_op, upper, lower_op, lower) = if is_upper(op_a) {
        (op_a, bound_a, op_b, bound_b)
    } else {
        (op_b, bound_b, op_a, bound_a)
    };
    match upper.compare(lower) {
        Some(Ordering::Less) => true,
        Some(Ordering::Equal) => !(is_inclusive(upper_op) && is_inclusive(lower_op)),
        Some(Ordering::Greater) => false,
        // Incomparable bounds: make no disjointness claim.
        None => false,
    }
}

fn ray_covers(op_a: Operator, bound_a: &Value, op_b: Operator, bound_b: &Value) -> bool {
    // A ray only covers a ray pointing the same way.
    if is_upper(op_a) != is_upper(op_b) {
        return false;
    }
    let Some(ordering) = bound_b.compare(bound_a) else {
        return false;
    };
    let inside = if is_upper(op_a) { Ordering::Less } else { Ordering::Greater };
    if ordering == inside {
        return true;
    }
    // Equal bounds: the outer ray must be at least as permissive.
    ordering == Ordering::Equal && (is_inclusive(op_a) || !is_inclusive(op_b))
}

//! Incremental conflict/subsumption/redundancy analysis over
//! decision-table rules.
//!
//! This crate powers an editor-time analyzer: as the author edits a rule
//! set, it reports which rules can both fire with contradictory effects
//! (**conflict**), which rules are implied by broader ones
//! (**subsumption**) and which rules are logically equivalent for decision
//! purposes (**redundancy**). It is a live semantic index over the rule
//! data, not a one-shot batch check: the inspector graph stays consistent
//! across edits without full recomputation.
//!
//! # Architecture
//!
//! Raw rule data flows leaves-first through the inspector graph:
//!
//! ```text
//! Field (conditions/actions)
//!   └─▶ ConditionInspector / ActionInspector   one typed comparator per value
//!         └─▶ InspectorList                    per field, per kind, in order
//!               └─▶ FieldInspector             per (rule, field) aggregate
//!                     └─▶ RuleInspector        per rule, cached, invalidated
//!                                              through RuleInspectorUpdater
//! ```
//!
//! Each [`Field`] mutation delivers the complete current collection to its
//! subscribers; the affected [`FieldInspector`] rebuilds the whole
//! inspector list (no partial patching, no incremental-update corruption)
//! and signals the rule aggregate, all before the mutating call returns.
//!
//! Everything is single-threaded and synchronous, matching the editor
//! event loop this engine serves.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use rule_inspector::{
//!     AnalyzerConfiguration, Condition, DataType, Field, FieldInspector, ObjectField,
//!     Operator, RuleInspectorUpdater,
//! };
//!
//! let config = Rc::new(AnalyzerConfiguration::default());
//! let age = ObjectField::new("Person", "age", DataType::Numeric).unwrap();
//! let field = Field::new(age);
//! field.add_condition(Condition::literal("18", Operator::LessThan));
//!
//! let updater = RuleInspectorUpdater::new();
//! let inspector = FieldInspector::from_field(&field, &updater, &config);
//! assert!(inspector.has_conflicts().is_empty());
//!
//! // The edit below contradicts the first condition; the inspector has
//! // already rebuilt by the time add_condition returns.
//! field.add_condition(Condition::literal("18", Operator::GreaterOrEqual));
//! assert!(!inspector.has_conflicts().is_empty());
//! assert_eq!(updater.condition_reset_count(), 1);
//! ```
//!
//! Malformed cells never abort analysis: anything the factories cannot
//! classify becomes an inert unknown inspector that answers `false` to
//! every query.

mod config;
mod error;
mod field;
mod inspector;
mod keys;
mod model;

pub use config::{AnalyzerConfiguration, DEFAULT_DATE_FORMAT};
pub use error::{CoercionError, ModelError};
pub use field::{Field, Subscription};
pub use inspector::{
    ActionInspector, ActionInspectorFactory, ConditionInspector, ConditionInspectorFactory,
    Conflict, ConflictSource, FieldInspector, HasKeys, HumanReadable, InspectorFactory,
    InspectorList, InspectorRelations, RuleInspector, RuleInspectorUpdater,
    UpdatableInspectorList,
};
pub use keys::UuidKey;
pub use model::{Action, Condition, DataType, ObjectField, Operator, RuleValue, Value};

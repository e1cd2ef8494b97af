//! End-to-end analysis flows: editor-style mutations driving the inspector
//! graph, and the relationship properties the engine guarantees.

use pretty_assertions::assert_eq;
use rule_inspector::{
    Action, AnalyzerConfiguration, Condition, ConditionInspector, ConditionInspectorFactory,
    Conflict, DataType, Field, FieldInspector, InspectorFactory, InspectorRelations, ObjectField,
    Operator, RuleInspector, RuleInspectorUpdater, RuleValue,
};
use std::rc::Rc;

fn config() -> Rc<AnalyzerConfiguration> {
    Rc::new(AnalyzerConfiguration::default())
}

fn age_field() -> Field {
    Field::new(ObjectField::new("Person", "age", DataType::Numeric).unwrap())
}

fn age_conditions(conditions: &[Condition]) -> Vec<ConditionInspector> {
    let factory = ConditionInspectorFactory::new(
        ObjectField::new("Person", "age", DataType::Numeric).unwrap(),
        config(),
    );
    conditions.iter().map(|c| factory.make(c)).collect()
}

#[test]
fn conflict_is_symmetric_across_inspector_kinds() {
    let inspectors = age_conditions(&[
        Condition::literal("18", Operator::LessThan),
        Condition::literal("18", Operator::GreaterOrEqual),
        Condition::literal("10", Operator::LessThan),
        Condition::new(RuleValue::Variable("bound".into()), Operator::Equals),
        Condition::new(RuleValue::Formula("age * 2".into()), Operator::Equals),
        Condition::new(RuleValue::Other("enum cell".into()), Operator::Equals),
    ]);

    for a in &inspectors {
        for b in &inspectors {
            assert_eq!(
                a.conflicts(b),
                b.conflicts(a),
                "conflict must be symmetric for {:?} vs {:?}",
                a,
                b
            );
        }
    }
}

#[test]
fn editing_a_field_keeps_the_analysis_current() {
    let field = age_field();
    field.add_condition(Condition::literal("18", Operator::LessThan));

    let updater = RuleInspectorUpdater::new();
    let inspector = FieldInspector::from_field(&field, &updater, &config());
    assert!(inspector.has_conflicts().is_empty());

    // Introduce a contradiction, then edit it away again.
    field.add_condition(Condition::literal("18", Operator::GreaterOrEqual));
    assert!(!inspector.has_conflicts().is_empty());

    field.remove_condition(1);
    assert!(inspector.has_conflicts().is_empty());

    assert_eq!(updater.condition_reset_count(), 2);
}

#[test]
fn whole_rule_analysis_through_the_cache() {
    let status = Field::new(ObjectField::new("Application", "status", DataType::Text).unwrap());
    status.add_condition(Condition::literal("OPEN", Operator::Equals));
    status.add_action(Action::literal("APPROVED"));

    let age = age_field();
    age.add_condition(Condition::literal("18", Operator::GreaterOrEqual));

    let mut rule = RuleInspector::new("approve adults", config());
    rule.add_field(&status);
    rule.add_field(&age);
    assert!(rule.has_conflicts().is_empty());

    // A stray edit makes the age column contradict itself.
    age.add_condition(Condition::literal("18", Operator::LessThan));
    let conflict = rule.has_conflicts();
    let Conflict::Pair { first, second } = conflict else {
        panic!("expected the contradiction to be reported");
    };
    assert_eq!(first.description, "age >= 18");
    assert_eq!(second.description, "age < 18");
    assert_ne!(first.key, second.key);
}

#[test]
fn conflicting_rules_are_detected_across_rules() {
    let config = config();
    let status = ObjectField::new("Application", "status", DataType::Text).unwrap();

    let approve_field = Field::new(status.clone());
    approve_field.add_condition(Condition::literal("OPEN", Operator::Equals));
    approve_field.add_action(Action::literal("A"));

    let decline_field = Field::new(status);
    decline_field.add_condition(Condition::literal("OPEN", Operator::Equals));
    decline_field.add_action(Action::literal("B"));

    let mut approve = RuleInspector::new("approve", Rc::clone(&config));
    approve.add_field(&approve_field);
    let mut decline = RuleInspector::new("decline", config);
    decline.add_field(&decline_field);

    // Same conditions, contradictory actions: the action check decides.
    assert!(approve.conflicts(&decline));
    assert!(!approve.is_redundant(&decline));
    assert!(!approve.subsumes(&decline));
}

#[test]
fn malformed_cells_do_not_poison_the_rest_of_the_rule() {
    let field = age_field();
    field.set_conditions(vec![
        Condition::literal("not a number", Operator::LessThan),
        Condition::literal("18", Operator::LessThan),
        Condition::literal("18", Operator::GreaterOrEqual),
    ]);

    let inspector = FieldInspector::from_field(&field, &RuleInspectorUpdater::new(), &config());

    // The unknown first cell relates to nothing, but the real
    // contradiction behind it is still found.
    let Conflict::Pair { first, second } = inspector.has_conflicts() else {
        panic!("expected a conflict despite the malformed cell");
    };
    assert_eq!(first.description, "age < 18");
    assert_eq!(second.description, "age >= 18");
}

#[test]
fn conflict_reports_serialize_for_the_editor() {
    let field = age_field();
    field.set_conditions(vec![
        Condition::literal("18", Operator::LessThan),
        Condition::literal("18", Operator::GreaterOrEqual),
    ]);
    let inspector = FieldInspector::from_field(&field, &RuleInspectorUpdater::new(), &config());

    let json = serde_json::to_value(inspector.has_conflicts()).unwrap();
    assert_eq!(json["Pair"]["first"]["description"], "age < 18");
    assert_eq!(json["Pair"]["second"]["description"], "age >= 18");
}

#[test]
fn reflexivity_and_cross_field_totality() {
    let age = FieldInspector::from_field(&age_field(), &RuleInspectorUpdater::new(), &config());
    let income = Field::new(ObjectField::new("Person", "income", DataType::Numeric).unwrap());
    let income = FieldInspector::from_field(&income, &RuleInspectorUpdater::new(), &config());

    assert!(age.is_redundant(&age));
    assert!(age.subsumes(&age));

    assert!(!age.conflicts(&income));
    assert!(!age.is_redundant(&income));
    assert!(!age.subsumes(&income));
}

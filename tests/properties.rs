use std::collections::HashSet;

use json2model::codegen::fixture::Fixture;
use json2model::inference::classify_string;
use json2model::inference::str::{format_date_time, parse_date_time};
use json2model::ir::{ClassDefinition, InferredType, ModelKind};
use json2model::lower::build_class_tree;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

const KEYS: &[&str] = &["a", "A", "user", "item", "x"];

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
        Just(json!("2024-01-02T10:00:00Z")),
    ]
}

fn sample() -> impl Strategy<Value = Map<String, Value>> {
    let value = scalar().prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
            prop::collection::vec((prop::sample::select(KEYS), inner), 0..4)
                .prop_map(|pairs| Value::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())),
        ]
    });
    prop::collection::vec((prop::sample::select(KEYS), value), 0..4)
        .prop_map(|pairs| pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

fn refs_resolve(class: &ClassDefinition) -> bool {
    class.fields.iter().all(|f| match f.ty.object_ref() {
        Some(target) => class.child(target).is_some(),
        None => true,
    }) && class.children.iter().all(refs_resolve)
}

proptest! {
    #[test]
    fn class_names_are_unique_within_a_pass(sample in sample()) {
        for kind in [ModelKind::Body, ModelKind::Response, ModelKind::Entity] {
            let tree = build_class_tree(kind, "event", &sample).unwrap();
            let names: Vec<&str> = tree.walk().iter().map(|c| c.ident()).collect();
            let unique: HashSet<&str> = names.iter().copied().collect();
            prop_assert_eq!(unique.len(), names.len(), "{:?}", names);
            prop_assert!(refs_resolve(&tree));
        }
    }

    #[test]
    fn response_and_entity_trees_line_up(sample in sample()) {
        let response = build_class_tree(ModelKind::Response, "event", &sample).unwrap();
        let entity = build_class_tree(ModelKind::Entity, "event", &sample).unwrap();
        let r: Vec<String> = response.walk().iter().map(|c| c.ident().trim_end_matches("Response").to_string()).collect();
        let e: Vec<String> = entity.walk().iter().map(|c| c.ident().trim_end_matches("Entity").to_string()).collect();
        prop_assert_eq!(r, e);
    }

    #[test]
    fn date_detection_agrees_with_fixtures(
        raw in r"[12][0-9]{3}-(0[1-9]|1[0-2])-(0[1-9]|1[0-9]|2[0-8])([T ]([01][0-9]|2[0-3]):[0-5][0-9](:[0-5][0-9](\.[0-9]{1,9})?)?)?(Z|[+-](0[0-9]|1[0-3]):?[0-5][0-9])?"
    ) {
        prop_assert_eq!(classify_string(&raw), InferredType::DateTime);
        let dt = parse_date_time(&raw);
        prop_assert!(dt.is_some(), "{} classified as a date but does not parse", raw);
        let dt = dt.unwrap();

        let mut sample = Map::new();
        sample.insert("at".to_string(), Value::String(raw.clone()));
        let tree = build_class_tree(ModelKind::Response, "event", &sample).unwrap();
        prop_assert_eq!(&tree.fields[0].ty, &InferredType::DateTime);

        let canonical = Fixture::new(ModelKind::Response, "event", &sample).unwrap().canonical_json(&sample);
        let shown = format_date_time(&dt);
        prop_assert_eq!(&canonical["at"], &Value::String(shown.clone()));
        prop_assert_eq!(classify_string(&shown), InferredType::DateTime);
        prop_assert_eq!(parse_date_time(&shown), Some(dt));
    }

    #[test]
    fn out_of_range_calendar_values_decode_to_null(
        raw in r"[0-9]{4}-(1[3-9]|[2-9][0-9])-[0-9]{2}"
    ) {
        prop_assert_eq!(classify_string(&raw), InferredType::DateTime);
        prop_assert_eq!(parse_date_time(&raw), None);
        let mut sample = Map::new();
        sample.insert("at".to_string(), Value::String(raw));
        let canonical = Fixture::new(ModelKind::Response, "event", &sample).unwrap().canonical_json(&sample);
        prop_assert_eq!(&canonical["at"], &Value::Null);
    }

    #[test]
    fn plain_words_are_never_dates(raw in "[a-zA-Z ]{0,12}") {
        prop_assert_eq!(classify_string(&raw), InferredType::String);
    }
}

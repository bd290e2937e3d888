//! Property-based tests for path resolution
//!
//! These tests verify that parsing and resolution are total (never panic),
//! deterministic, and agree with direct indexing for singular paths.

use super::{PathError, PathQuery};
use proptest::prelude::*;
use serde_json::Value;

/// Strategy for generating simple JSON values with controlled depth
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9 ]{0,20}".prop_map(Value::String),
    ];

    leaf.prop_recursive(
        4,  // max depth
        32, // max size
        5,  // items per collection
        |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                proptest::collection::vec(("[a-c]{1,2}", inner), 0..5)
                    .prop_map(|members| Value::Object(members.into_iter().collect())),
            ]
        },
    )
}

/// Strategy for generating path expressions over short member names
fn path_strategy() -> impl Strategy<Value = String> {
    let step = prop_oneof![
        "[a-c]{1,2}".prop_map(|s| format!(".{}", s)),
        (-4i64..6).prop_map(|i| format!("[{}]", i)),
        Just(".*".to_string()),
        "[a-c]{1,2}".prop_map(|s| format!("..{}", s)),
        (proptest::option::of(-4i64..6), proptest::option::of(-4i64..6), -3i64..4)
            .prop_filter("non-zero step", |(_, _, step)| *step != 0)
            .prop_map(|(start, end, step)| format!(
                "[{}:{}:{}]",
                start.map(|s| s.to_string()).unwrap_or_default(),
                end.map(|e| e.to_string()).unwrap_or_default(),
                step
            )),
        ("[a-c]{1,2}", -2i64..3).prop_map(|(field, n)| format!("[?(@.{} > {})]", field, n)),
    ];

    proptest::collection::vec(step, 0..4).prop_map(|steps| format!("${}", steps.concat()))
}

/// Singular paths paired with the equivalent JSON pointer
fn singular_path_strategy() -> impl Strategy<Value = (String, String)> {
    proptest::collection::vec(
        prop_oneof![
            "[a-c]{1,2}".prop_map(|s| (format!(".{}", s), format!("/{}", s))),
            (0usize..4).prop_map(|i| (format!("[{}]", i), format!("/{}", i))),
        ],
        0..4,
    )
    .prop_map(|steps| {
        let (path, pointer): (Vec<String>, Vec<String>) = steps.into_iter().unzip();
        (format!("${}", path.concat()), pointer.concat())
    })
}

proptest! {
    /// Parsing arbitrary input never panics
    #[test]
    fn prop_parse_never_panics(input in "\\PC{0,40}") {
        let _ = PathQuery::parse(&input);
    }

    /// Generated paths always parse
    #[test]
    fn prop_generated_paths_parse(path in path_strategy()) {
        prop_assert!(PathQuery::parse(&path).is_ok(), "failed to parse {}", path);
    }

    /// Resolution never panics and multi-match paths never fail on shape
    #[test]
    fn prop_resolution_total(path in path_strategy(), json in json_value_strategy()) {
        let query = PathQuery::parse(&path).expect("generated path should parse");
        let result = query.resolve(&json);
        if !query.is_singular() {
            prop_assert!(result.as_ref().map(Value::is_array).unwrap_or(false));
        }
    }

    /// Resolution is deterministic
    #[test]
    fn prop_resolution_deterministic(path in path_strategy(), json in json_value_strategy()) {
        let query = PathQuery::parse(&path).expect("generated path should parse");
        prop_assert_eq!(query.resolve(&json), query.resolve(&json));
    }

    /// Singular paths agree with JSON pointer lookup
    #[test]
    fn prop_singular_agrees_with_pointer(
        (path, pointer) in singular_path_strategy(),
        json in json_value_strategy()
    ) {
        let query = PathQuery::parse(&path).expect("generated path should parse");
        prop_assert!(query.is_singular());
        match (query.resolve(&json), json.pointer(&pointer)) {
            (Ok(found), Some(expected)) => prop_assert_eq!(&found, expected),
            (Err(PathError::NotFound { .. }), None)
            | (Err(PathError::IndexOutOfBounds { .. }), None)
            | (Err(PathError::TypeMismatch { .. }), None) => {}
            (result, expected) => prop_assert!(false, "{}: {:?} vs {:?}", path, result, expected),
        }
    }

    /// Slices never select more elements than the array holds
    #[test]
    fn prop_slice_in_bounds(
        items in proptest::collection::vec(any::<i64>(), 0..10),
        start in proptest::option::of(-12i64..12),
        end in proptest::option::of(-12i64..12),
        step in prop_oneof![-3i64..0, 1i64..4],
    ) {
        let path = format!(
            "$[{}:{}:{}]",
            start.map(|s| s.to_string()).unwrap_or_default(),
            end.map(|e| e.to_string()).unwrap_or_default(),
            step
        );
        let data = Value::from(items.clone());
        let selected = PathQuery::parse(&path)
            .expect("slice should parse")
            .resolve(&data)
            .expect("slice should resolve");
        let selected = selected.as_array().cloned().unwrap_or_default();
        prop_assert!(selected.len() <= items.len());
        for value in &selected {
            prop_assert!(data.as_array().map(|a| a.contains(value)).unwrap_or(false));
        }
    }

    /// Slices with bounds and steps anywhere in the i64 range stay in bounds
    #[test]
    fn prop_slice_extreme_values_in_bounds(
        items in proptest::collection::vec(any::<i64>(), 0..10),
        start in proptest::option::of(any::<i64>()),
        end in proptest::option::of(any::<i64>()),
        step in any::<i64>().prop_filter("non-zero step", |step| *step != 0),
    ) {
        let path = format!(
            "$[{}:{}:{}]",
            start.map(|s| s.to_string()).unwrap_or_default(),
            end.map(|e| e.to_string()).unwrap_or_default(),
            step
        );
        let data = Value::from(items.clone());
        let selected = PathQuery::parse(&path)
            .expect("slice should parse")
            .resolve(&data)
            .expect("slice should resolve");
        let selected = selected.as_array().cloned().unwrap_or_default();
        prop_assert!(selected.len() <= items.len());
    }

    /// Out-of-range indices anywhere in the i64 range fail without panicking
    #[test]
    fn prop_extreme_index_is_out_of_bounds(
        index in any::<i64>().prop_filter("outside the array", |i| i.unsigned_abs() > 10),
    ) {
        let data = Value::from(vec![1, 2, 3]);
        let result = PathQuery::parse(&format!("$[{}]", index))
            .expect("index should parse")
            .resolve(&data);
        let is_out_of_bounds = matches!(result, Err(PathError::IndexOutOfBounds { .. }));
        prop_assert!(is_out_of_bounds, "{}", index);
    }
}

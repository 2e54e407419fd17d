use super::*;
use serde_json::json;

fn parse(json: serde_json::Value) -> Node {
    schema(json).expect("valid schema")
}

fn object_with_a() -> Node {
    parse(json!({
        "basis": "object",
        "required": [{"key": "a", "value": {"basis": "number", "divisor": 3, "min": 5}}]
    }))
}

fn obj(entries: &[(&str, Value)]) -> Value {
    Value::object(entries.iter().cloned())
}

#[test]
fn test_valid_data_is_returned_unchanged() {
    let n = object_with_a();
    let data = obj(&[("a", Value::from(6))]);
    let out = n.apply(&data).expect("valid data");
    assert_eq!(out, data);
    assert!(n.allows(&data));
}

#[test]
fn test_missing_required_key() {
    let n = object_with_a();
    let problems = n.apply(&obj(&[("b", Value::from(6))])).unwrap_err();
    assert_eq!(problems.summary(), "Must be provided");
    let problem = problems.iter().next().expect("one problem");
    assert_eq!(problem.path(), &[PropKey::from("a")]);
    assert!(matches!(problem.code(), ProblemCode::Missing { .. }));
}

#[test]
fn test_nested_problem_is_prefixed_with_path() {
    let n = object_with_a();
    let problems = n.apply(&obj(&[("a", Value::from(7))])).unwrap_err();
    assert_eq!(problems.summary(), "a must be a multiple of 3");
    assert_eq!(problems.len(), 1);
    assert!(problems.at("a").is_some());
}

#[test]
fn test_root_problem() {
    let n = parse(json!({"basis": "number", "divisor": 3}));
    let problems = n.apply(&Value::from(7)).unwrap_err();
    assert_eq!(problems.summary(), "Must be a multiple of 3");
}

#[test]
fn test_failed_basis_skips_refinements() {
    let n = parse(json!({"basis": "number", "divisor": 3, "min": 5}));
    let problems = n.apply(&Value::from("7")).unwrap_err();
    assert_eq!(problems.summary(), "Must be a number");
}

#[test]
fn test_problems_at_one_path_are_merged() {
    let n = object_with_a();
    let problems = n.apply(&obj(&[("a", Value::from(4))])).unwrap_err();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems.count(), 2);
    assert_eq!(problems.summary(), "a must be a multiple of 3 and at least 5");
    let merged = problems.at("a").expect("problem at a");
    assert!(matches!(merged.code(), ProblemCode::Intersection { problems } if problems.len() == 2));
}

#[test]
fn test_problems_at_different_paths_are_listed() {
    let n = parse(json!({
        "basis": "object",
        "required": [
            {"key": "name", "value": "string"},
            {"key": "age", "value": {"basis": "number", "min": 0}}
        ]
    }));
    let problems = n
        .apply(&obj(&[("name", Value::from(1)), ("age", Value::from(-1))]))
        .unwrap_err();
    assert_eq!(problems.len(), 2);
    let summary = problems.summary();
    assert!(summary.contains("name must be a string"));
    assert!(summary.contains("age must be at least 0"));
}

#[test]
fn test_optional_key_may_be_absent() {
    let n = parse(json!({
        "basis": "object",
        "optional": [{"key": "a", "value": "string"}]
    }));
    assert!(n.apply(&obj(&[])).is_ok());
    let problems = n.apply(&obj(&[("a", Value::from(1))])).unwrap_err();
    assert_eq!(problems.summary(), "a must be a string");
}

#[test]
fn test_nested_paths_are_joined() {
    let n = parse(json!({
        "basis": "object",
        "required": [{
            "key": "outer",
            "value": {
                "basis": "object",
                "required": [{"key": "inner", "value": "string"}]
            }
        }]
    }));
    let data = obj(&[("outer", obj(&[("inner", Value::from(false))]))]);
    let problems = n.apply(&data).unwrap_err();
    assert_eq!(problems.summary(), "outer.inner must be a string");
}

#[test]
fn test_union_with_no_candidate_branch() {
    let n = parse(json!(["string", "number"]));
    let problems = n.apply(&Value::from(true)).unwrap_err();
    assert_eq!(problems.summary(), "Must be a number or a string");
}

#[test]
fn test_union_reports_single_candidate_problems() {
    let n = parse(json!([{"basis": "number", "min": 5}, "string"]));
    let problems = n.apply(&Value::from(1)).unwrap_err();
    assert_eq!(problems.summary(), "Must be at least 5");
}

#[test]
fn test_union_branch_problems_are_discarded_on_success() {
    let n = parse(json!([
        {"basis": "number", "divisor": 2},
        {"basis": "number", "divisor": 3}
    ]));
    assert_eq!(n.apply(&Value::from(9)).unwrap(), Value::from(9));

    let problems = n.apply(&Value::from(5)).unwrap_err();
    assert_eq!(problems.len(), 1);
    let ProblemCode::Union { branches, .. } = problems.iter().next().unwrap().code() else {
        panic!("expected a union problem");
    };
    assert_eq!(branches.len(), 2);
}

#[test]
fn test_problems_throw_as_validation_error() {
    let n = parse(json!("string"));
    let err = n.apply(&Value::from(1)).unwrap_err().throw::<()>().unwrap_err();
    assert!(matches!(&err, SchemaError::Validation(message) if message == "Must be a string"));
}

#[test]
fn test_length_bound_on_arrays() {
    let n = parse(json!({"proto": "$ark.Array", "max": 2}));
    assert!(n.allows(&Value::array(vec![Value::from(1), Value::from(2)])));
    let problems = n
        .apply(&Value::array(vec![Value::from(1), Value::from(2), Value::from(3)]))
        .unwrap_err();
    assert_eq!(problems.summary(), "Must be at most length 2");
}

#[test]
fn test_string_length_counts_utf16_units() {
    let n = parse(json!({"basis": "string", "max": 1}));
    assert!(n.allows(&Value::from("é")));
    assert!(!n.allows(&Value::from("😀")));
    assert_eq!(Value::from("😀").length(), Some(2));
    assert_eq!(
        n.apply(&Value::from("😀")).unwrap_err().summary(),
        "Must be at most length 1"
    );
}

#[test]
fn test_predicate_problem() {
    let even = Predicate::named("isEven", |data: &Value| {
        data.as_number().is_some_and(|n| n % 2.0 == 0.0)
    });
    let n = schema(Def::map([
        ("basis", Def::from("number")),
        ("predicate", Def::from(even)),
    ]))
    .unwrap();
    assert!(n.apply(&Value::from(4)).is_ok());
    let problems = n.apply(&Value::from(3)).unwrap_err();
    assert_eq!(problems.summary(), "Must be valid according to isEven");
}

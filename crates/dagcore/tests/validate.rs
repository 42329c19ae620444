use dagcore::{validate_inputs, validate_output, Args, NodeDef, TypeTag, ValidationError, Value};
use std::collections::HashMap;

fn typed_node() -> dagcore::NodeRef {
    NodeDef::blocking("typed", |args| {
        Ok(Value::Int(args.require_i64("count")?))
    })
    .param("count", TypeTag::Int)
    .optional_param("label", TypeTag::String)
    .returns(TypeTag::Int)
    .build()
}

#[test]
fn test_matching_inputs_pass() {
    let node = typed_node();
    let args = Args::from_map(HashMap::from([
        ("count".to_string(), Value::Int(3)),
        ("label".to_string(), Value::String("ok".into())),
    ]));

    assert!(validate_inputs(&node, &args).is_ok());
}

#[test]
fn test_absent_optional_param_passes() {
    let node = typed_node();
    let mut args = Args::new();
    args.insert("count", Value::Int(3));

    assert!(validate_inputs(&node, &args).is_ok());
}

#[test]
fn test_mismatched_input_rejected() {
    let node = typed_node();
    let mut args = Args::new();
    args.insert("count", Value::String("three".into()));

    let err = validate_inputs(&node, &args).unwrap_err();
    match err {
        ValidationError::Input {
            node,
            param,
            expected,
            actual,
        } => {
            assert_eq!(node, "typed");
            assert_eq!(param, "count");
            assert_eq!(expected, "Int");
            assert_eq!(actual, "String");
        }
        other => panic!("expected input validation error, got {other:?}"),
    }
}

#[test]
fn test_output_type_checked() {
    let node = typed_node();

    assert!(validate_output(&node, &Value::Int(1)).is_ok());
    let err = validate_output(&node, &Value::Null).unwrap_err();
    assert!(matches!(err, ValidationError::Output { .. }));
}

#[test]
fn test_any_accepts_everything() {
    for value in [
        Value::Null,
        Value::Bool(true),
        Value::Int(1),
        Value::Float(1.5),
        Value::String("s".into()),
        Value::Array(vec![]),
    ] {
        assert!(TypeTag::Any.matches(&value));
    }
}

#[test]
fn test_float_accepts_int() {
    assert!(TypeTag::Float.matches(&Value::Int(2)));
    assert!(!TypeTag::Int.matches(&Value::Float(2.0)));
}

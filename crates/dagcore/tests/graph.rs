use dagcore::{Dag, GraphError, NodeDef, NodeRef, TypeTag, Value};

fn leaf(name: &str, value: i64) -> NodeRef {
    NodeDef::blocking(name, move |_| Ok(Value::Int(value)))
        .returns(TypeTag::Int)
        .build()
}

fn position(order: &[String], name: &str) -> usize {
    order
        .iter()
        .position(|n| n == name)
        .unwrap_or_else(|| panic!("{} not in topo order", name))
}

#[test]
fn test_build_collects_transitive_closure() {
    let base = leaf("base", 1);
    let left = NodeDef::blocking("left", |args| Ok(Value::Int(args.require_i64("base")? + 1)))
        .dependency(&base)
        .param("base", TypeTag::Int)
        .build();
    let right = NodeDef::blocking("right", |args| Ok(Value::Int(args.require_i64("base")? * 2)))
        .dependency(&base)
        .param("base", TypeTag::Int)
        .build();
    let top = NodeDef::blocking("top", |args| {
        Ok(Value::Int(
            args.require_i64("left")? + args.require_i64("right")?,
        ))
    })
    .dependency(&left)
    .dependency(&right)
    .param("left", TypeTag::Int)
    .param("right", TypeTag::Int)
    .build();

    let dag = Dag::build([top]).unwrap();

    assert_eq!(dag.len(), 4);
    // Dag shows up in test failure output, so it must stay Debug.
    assert!(format!("{dag:?}").contains("base"));
    assert!(dag.contains("base"));
    assert!(dag.contains("top"));
    assert!(dag.get("left").is_some());
    assert!(dag.get("nope").is_none());
}

#[test]
fn test_topo_order_puts_dependencies_first() {
    let base = leaf("base", 1);
    let mid = NodeDef::blocking("mid", |args| Ok(args.require("base")?.clone()))
        .dependency(&base)
        .param("base", TypeTag::Int)
        .build();
    let top = NodeDef::blocking("top", |args| Ok(args.require("mid")?.clone()))
        .dependency(&mid)
        .param("mid", TypeTag::Int)
        .build();

    let dag = Dag::build([top]).unwrap();
    let order = dag.topo_order();

    assert!(position(order, "base") < position(order, "mid"));
    assert!(position(order, "mid") < position(order, "top"));
}

#[test]
fn test_shared_dependency_is_collected_once() {
    let shared = leaf("shared", 7);
    let a = NodeDef::blocking("a", |args| Ok(args.require("shared")?.clone()))
        .dependency(&shared)
        .param("shared", TypeTag::Int)
        .build();
    let b = NodeDef::blocking("b", |args| Ok(args.require("shared")?.clone()))
        .dependency(&shared)
        .param("shared", TypeTag::Int)
        .build();

    let dag = Dag::build([a, b]).unwrap();

    assert_eq!(dag.len(), 3);
}

#[test]
fn test_duplicate_names_rejected() {
    let first = leaf("x", 1);
    let second = leaf("x", 2);
    let parent = NodeDef::blocking("parent", |args| Ok(args.require("x")?.clone()))
        .dependency(&first)
        .dependency(&second)
        .param("x", TypeTag::Int)
        .build();

    let err = Dag::build([parent]).unwrap_err();

    match err {
        GraphError::DuplicateNodeName(name) => assert_eq!(name, "x"),
        other => panic!("expected duplicate-name error, got {other:?}"),
    }
}

#[test]
fn test_empty_dag() {
    let dag = Dag::build(Vec::<NodeRef>::new()).unwrap();
    assert!(dag.is_empty());
    assert!(dag.topo_order().is_empty());
}

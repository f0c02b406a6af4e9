use serde_json::json;
use whisper_array::api::{self, CallOptions};
use whisper_array::array::Array;
use whisper_array::container::{Container, Item, Leaf, MapOptions};
use whisper_array::error::{ArrayError, ErrorKind};
use whisper_array::numeric_scalar::NumericScalar;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn array(values: Vec<f32>) -> Array {
    let len = values.len();
    Array::from_vec(values, &[len]).unwrap()
}

fn values(container: &Container, chain: &str) -> Vec<f32> {
    container.at_key_chain(chain).unwrap().as_array().unwrap().to_vec().unwrap()
}

fn nested() -> Container {
    Container::new()
        .with("a", array(vec![1.0, 2.0]))
        .with("b", Container::new().with("c", array(vec![3.0])).with("d", array(vec![4.0, 5.0])))
}

#[test]
fn unified_functions_map_over_containers() {
    init_logging();
    let x = nested();
    let y = api::add(&x, &x, CallOptions::new()).unwrap();
    assert_eq!(y.key_chains(), vec!["a", "b.c", "b.d"]);
    assert_eq!(values(&y, "a"), vec![2.0, 4.0]);
    assert_eq!(values(&y, "b.c"), vec![6.0]);
    assert_eq!(values(&y, "b.d"), vec![8.0, 10.0]);
}

#[test]
fn container_results_match_leafwise_calls() {
    init_logging();
    let x = nested();
    let mapped = api::exp(&x, CallOptions::new()).unwrap();
    for chain in x.key_chains() {
        let leaf = x.at_key_chain(&chain).unwrap().as_array().unwrap();
        let direct = api::exp(leaf, CallOptions::new()).unwrap();
        let via_container = mapped.at_key_chain(&chain).unwrap().as_array().unwrap();
        assert!(api::array_equal(&direct, via_container).unwrap());
    }
}

#[test]
fn container_operators_and_sugar() {
    init_logging();
    let x = Container::new().with("a", array(vec![1.0, -2.0])).with("b", array(vec![3.0]));
    let doubled = (&x + &x).unwrap();
    assert_eq!(values(&doubled, "a"), vec![2.0, -4.0]);
    let zeros = (&x - &x).unwrap();
    assert_eq!(values(&zeros, "b"), vec![0.0]);
    let squared = (&x * &x).unwrap();
    assert_eq!(values(&squared, "a"), vec![1.0, 4.0]);
    assert_eq!(values(&(-&x).unwrap(), "a"), vec![-1.0, 2.0]);
    assert_eq!(values(&x.abs().unwrap(), "a"), vec![1.0, 2.0]);
    assert_eq!(values(&x.sum().unwrap(), "a"), vec![-1.0]);
    assert_eq!(values(&x.mean().unwrap(), "b"), vec![3.0]);
}

#[test]
fn reductions_map_with_arguments() {
    init_logging();
    let x = Container::new()
        .with("m", Array::from_vec(vec![1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap())
        .with("n", Array::from_vec(vec![0.0f32, 1.0, 0.0, 1.0], &[2, 2]).unwrap());
    let y = api::sum(&x, Some(&[0]), false, CallOptions::new()).unwrap();
    assert_eq!(values(&y, "m"), vec![4.0, 6.0]);
    assert_eq!(values(&y, "n"), vec![0.0, 2.0]);
}

#[test]
fn incongruent_containers_fail() {
    init_logging();
    let x = nested();
    let y = Container::new().with("a", array(vec![1.0, 2.0]));
    let err = api::add(&x, &y, CallOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatchError);

    let z = Container::new().with("a", array(vec![1.0, 2.0])).with("b", array(vec![1.0]));
    let err = Container::assert_identical_structure(&[&x, &z]).unwrap_err();
    assert!(matches!(err, ArrayError::StructureMismatch { ref path, .. } if path == "b"));
}

#[test]
fn key_chain_filters() {
    init_logging();
    let x = nested();
    let negate = |leaf: &Leaf, _chain: &str| -> Result<Leaf, ArrayError> {
        match leaf {
            Leaf::Array(a) => Ok(Leaf::Array((-a)?)),
            other => Ok(other.clone()),
        }
    };

    let only_b = x.map(negate, &MapOptions::new().include(&["b"])).unwrap();
    assert_eq!(values(&only_b, "a"), vec![1.0, 2.0]);
    assert_eq!(values(&only_b, "b.c"), vec![-3.0]);
    assert_eq!(values(&only_b, "b.d"), vec![-4.0, -5.0]);

    let not_bd = x.map(negate, &MapOptions::new().exclude(&["b.d"])).unwrap();
    assert_eq!(values(&not_bd, "a"), vec![-1.0, -2.0]);
    assert_eq!(values(&not_bd, "b.d"), vec![4.0, 5.0]);

    let pruned = x
        .map(negate, &MapOptions::new().include(&["b.c"]).prune_unapplied(true))
        .unwrap();
    assert_eq!(pruned.key_chains(), vec!["b.c"]);

    // a filter on "b" does not select a sibling named "bc"
    let sibling = Container::new().with("bc", array(vec![1.0]));
    let untouched = sibling.map(negate, &MapOptions::new().include(&["b"])).unwrap();
    assert_eq!(values(&untouched, "bc"), vec![1.0]);
}

#[test]
fn sequences_are_mapped_on_request() {
    init_logging();
    let x = Container::new().with("s", vec![Item::from(array(vec![1.0])), Item::from(array(vec![2.0]))]);
    assert_eq!(x.key_chains(), vec!["s.0", "s.1"]);

    let mut calls = 0;
    let count = |leaf: &Leaf, _chain: &str| -> Result<Leaf, ArrayError> {
        calls += 1;
        Ok(leaf.clone())
    };
    x.map(count, &MapOptions::new()).unwrap();
    assert_eq!(calls, 0);

    let doubled = api::multiply(&x, &x, CallOptions::new()).unwrap();
    assert_eq!(values(&doubled, "s.1"), vec![4.0]);
}

#[test]
fn untraversed_sequences_are_pruned_as_a_unit() {
    init_logging();
    let x = Container::new()
        .with("a", array(vec![1.0]))
        .with("s", vec![Item::from(array(vec![2.0])), Item::from(array(vec![3.0]))]);
    let keep = |leaf: &Leaf, _chain: &str| -> Result<Leaf, ArrayError> { Ok(leaf.clone()) };

    let pruned = x
        .map(keep, &MapOptions::new().exclude(&["s"]).prune_unapplied(true))
        .unwrap();
    assert_eq!(pruned.key_chains(), vec!["a"]);

    let copied = x.map(keep, &MapOptions::new().exclude(&["s"])).unwrap();
    assert_eq!(copied.key_chains(), vec!["a", "s.0", "s.1"]);

    let included = x
        .map(keep, &MapOptions::new().include(&["s"]).prune_unapplied(true))
        .unwrap();
    assert_eq!(included.key_chains(), vec!["s.0", "s.1"]);
}

#[test]
fn key_chain_access() {
    init_logging();
    let mut x = nested();
    assert!(x.at_key_chain("b.c").is_some());
    assert!(x.at_key_chain("b.z").is_none());
    assert!(x.at_key_chain("a.c").is_none());

    x.set_at_key_chain("e.f", array(vec![6.0])).unwrap();
    assert_eq!(x.key_chains(), vec!["a", "b.c", "b.d", "e.f"]);
    x.set_at_key_chain("a", NumericScalar::I64(1)).unwrap();
    assert!(matches!(x.at_key_chain("a"), Some(Item::Leaf(Leaf::Scalar(NumericScalar::I64(1))))));
    assert!(x.set_at_key_chain("a.g", array(vec![0.0])).is_err());
    assert!(x.remove("e").is_some());
    assert_eq!(x.len(), 2);
}

#[test]
fn json_literals() {
    init_logging();
    let x = Container::from_json_str(r#"{"w": [[1.0, 2.0], [3.0, 4.0]], "b": {"n": 3, "mixed": [[1], 2]}}"#).unwrap();
    let w = x.at_key_chain("w").unwrap().as_array().unwrap();
    assert_eq!(w.shape(), vec![2, 2]);
    assert!(matches!(x.at_key_chain("b.n"), Some(Item::Leaf(Leaf::Scalar(NumericScalar::I64(3))))));
    assert!(matches!(x.at_key_chain("b.mixed"), Some(Item::Sequence(items)) if items.len() == 2));

    assert_eq!(x.to_json().unwrap()["w"], json!([[1.0, 2.0], [3.0, 4.0]]));
    assert_eq!(x.keys().collect::<Vec<_>>(), vec!["w", "b"]);
    assert!(Container::from_json_str("[1, 2]").is_err());
    assert!(Container::from_json_str(r#"{"a": "text"}"#).is_err());
}

#[test]
fn display_is_indented() {
    init_logging();
    let x = Container::new()
        .with("a", NumericScalar::I64(1))
        .with("b", Container::new().with("c", NumericScalar::BOOL(true)));
    assert_eq!(x.to_string(), "{\n    a: 1 (Int64),\n    b: {\n        c: true (Bool),\n    },\n}");
}

#[test]
fn container_out_buffers_are_filled() {
    init_logging();
    let x = nested();
    let mut out = api::zeros_like(&x, CallOptions::new()).unwrap();
    let ptr = out.at_key_chain("a").unwrap().as_array().unwrap().data_ptr();
    let returned = api::add(&x, &x, CallOptions::new().out_container(&mut out)).unwrap();
    assert_eq!(values(&out, "b.d"), vec![8.0, 10.0]);
    assert_eq!(values(&returned, "a"), vec![2.0, 4.0]);
    assert_eq!(out.at_key_chain("a").unwrap().as_array().unwrap().data_ptr(), ptr);

    api::multiply(&x, &x, CallOptions::new().out_container(&mut out)).unwrap();
    assert_eq!(out.at_key_chain("a").unwrap().as_array().unwrap().data_ptr(), ptr);
    assert_eq!(values(&out, "a"), vec![1.0, 4.0]);
    assert_eq!(values(&returned, "a"), vec![2.0, 4.0]);
}

#[test]
fn negating_a_nested_literal() {
    init_logging();
    let c = Container::from_json_str(r#"{"a": {"x": [1, 2, 3]}, "b": [4, 5]}"#).unwrap();
    let negated = api::negative(&c, CallOptions::new()).unwrap();
    assert_eq!(negated.key_chains(), vec!["a.x", "b"]);
    assert_eq!(negated.to_json().unwrap(), json!({"a": {"x": [-1, -2, -3]}, "b": [-4, -5]}));
}

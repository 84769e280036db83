use std::collections::{BTreeMap, HashMap};

use starconv_core::{
    decode_value, DecodeOptions, Dict, ErrorKind, NameConverter, Record, Symbol, Value,
};

fn int(i: i64) -> Value {
    Value::from(i)
}

fn string(s: &str) -> Value {
    Value::from(s)
}

fn list(items: Vec<Value>) -> Value {
    Value::List(items)
}

fn dict(entries: Vec<(&str, Value)>) -> Value {
    Value::Dict(
        Dict::from_entries(entries.into_iter().map(|(k, v)| (Value::from(k), v))).unwrap(),
    )
}

fn make_struct(brand: &str, fields: Vec<(&str, Value)>) -> Value {
    let kwargs: Vec<(String, Value)> = fields
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    Symbol::new(brand).call(&[], &kwargs).unwrap()
}

fn decode<T: starconv_core::Decode>(value: &Value, dst: &mut T) -> starconv_core::Result<()> {
    decode_value(value, dst, &DecodeOptions::new())
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct SubStruct {
    pub s: String,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct TestStruct {
    pub x: i64,
    pub y: i64,
    pub l: Vec<i64>,
    pub s: SubStruct,
    pub p: Option<SubStruct>,
    hidden: i64,
}

fn out_struct() -> TestStruct {
    TestStruct {
        x: 1,
        y: 2,
        l: vec![1, 2],
        s: SubStruct { s: "meow".into() },
        p: Some(SubStruct { s: "woof".into() }),
        hidden: 0,
    }
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn decode_int() {
    let mut dst = 0i64;
    decode(&int(42), &mut dst).unwrap();
    assert_eq!(dst, 42);
}

#[test]
fn decode_str() {
    let mut dst = String::new();
    decode(&string("meow"), &mut dst).unwrap();
    assert_eq!(dst, "meow");
}

#[test]
fn decode_bool() {
    let mut dst = false;
    decode(&Value::Bool(true), &mut dst).unwrap();
    assert!(dst);
}

#[test]
fn decode_float() {
    let mut dst = 0.0f64;
    decode(&Value::Float(1.25), &mut dst).unwrap();
    assert_eq!(dst, 1.25);

    let mut narrow = 0.0f32;
    decode(&Value::Float(0.5), &mut narrow).unwrap();
    assert_eq!(narrow, 0.5);
}

#[test]
fn decode_int_into_float_is_mismatch() {
    let mut dst = 0.0f64;
    let err = decode(&int(1), &mut dst).unwrap_err();
    assert_eq!(err.to_string(), "expected float, found int");
}

#[test]
fn decode_string_into_int_is_mismatch() {
    let mut dst = 7i32;
    let err = decode(&string("7"), &mut dst).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::TypeMismatch {
            expected: "int",
            found: "string"
        }
    ));
    assert_eq!(dst, 7);
}

#[test]
fn decode_null_into_scalar_is_mismatch() {
    let mut dst = String::from("keep");
    let err = decode(&Value::Null, &mut dst).unwrap_err();
    assert_eq!(err.to_string(), "expected string, found NoneType");
    assert_eq!(dst, "keep");
}

#[test]
fn decode_int_narrows_by_truncation() {
    let mut byte = 0u8;
    decode(&int(300), &mut byte).unwrap();
    assert_eq!(byte, 44);

    let mut unsigned = 0u32;
    decode(&int(-1), &mut unsigned).unwrap();
    assert_eq!(unsigned, u32::MAX);

    let big = Value::Int(num_bigint::BigInt::from(1u128 << 70) + 5);
    let mut wide = 0u64;
    decode(&big, &mut wide).unwrap();
    assert_eq!(wide, 5);
}

#[test]
fn decode_bigint_keeps_full_width() {
    let big: num_bigint::BigInt = num_bigint::BigInt::from(u128::MAX) * 3;
    let mut dst = num_bigint::BigInt::default();
    decode(&Value::Int(big.clone()), &mut dst).unwrap();
    assert_eq!(dst, big);
}

// ============================================================================
// Optional and boxed destinations
// ============================================================================

#[test]
fn decode_null_clears_option() {
    let mut dst = Some(5i64);
    decode(&Value::Null, &mut dst).unwrap();
    assert_eq!(dst, None);
}

#[test]
fn decode_allocates_empty_option() {
    let mut dst: Option<SubStruct> = None;
    decode(&dict(vec![("s", string("woof"))]), &mut dst).unwrap();
    assert_eq!(dst, Some(SubStruct { s: "woof".into() }));
}

#[test]
fn decode_into_existing_option_keeps_unmentioned_fields() {
    let mut dst = Some(TestStruct {
        y: 9,
        ..TestStruct::default()
    });
    decode(&dict(vec![("x", int(3))]), &mut dst).unwrap();
    let got = dst.unwrap();
    assert_eq!((got.x, got.y), (3, 9));
}

#[test]
fn decode_null_into_box_is_noop() {
    let mut dst = Box::new(11i64);
    decode(&Value::Null, &mut dst).unwrap();
    assert_eq!(*dst, 11);

    decode(&int(12), &mut dst).unwrap();
    assert_eq!(*dst, 12);
}

// ============================================================================
// Lists and arrays
// ============================================================================

#[test]
fn decode_none_list() {
    let mut dst = vec![1i64, 2, 3];
    decode(&Value::Null, &mut dst).unwrap();
    assert_eq!(dst, vec![1, 2, 3]);
}

#[test]
fn decode_list() {
    let mut dst: Vec<i64> = Vec::new();
    decode(&list(vec![int(1), int(2), int(3)]), &mut dst).unwrap();
    assert_eq!(dst, vec![1, 2, 3]);
}

#[test]
fn decode_list_replaces_previous_contents() {
    let mut dst = vec![9i64, 9, 9, 9];
    decode(&list(vec![int(1)]), &mut dst).unwrap();
    assert_eq!(dst, vec![1]);
}

#[test]
fn decode_list_failure_leaves_vec_untouched() {
    let mut dst = vec![7i64];
    let err = decode(&list(vec![int(1), string("two")]), &mut dst).unwrap_err();
    assert_eq!(err.path(), "[1]");
    assert_eq!(dst, vec![7]);
}

#[test]
fn decode_non_list_into_vec_is_mismatch() {
    let mut dst: Vec<i64> = Vec::new();
    let err = decode(&dict(vec![]), &mut dst).unwrap_err();
    assert_eq!(err.to_string(), "expected list, found dict");
}

#[test]
fn decode_none_array() {
    let mut dst = [1i64, 2, 3];
    decode(&Value::Null, &mut dst).unwrap();
    assert_eq!(dst, [1, 2, 3]);
}

#[test]
fn decode_array() {
    let mut dst = [0i64; 3];
    decode(&list(vec![int(1), int(2), int(3)]), &mut dst).unwrap();
    assert_eq!(dst, [1, 2, 3]);
}

#[test]
fn decode_array_length_mismatch() {
    let mut dst = [4i64, 5, 6];
    let err = decode(&list(vec![int(1), int(2)]), &mut dst).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::LengthMismatch {
            expected: 3,
            found: 2
        }
    ));
    assert_eq!(err.to_string(), "list size 2 != array size 3");
    assert_eq!(dst, [4, 5, 6]);
}

#[test]
fn decode_array_longer_list_is_also_mismatch() {
    let mut dst = [0u8; 1];
    let err = decode(&list(vec![int(1), int(2)]), &mut dst).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::LengthMismatch { .. }));
    assert_eq!(dst, [0]);
}

// ============================================================================
// Maps
// ============================================================================

#[test]
fn decode_none_map() {
    let mut dst: HashMap<String, i64> = [("one".to_string(), 1), ("two".to_string(), 2)].into();
    let before = dst.clone();
    decode(&Value::Null, &mut dst).unwrap();
    assert_eq!(dst, before);
}

#[test]
fn decode_map() {
    let mut dst: HashMap<String, i64> = HashMap::new();
    decode(&dict(vec![("one", int(1)), ("two", int(2))]), &mut dst).unwrap();
    let expected: HashMap<String, i64> = [("one".to_string(), 1), ("two".to_string(), 2)].into();
    assert_eq!(dst, expected);
}

#[test]
fn decode_map_replaces_previous_entries() {
    let mut dst: BTreeMap<String, i64> = [("stale".to_string(), 0)].into();
    decode(&dict(vec![("fresh", int(1))]), &mut dst).unwrap();
    assert_eq!(dst.keys().collect::<Vec<_>>(), vec!["fresh"]);
}

#[test]
fn decode_map_with_int_keys() {
    let source = Value::Dict(
        Dict::from_entries(vec![(int(1), string("a")), (int(2), string("b"))]).unwrap(),
    );
    let mut dst: BTreeMap<u8, String> = BTreeMap::new();
    decode(&source, &mut dst).unwrap();
    assert_eq!(dst.get(&1).map(String::as_str), Some("a"));
    assert_eq!(dst.get(&2).map(String::as_str), Some("b"));
}

#[test]
fn decode_map_error_names_key() {
    let mut dst: HashMap<String, i64> = HashMap::new();
    let err = decode(&dict(vec![("a", int(1)), ("b", string("x"))]), &mut dst).unwrap_err();
    assert_eq!(err.to_string(), r#"["b"]: expected int, found string"#);
    assert!(dst.is_empty());
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn decode_none_struct() {
    let mut dst = out_struct();
    decode(&Value::Null, &mut dst).unwrap();
    assert_eq!(dst, out_struct());
}

#[test]
fn decode_struct() {
    let source = make_struct(
        "test_struct",
        vec![
            ("x", int(1)),
            ("y", int(2)),
            ("l", list(vec![int(1), int(2)])),
            ("s", make_struct("sub_struct", vec![("s", string("meow"))])),
            ("p", make_struct("sub_struct", vec![("s", string("woof"))])),
        ],
    );
    let mut dst = TestStruct::default();
    decode(&source, &mut dst).unwrap();
    assert_eq!(dst, out_struct());
}

#[test]
fn decode_struct_from_map() {
    let source = dict(vec![
        ("x", int(1)),
        ("y", int(2)),
        ("l", list(vec![int(1), int(2)])),
        ("s", dict(vec![("s", string("meow"))])),
        ("p", dict(vec![("s", string("woof"))])),
    ]);
    let mut dst = TestStruct::default();
    decode(&source, &mut dst).unwrap();
    assert_eq!(dst, out_struct());
}

#[test]
fn decode_partial_keeps_absent_fields() {
    let mut dst = TestStruct {
        x: 1,
        y: 2,
        ..TestStruct::default()
    };
    decode(&dict(vec![("x", int(5))]), &mut dst).unwrap();
    assert_eq!((dst.x, dst.y), (5, 2));
}

#[test]
fn decode_ignores_private_fields() {
    let mut dst = TestStruct::default();
    decode(&dict(vec![("hidden", int(99)), ("x", int(1))]), &mut dst).unwrap();
    assert_eq!(dst.hidden, 0);
    assert_eq!(dst.x, 1);
}

#[test]
fn decode_ignores_unknown_source_fields() {
    let mut dst = SubStruct::default();
    decode(&dict(vec![("s", string("a")), ("extra", int(1))]), &mut dst).unwrap();
    assert_eq!(dst.s, "a");
}

#[test]
fn decode_struct_from_list_is_mismatch() {
    let mut dst = TestStruct::default();
    let err = decode(&list(vec![]), &mut dst).unwrap_err();
    assert_eq!(err.to_string(), "expected dict or struct, found list");
}

#[test]
fn decode_null_field_clears_option_only() {
    let mut dst = out_struct();
    decode(&dict(vec![("p", Value::Null), ("s", Value::Null), ("l", Value::Null)]), &mut dst)
        .unwrap();
    assert_eq!(dst.p, None);
    assert_eq!(dst.s, SubStruct { s: "meow".into() });
    assert_eq!(dst.l, vec![1, 2]);
}

#[test]
fn decode_error_path_is_nested() {
    let source = dict(vec![("s", dict(vec![("s", int(3))]))]);
    let mut dst = TestStruct::default();
    let err = decode(&source, &mut dst).unwrap_err();
    assert_eq!(err.path(), ".s.s");
    assert_eq!(err.to_string(), ".s.s: expected string, found int");
}

#[test]
fn decode_error_path_includes_index() {
    let source = dict(vec![("l", list(vec![int(1), string("oops")]))]);
    let mut dst = TestStruct::default();
    let err = decode(&source, &mut dst).unwrap_err();
    assert_eq!(err.to_string(), ".l[1]: expected int, found string");
}

#[test]
fn decode_stops_at_first_failing_field() {
    let source = dict(vec![("x", string("bad")), ("y", int(2))]);
    let mut dst = TestStruct::default();
    let err = decode(&source, &mut dst).unwrap_err();
    assert_eq!(err.path(), ".x");
    assert_eq!(dst.y, 0);
}

#[derive(Debug, Default, PartialEq, Record)]
pub struct Base {
    pub e: i64,
}

#[derive(Debug, Default, PartialEq, Record)]
pub struct WithEmbedded {
    #[starconv(embed)]
    base: Base,
    pub x: i64,
    #[starconv(skip)]
    pub cached: i64,
}

#[test]
fn decode_embedded_fields_are_promoted() {
    let mut dst = WithEmbedded::default();
    decode(
        &dict(vec![("e", int(4)), ("x", int(5)), ("cached", int(6))]),
        &mut dst,
    )
    .unwrap();
    assert_eq!(dst.base.e, 4);
    assert_eq!(dst.x, 5);
    assert_eq!(dst.cached, 0);
}

#[test]
fn decode_embedded_error_path_uses_member_name() {
    let mut dst = WithEmbedded::default();
    let err = decode(&dict(vec![("e", string("no"))]), &mut dst).unwrap_err();
    assert_eq!(err.path(), ".e");
}

#[derive(Debug, Default, PartialEq, Record)]
pub struct Inner {
    pub x: i64,
    pub z: i64,
}

#[derive(Debug, Default, PartialEq, Record)]
pub struct Outer {
    pub x: i64,
    #[starconv(embed)]
    inner: Inner,
}

#[test]
fn decode_outer_field_shadows_promoted_member() {
    let mut dst = Outer::default();
    decode(&make_struct("outer", vec![("x", int(5)), ("z", int(7))]), &mut dst).unwrap();
    assert_eq!(dst.x, 5);
    assert_eq!(dst.inner.x, 0);
    assert_eq!(dst.inner.z, 7);
}

#[derive(Debug, Default, PartialEq, Record)]
pub struct Deep {
    #[starconv(embed)]
    outer: Outer,
    pub z: i64,
}

#[test]
fn decode_shadowing_spans_nested_embeds() {
    let mut dst = Deep::default();
    decode(&dict(vec![("x", int(1)), ("z", int(2))]), &mut dst).unwrap();
    assert_eq!(dst.z, 2);
    assert_eq!(dst.outer.x, 1);
    assert_eq!(dst.outer.inner, Inner::default());
}

#[derive(Debug, Default, PartialEq, Record)]
pub struct Wrapper<T> {
    pub items: Vec<T>,
    pub first: Option<T>,
}

#[test]
fn decode_generic_record() {
    let mut dst: Wrapper<u8> = Wrapper::default();
    decode(
        &dict(vec![("items", list(vec![int(1), int(2)])), ("first", int(9))]),
        &mut dst,
    )
    .unwrap();
    assert_eq!(dst.items, vec![1, 2]);
    assert_eq!(dst.first, Some(9));
}

#[derive(Debug, Default, Record)]
pub struct Dynamic {
    pub payload: Value,
}

#[test]
fn decode_value_field_passes_through() {
    let payload = list(vec![int(1), string("two")]);
    let mut dst = Dynamic::default();
    decode(&dict(vec![("payload", payload.clone())]), &mut dst).unwrap();
    assert_eq!(dst.payload, payload);
}

// ============================================================================
// Options
// ============================================================================

#[derive(Debug, Default, Record)]
pub struct Camel {
    pub retry_count: i64,
}

#[test]
fn decode_uses_name_converter() {
    let opts = DecodeOptions::new()
        .with_name_converter(NameConverter::new(|name| name.to_uppercase()));
    let mut dst = Camel::default();
    decode_value(&dict(vec![("RETRY_COUNT", int(3))]), &mut dst, &opts).unwrap();
    assert_eq!(dst.retry_count, 3);
}

#[test]
fn decode_prefix_is_prepended_to_paths() {
    let opts = DecodeOptions::new().with_prefix("config");
    let mut dst = TestStruct::default();
    let err = decode_value(&dict(vec![("x", string("1"))]), &mut dst, &opts).unwrap_err();
    assert_eq!(err.to_string(), "config.x: expected int, found string");
}

#[test]
fn decode_value_hook_rewrites_values() {
    let opts = DecodeOptions::new().with_value_hook(|v| {
        Ok(match v {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other.clone(),
        })
    });
    let mut dst = TestStruct::default();
    decode_value(&dict(vec![("s", dict(vec![("s", string("meow"))]))]), &mut dst, &opts)
        .unwrap();
    assert_eq!(dst.s.s, "MEOW");
}

#[test]
fn decode_value_hook_can_substitute_null() {
    // Scripts may pass a sentinel string for "unset".
    let opts = DecodeOptions::new().with_value_hook(|v| {
        Ok(match v {
            Value::String(s) if s == "unset" => Value::Null,
            other => other.clone(),
        })
    });
    let mut dst: Option<String> = Some("old".into());
    decode_value(&string("unset"), &mut dst, &opts).unwrap();
    assert_eq!(dst, None);
}

#[test]
fn decode_value_hook_reenters_for_option_and_box_pointee() {
    let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let seen = calls.clone();
    let opts = DecodeOptions::new().with_value_hook(move |v| {
        seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(v.clone())
    });

    let mut opt: Option<i64> = None;
    decode_value(&int(3), &mut opt, &opts).unwrap();
    assert_eq!(opt, Some(3));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);

    let mut boxed = Box::new(0i64);
    decode_value(&int(4), &mut boxed, &opts).unwrap();
    assert_eq!(*boxed, 4);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 4);
}

#[test]
fn decode_value_hook_error_is_path_qualified() {
    let opts = DecodeOptions::new().with_value_hook(|v| match v {
        Value::Int(_) => Err(anyhow::anyhow!("ints are not allowed").into()),
        other => Ok(other.clone()),
    });
    let mut dst = TestStruct::default();
    let err = decode_value(&dict(vec![("y", int(2))]), &mut dst, &opts).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Hook(_)));
    assert_eq!(err.to_string(), ".y: convert: ints are not allowed");
    assert!(std::error::Error::source(&err).is_some());
}

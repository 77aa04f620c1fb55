#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value};

use dockyard_core::query::{build_query, Query};

/// 퍼저용 쿼리 값
#[derive(Arbitrary, Debug)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl From<FuzzValue> for Value {
    fn from(value: FuzzValue) -> Self {
        match value {
            FuzzValue::Null => Value::Null,
            FuzzValue::Bool(b) => Value::Bool(b),
            FuzzValue::Int(n) => Value::from(n),
            FuzzValue::Text(s) => Value::String(s),
            FuzzValue::List(items) => Value::from(items),
        }
    }
}

fuzz_target!(|params: Vec<(String, FuzzValue)>| {
    let map: Map<String, Value> = params
        .into_iter()
        .take(32)
        .map(|(k, v)| (k, Value::from(v)))
        .collect();

    let rendered = build_query(&map);
    // 빈 쿼리는 빈 문자열, 아니면 '?'로 시작
    assert!(rendered.is_empty() || rendered.starts_with('?'));

    let mut query = Query::new();
    query.extend_map(&map);
    assert_eq!(query.is_empty(), query.to_string().is_empty());
});

//! 쿼리 문자열 빌더
//!
//! 옵션 매핑을 URL 쿼리 문자열로 변환합니다.
//!
//! - null, 빈 문자열 값은 생략
//! - bool은 `true`/`false`, 숫자는 10진수
//! - 배열/객체는 JSON 인코딩 (`filters`, `buildargs`, `labels`)
//! - 키 순서는 삽입 순서를 유지
//!
//! ```
//! use dockyard_core::query::build_query;
//! use serde_json::json;
//!
//! let params = json!({"a": 1, "b": null, "c": "x"});
//! assert_eq!(build_query(params.as_object().unwrap()), "?a=1&c=x");
//! ```

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::{DockerError, Result};

/// 옵션 매핑을 쿼리 문자열로 변환합니다.
///
/// 남은 값이 없으면 빈 문자열, 있으면 `?`로 시작하는 문자열을 반환합니다.
pub fn build_query(params: &Map<String, Value>) -> String {
    let mut query = Query::new();
    query.extend_map(params);
    query.to_string()
}

/// 쿼리 파라미터 목록
///
/// 같은 키를 다시 설정하면 기존 값을 교체합니다.
/// 반복 키가 필요한 파라미터는 [`Query::push_repeated`]를 사용합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// 빈 쿼리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 직렬화 가능한 옵션 구조체에서 쿼리를 생성합니다.
    ///
    /// 구조체는 JSON 객체로 직렬화되어야 하며, 필드 이름이 그대로 키가 됩니다.
    pub fn from_options<T: Serialize + ?Sized>(options: &T) -> Result<Self> {
        let value = serde_json::to_value(options)
            .map_err(|e| DockerError::invalid("options", format!("cannot serialize: {e}")))?;
        match value {
            Value::Object(map) => {
                let mut query = Self::new();
                query.extend_map(&map);
                Ok(query)
            }
            Value::Null => Ok(Self::new()),
            _ => Err(DockerError::invalid("options", "must serialize to an object")),
        }
    }

    /// 파라미터를 추가합니다 (소비형 빌더).
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// 파라미터를 설정합니다.
    ///
    /// null이나 빈 문자열이면 아무것도 하지 않습니다.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        if let Some(encoded) = encode_value(&value.into()) {
            match self.pairs.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = encoded,
                None => self.pairs.push((key.to_owned(), encoded)),
            }
        }
        self
    }

    /// 같은 키로 여러 값을 추가합니다 (`names=a&names=b`).
    pub fn push_repeated<I, S>(&mut self, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            let value = value.into();
            if !value.is_empty() {
                self.pairs.push((key.to_owned(), value));
            }
        }
        self
    }

    /// 매핑의 모든 항목을 순서대로 추가합니다.
    pub fn extend_map(&mut self, params: &Map<String, Value>) -> &mut Self {
        for (key, value) in params {
            self.set(key, value.clone());
        }
        self
    }

    /// 다른 쿼리의 항목을 병합합니다.
    pub fn merge(&mut self, other: Query) -> &mut Self {
        for (key, value) in other.pairs {
            self.set(&key, value);
        }
        self
    }

    /// 키에 해당하는 첫 번째 값
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 항목 수
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// 인코딩 전 키/값 쌍
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pairs.is_empty() {
            return Ok(());
        }
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish();
        write!(f, "?{encoded}")
    }
}

fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn empty_params_give_empty_string() {
        assert_eq!(build_query(&Map::new()), "");
        assert_eq!(build_query(&obj(json!({"a": null, "b": ""}))), "");
    }

    #[test]
    fn null_values_are_skipped_in_order() {
        assert_eq!(
            build_query(&obj(json!({"a": 1, "b": null, "c": "x"}))),
            "?a=1&c=x"
        );
    }

    #[test]
    fn booleans_and_numbers_are_rendered_plainly() {
        assert_eq!(
            build_query(&obj(json!({"all": true, "size": false, "limit": 25}))),
            "?all=true&size=false&limit=25"
        );
    }

    #[test]
    fn collections_are_json_encoded() {
        let q = build_query(&obj(json!({"filters": {"status": ["running"]}})));
        assert_eq!(q, "?filters=%7B%22status%22%3A%5B%22running%22%5D%7D");
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let q = Query::new().param("fromImage", "registry:5000/app&x");
        assert_eq!(q.to_string(), "?fromImage=registry%3A5000%2Fapp%26x");
    }

    #[test]
    fn set_replaces_existing_key() {
        let mut q = Query::new();
        q.set("t", 10);
        q.set("t", 20);
        assert_eq!(q.len(), 1);
        assert_eq!(q.get("t"), Some("20"));
    }

    #[test]
    fn optional_values_follow_presence() {
        let none: Option<i64> = None;
        let q = Query::new().param("limit", none).param("tail", Some("100"));
        assert_eq!(q.to_string(), "?tail=100");
    }

    #[test]
    fn repeated_keys_for_lists() {
        let mut q = Query::new();
        q.push_repeated("names", ["alpine:3", "busybox", ""]);
        assert_eq!(q.to_string(), "?names=alpine%3A3&names=busybox");
    }

    #[test]
    fn from_options_uses_field_names() {
        #[derive(Serialize)]
        struct Opts {
            all: bool,
            limit: Option<u32>,
            #[serde(rename = "shared-size")]
            shared_size: bool,
        }
        let q = Query::from_options(&Opts {
            all: true,
            limit: None,
            shared_size: true,
        })
        .unwrap();
        assert_eq!(q.to_string(), "?all=true&shared-size=true");
    }

    #[test]
    fn from_options_rejects_non_objects() {
        let err = Query::from_options(&vec![1, 2]).unwrap_err();
        assert!(matches!(err, DockerError::InvalidParameter { .. }));
        assert!(Query::from_options(&()).unwrap().is_empty());
    }

    #[test]
    fn merge_keeps_first_position() {
        let mut q = Query::new().param("a", 1).param("b", 2);
        q.merge(Query::new().param("a", 3).param("c", 4));
        assert_eq!(q.to_string(), "?a=3&b=2&c=4");
    }
}

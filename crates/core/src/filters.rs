//! 목록/정리 엔드포인트 필터
//!
//! Docker는 `filters` 쿼리 파라미터에 `{"key": ["v1", "v2"]}` 형태의 JSON을
//! 받습니다. 엔드포인트마다 허용 키 목록과 일부 키의 허용 값이 다르므로
//! [`FilterRules`]로 요청 전에 검사합니다.
//!
//! ```
//! use dockyard_core::filters::{FilterRules, Filters};
//!
//! const NETWORK: FilterRules = FilterRules::new(&["driver", "name", "scope"])
//!     .with_enums(&[("scope", &["local", "global", "swarm"])]);
//!
//! let ok = Filters::new().add("scope", "local");
//! assert!(ok.validate(&NETWORK).is_ok());
//!
//! let bad = Filters::new().add("scope", "orbit");
//! assert!(bad.validate(&NETWORK).is_err());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DockerError, Result};
use crate::validate;

/// 엔드포인트별 필터 규칙
#[derive(Debug, Clone, Copy)]
pub struct FilterRules {
    keys: &'static [&'static str],
    enums: &'static [(&'static str, &'static [&'static str])],
}

impl FilterRules {
    /// 허용 키 목록으로 규칙을 생성합니다.
    pub const fn new(keys: &'static [&'static str]) -> Self {
        Self { keys, enums: &[] }
    }

    /// 값이 제한된 키를 지정합니다.
    pub const fn with_enums(
        self,
        enums: &'static [(&'static str, &'static [&'static str])],
    ) -> Self {
        Self {
            keys: self.keys,
            enums,
        }
    }

    /// 허용 키 목록
    pub fn keys(&self) -> &'static [&'static str] {
        self.keys
    }

    fn allowed_values(&self, key: &str) -> Option<&'static [&'static str]> {
        self.enums
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, values)| *values)
    }
}

/// 필터 집합 (키 → 값 목록)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<String, Vec<String>>);

impl Filters {
    /// 빈 필터를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 값을 추가합니다 (소비형 빌더).
    pub fn add(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// 값을 추가합니다.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.entry(key.into()).or_default().push(value.into());
        self
    }

    /// 키의 값 목록
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 키/값 목록 순회
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// JSON 값에서 필터를 해석합니다.
    ///
    /// Docker가 받는 두 형태를 모두 허용합니다.
    /// - `{"key": ["a", "b"]}`
    /// - `{"key": {"a": true, "b": true}}`
    ///
    /// 단일 문자열 값은 한 개짜리 목록으로 취급합니다.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(DockerError::invalid("filters", "must be a JSON object"));
        };
        let mut filters = Self::new();
        for (key, entry) in map {
            match entry {
                Value::String(s) => {
                    filters.insert(key.as_str(), s.as_str());
                }
                Value::Array(items) => {
                    for item in items {
                        let Some(s) = item.as_str() else {
                            return Err(DockerError::invalid(
                                "filters",
                                format!("values for '{key}' must be strings"),
                            ));
                        };
                        filters.insert(key.as_str(), s);
                    }
                }
                Value::Object(set) => {
                    for (item, enabled) in set {
                        if enabled.as_bool() == Some(true) {
                            filters.insert(key.as_str(), item.as_str());
                        }
                    }
                }
                _ => {
                    return Err(DockerError::invalid(
                        "filters",
                        format!("values for '{key}' must be a string, list or set"),
                    ));
                }
            }
        }
        Ok(filters)
    }

    /// 규칙에 맞는지 검사합니다.
    ///
    /// 허용되지 않은 키나 허용 값 밖의 값은 `InvalidParameter`입니다.
    pub fn validate(&self, rules: &FilterRules) -> Result<()> {
        for (key, values) in &self.0 {
            if !rules.keys.contains(&key.as_str()) {
                validate::require_enum(Some(key.as_str()), rules.keys, "filters")?;
            }
            if let Some(allowed) = rules.allowed_values(key) {
                for value in values {
                    validate::require_enum(Some(value.as_str()), allowed, key)?;
                }
            }
        }
        Ok(())
    }

    /// `filters` 쿼리 파라미터 값 (비어 있으면 `None`)
    pub fn to_query_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        serde_json::to_string(&self.0).ok()
    }
}

impl<K, V> FromIterator<(K, V)> for Filters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Self::new();
        for (k, v) in iter {
            filters.insert(k, v);
        }
        filters
    }
}

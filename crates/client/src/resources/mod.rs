//! 리소스별 클라이언트
//!
//! 각 클라이언트는 엔드포인트마다 async 메서드 하나를 제공합니다.
//! 모든 메서드는 같은 순서를 따릅니다.
//!
//! 1. 파라미터 검증 (실패 시 네트워크 호출 없음)
//! 2. 쿼리/본문 구성
//! 3. [`ApiClient`](crate::api::ApiClient) 호출
//! 4. JSON / 문자열 / 스트림으로 디코딩

pub mod configs;
pub mod containers;
pub mod exec;
pub mod images;
pub mod networks;
pub mod nodes;
pub mod plugins;
pub mod secrets;
pub mod services;
pub mod swarm;
pub mod system;
pub mod tasks;
pub mod volumes;

use dockyard_core::auth::{REGISTRY_AUTH_HEADER, RegistryAuth};
use dockyard_core::error::Result;
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::query::Query;
use dockyard_core::validate;
use serde_json::{Map, Value};

use crate::transport::ApiRequest;

/// 리소스 클라이언트 구조체와 공통 impl을 생성합니다.
macro_rules! resource_client {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<T: $crate::transport::Transport = $crate::transport::HttpTransport> {
            api: $crate::api::ApiClient<T>,
        }

        impl<T: $crate::transport::Transport> Clone for $name<T> {
            fn clone(&self) -> Self {
                Self {
                    api: self.api.clone(),
                }
            }
        }

        impl<T: $crate::transport::Transport> std::fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name)).finish_non_exhaustive()
            }
        }

        impl<T: $crate::transport::Transport> $name<T> {
            pub(crate) fn new(api: $crate::api::ApiClient<T>) -> Self {
                Self { api }
            }
        }
    };
}

pub(crate) use resource_client;

/// 필터를 검증하고 `filters` 쿼리 파라미터로 추가합니다.
pub(crate) fn apply_filters(query: &mut Query, filters: &Filters, rules: &FilterRules) -> Result<()> {
    filters.validate(rules)?;
    if let Some(encoded) = filters.to_query_value() {
        query.set("filters", encoded);
    }
    Ok(())
}

/// 필터만 담은 쿼리
pub(crate) fn filter_query(filters: &Filters, rules: &FilterRules) -> Result<Query> {
    let mut query = Query::new();
    apply_filters(&mut query, filters, rules)?;
    Ok(query)
}

/// `?version=<index>` 쿼리
pub(crate) fn versioned(version: u64) -> Query {
    Query::new().param("version", version)
}

/// 레지스트리 인증 헤더를 붙입니다.
pub(crate) fn with_auth(request: ApiRequest, auth: Option<&RegistryAuth>) -> Result<ApiRequest> {
    match auth {
        Some(auth) => Ok(request.header(REGISTRY_AUTH_HEADER, auth.header_value()?)),
        None => Ok(request),
    }
}

/// 객체 필드가 비어 있지 않은 문자열인지 검사합니다.
pub(crate) fn require_str_field(payload: &Map<String, Value>, field: &str) -> Result<()> {
    validate::require_string(payload.get(field).and_then(Value::as_str), field)
}

/// 경로 세그먼트용 인코딩
///
/// 이미지 참조의 `/`는 Docker 라우터가 그대로 받아들이므로 남겨 둡니다.
pub(crate) fn path_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' | b':'
            | b'@' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockyard_core::error::DockerError;

    const RULES: FilterRules = FilterRules::new(&["label", "name"]);

    #[test]
    fn filters_are_json_encoded_into_query() {
        let query = filter_query(&Filters::new().add("name", "web"), &RULES).unwrap();
        assert_eq!(query.get("filters"), Some(r#"{"name":["web"]}"#));
    }

    #[test]
    fn empty_filters_add_nothing() {
        assert!(filter_query(&Filters::new(), &RULES).unwrap().is_empty());
    }

    #[test]
    fn unknown_filter_key_is_rejected() {
        let err = filter_query(&Filters::new().add("colour", "red"), &RULES).unwrap_err();
        assert!(matches!(err, DockerError::InvalidParameter { ref name, .. } if name == "filters"));
    }

    #[test]
    fn versioned_query() {
        assert_eq!(versioned(42).to_string(), "?version=42");
    }

    #[test]
    fn auth_header_is_attached_only_when_given() {
        let plain = with_auth(ApiRequest::post("/images/create"), None).unwrap();
        assert!(plain.header_value(REGISTRY_AUTH_HEADER).is_none());

        let auth = RegistryAuth::password("ci", "s3cret");
        let signed = with_auth(ApiRequest::post("/images/create"), Some(&auth)).unwrap();
        let header = signed.header_value(REGISTRY_AUTH_HEADER).unwrap();
        assert_eq!(RegistryAuth::from_header(header).unwrap(), auth);
    }

    #[test]
    fn path_segment_keeps_reference_characters() {
        assert_eq!(
            path_segment("registry:5000/team/app:v1"),
            "registry:5000/team/app:v1"
        );
        assert_eq!(path_segment("a b?c"), "a%20b%3Fc");
    }
}

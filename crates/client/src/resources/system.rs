//! 시스템 엔드포인트 (`/auth`, `/info`, `/version`, `/_ping`, `/events`, `/system/df`)

use dockyard_core::body::RequestBody;
use dockyard_core::error::{DockerError, Result};
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::query::Query;
use dockyard_core::validate;
use dockyard_core::RegistryAuth;
use serde::Serialize;
use serde_json::Value;

use super::{apply_filters, resource_client};
use crate::response::ByteStream;
use crate::transport::{ApiRequest, Transport};

pub const EVENT_FILTERS: FilterRules = FilterRules::new(&[
    "config", "container", "daemon", "event", "image", "label", "network", "node", "plugin",
    "scope", "secret", "service", "type", "volume",
])
.with_enums(&[
    ("scope", &["local", "swarm"]),
    (
        "type",
        &[
            "container", "image", "volume", "network", "daemon", "plugin", "node", "service",
            "secret", "config",
        ],
    ),
]);

const DATA_USAGE_TYPES: &[&str] = &["container", "image", "volume", "build-cache"];

/// `events` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventsOptions {
    /// 타임스탬프 또는 상대 시간 (`10m`)
    pub since: Option<String>,
    pub until: Option<String>,
    #[serde(skip)]
    pub filters: Filters,
}

resource_client!(
    /// 시스템 클라이언트
    System
);

impl<T: Transport> System<T> {
    /// 레지스트리 자격 증명 확인. 응답에 `IdentityToken`이 올 수 있습니다.
    pub async fn auth(&self, credentials: &RegistryAuth) -> Result<Value> {
        let has_password = credentials.username.is_some() && credentials.password.is_some();
        if !has_password && credentials.identitytoken.is_none() {
            return Err(DockerError::invalid(
                "username",
                "username and password, or an identity token, are required",
            ));
        }
        let request = ApiRequest::post("/auth").body(RequestBody::json(credentials)?);
        self.api.json(request).await
    }

    pub async fn info(&self) -> Result<Value> {
        self.api.json(ApiRequest::get("/info")).await
    }

    pub async fn version(&self) -> Result<Value> {
        self.api.json(ApiRequest::get("/version")).await
    }

    /// `GET /_ping`. 정상이면 `"OK"`입니다.
    pub async fn ping(&self) -> Result<String> {
        self.api.text(ApiRequest::get("/_ping")).await
    }

    /// `HEAD /_ping`. 응답 헤더 (`Api-Version`, `Docker-Experimental` 등)를 JSON 객체로 반환합니다.
    pub async fn ping_head(&self) -> Result<Value> {
        let response = self.api.request(ApiRequest::head("/_ping")).await?;
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), Value::String(v.to_owned())))
            })
            .collect();
        Ok(Value::Object(headers))
    }

    /// 실시간 이벤트 스트림 (줄 단위 JSON)
    pub async fn events(&self, options: &EventsOptions) -> Result<ByteStream> {
        let mut query = Query::from_options(options)?;
        apply_filters(&mut query, &options.filters, &EVENT_FILTERS)?;
        self.api.stream(ApiRequest::get("/events").query(query)).await
    }

    /// 디스크 사용량. `types`가 비어 있으면 모든 종류를 조회합니다.
    pub async fn data_usage(&self, types: &[&str]) -> Result<Value> {
        for kind in types {
            validate::require_enum(Some(*kind), DATA_USAGE_TYPES, "type")?;
        }
        let mut query = Query::new();
        query.push_repeated("type", types.iter().copied());
        self.api.json(ApiRequest::get("/system/df").query(query)).await
    }
}

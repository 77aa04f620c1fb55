//! 서비스 엔드포인트 (`/services/*`)

use dockyard_core::auth::RegistryAuth;
use dockyard_core::body::RequestBody;
use dockyard_core::error::{DockerError, Result};
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::query::Query;
use dockyard_core::validate;
use serde::Serialize;
use serde_json::Value;

use super::{apply_filters, path_segment, resource_client, versioned, with_auth};
use crate::response::ByteStream;
use crate::transport::{ApiRequest, Transport};

pub const LIST_FILTERS: FilterRules = FilterRules::new(&["id", "label", "mode", "name"])
    .with_enums(&[("mode", &["replicated", "global"])]);

const REGISTRY_AUTH_FROM: &[&str] = &["spec", "previous-spec"];
const ROLLBACK: &[&str] = &["previous"];

/// 서비스/태스크 `logs` 옵션
///
/// `stdout`, `stderr` 중 하나는 켜야 합니다.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceLogsOptions {
    /// 로그 속성 (환경변수, 레이블) 포함
    pub details: Option<bool>,
    pub follow: Option<bool>,
    pub stdout: Option<bool>,
    pub stderr: Option<bool>,
    pub since: Option<i64>,
    pub timestamps: Option<bool>,
    pub tail: Option<String>,
}

impl ServiceLogsOptions {
    /// stdout과 stderr를 모두 받는 옵션
    pub fn all_output() -> Self {
        Self {
            stdout: Some(true),
            stderr: Some(true),
            ..Self::default()
        }
    }

    pub(crate) fn to_query(&self) -> Result<Query> {
        if self.stdout != Some(true) && self.stderr != Some(true) {
            return Err(DockerError::invalid(
                "stdout",
                "at least one of stdout or stderr must be enabled",
            ));
        }
        Query::from_options(self)
    }
}

/// `update` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceUpdateOptions {
    /// 레지스트리 인증을 어디서 가져올지 (`spec`, `previous-spec`)
    #[serde(rename = "registryAuthFrom")]
    pub registry_auth_from: Option<String>,
    /// `previous`면 이전 spec으로 되돌림
    pub rollback: Option<String>,
}

fn require_task_template(spec: &Value) -> Result<()> {
    validate::require_object(spec, "spec")?;
    let template = spec.get("TaskTemplate").unwrap_or(&Value::Null);
    if !template.is_object() {
        return Err(DockerError::invalid("TaskTemplate", "is required"));
    }
    if let Some(name) = spec.get("Name").and_then(Value::as_str) {
        validate::require_id(name, "Name")?;
    }
    Ok(())
}

resource_client!(
    /// swarm 서비스 클라이언트
    Services
);

impl<T: Transport> Services<T> {
    fn path(id: &str) -> String {
        format!("/services/{}", path_segment(id))
    }

    /// 서비스 목록. `status`면 실행/목표 태스크 수를 포함합니다.
    pub async fn list(&self, filters: &Filters, status: bool) -> Result<Value> {
        let mut query = Query::new().param("status", status.then_some(true));
        apply_filters(&mut query, filters, &LIST_FILTERS)?;
        self.api.json(ApiRequest::get("/services").query(query)).await
    }

    /// 서비스 생성. 응답은 `{"ID": .., "Warnings": ..}`입니다.
    pub async fn create(&self, spec: Value, auth: Option<&RegistryAuth>) -> Result<Value> {
        require_task_template(&spec)?;
        let request = ApiRequest::post("/services/create").body(RequestBody::Json(spec));
        self.api.json(with_auth(request, auth)?).await
    }

    pub async fn inspect(&self, id: &str, insert_defaults: bool) -> Result<Value> {
        validate::require_id(id, "id")?;
        let query = Query::new().param("insertDefaults", insert_defaults.then_some(true));
        self.api.json(ApiRequest::get(Self::path(id)).query(query)).await
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        validate::require_id(id, "id")?;
        self.api.empty(ApiRequest::delete(Self::path(id))).await
    }

    /// 서비스 spec 변경. `version`은 현재 `Version.Index`입니다.
    pub async fn update(
        &self,
        id: &str,
        version: u64,
        spec: Value,
        options: &ServiceUpdateOptions,
        auth: Option<&RegistryAuth>,
    ) -> Result<Value> {
        validate::require_id(id, "id")?;
        require_task_template(&spec)?;
        validate::require_enum(
            options.registry_auth_from.as_deref(),
            REGISTRY_AUTH_FROM,
            "registryAuthFrom",
        )?;
        validate::require_enum(options.rollback.as_deref(), ROLLBACK, "rollback")?;

        let mut query = versioned(version);
        query.merge(Query::from_options(options)?);
        let request = ApiRequest::post(format!("{}/update", Self::path(id)))
            .query(query)
            .body(RequestBody::Json(spec));
        self.api.json(with_auth(request, auth)?).await
    }

    /// 서비스 로그 스트림
    pub async fn logs(&self, id: &str, options: &ServiceLogsOptions) -> Result<ByteStream> {
        validate::require_id(id, "id")?;
        let request = ApiRequest::get(format!("{}/logs", Self::path(id))).query(options.to_query()?);
        self.api.stream(request).await
    }
}

//! 플러그인 엔드포인트 (`/plugins/*`)

use bytes::Bytes;
use dockyard_core::auth::RegistryAuth;
use dockyard_core::body::RequestBody;
use dockyard_core::error::{DockerError, Result};
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::query::Query;
use dockyard_core::validate;
use serde_json::Value;

use super::{filter_query, path_segment, resource_client, with_auth};
use crate::response::ByteStream;
use crate::transport::{ApiRequest, Transport};

pub const LIST_FILTERS: FilterRules = FilterRules::new(&["capability", "enable"])
    .with_enums(&[("enable", &["true", "false"])]);

/// 권한 목록은 `privileges` 응답을 그대로 돌려보내는 배열이어야 합니다.
fn require_privileges(privileges: &Value) -> Result<()> {
    if !privileges.is_array() {
        return Err(DockerError::invalid("privileges", "must be an array"));
    }
    validate::require_array(privileges, "privileges", true)
}

resource_client!(
    /// 플러그인 클라이언트
    Plugins
);

impl<T: Transport> Plugins<T> {
    fn path(name: &str, action: &str) -> String {
        format!("/plugins/{}/{action}", path_segment(name))
    }

    pub async fn list(&self, filters: &Filters) -> Result<Value> {
        let query = filter_query(filters, &LIST_FILTERS)?;
        self.api.json(ApiRequest::get("/plugins").query(query)).await
    }

    /// 설치 전에 플러그인이 요구하는 권한 목록
    pub async fn privileges(&self, remote: &str) -> Result<Value> {
        validate::require_reference(remote, "remote")?;
        let query = Query::new().param("remote", remote);
        self.api
            .json(ApiRequest::get("/plugins/privileges").query(query))
            .await
    }

    /// 플러그인을 내려받아 설치합니다.
    pub async fn pull(
        &self,
        remote: &str,
        name: Option<&str>,
        privileges: Value,
        auth: Option<&RegistryAuth>,
    ) -> Result<ByteStream> {
        validate::require_reference(remote, "remote")?;
        if let Some(name) = name {
            validate::require_reference(name, "name")?;
        }
        require_privileges(&privileges)?;
        let request = ApiRequest::post("/plugins/pull")
            .query(Query::new().param("remote", remote).param("name", name))
            .body(RequestBody::Json(privileges));
        self.api.stream(with_auth(request, auth)?).await
    }

    pub async fn inspect(&self, name: &str) -> Result<Value> {
        validate::require_reference(name, "name")?;
        self.api.json(ApiRequest::get(Self::path(name, "json"))).await
    }

    /// 플러그인 삭제. 응답은 삭제된 플러그인 정보입니다.
    pub async fn remove(&self, name: &str, force: bool) -> Result<Value> {
        validate::require_reference(name, "name")?;
        let query = Query::new().param("force", force.then_some(true));
        let request = ApiRequest::delete(format!("/plugins/{}", path_segment(name))).query(query);
        self.api.json(request).await
    }

    /// 활성화. `timeout`은 초 단위입니다.
    pub async fn enable(&self, name: &str, timeout: Option<i64>) -> Result<()> {
        validate::require_reference(name, "name")?;
        validate::require_int_range(timeout, "timeout", Some(0), None)?;
        let query = Query::new().param("timeout", timeout);
        self.api
            .empty(ApiRequest::post(Self::path(name, "enable")).query(query))
            .await
    }

    pub async fn disable(&self, name: &str, force: bool) -> Result<()> {
        validate::require_reference(name, "name")?;
        let query = Query::new().param("force", force.then_some(true));
        self.api
            .empty(ApiRequest::post(Self::path(name, "disable")).query(query))
            .await
    }

    /// 설치된 플러그인을 새 원격 참조로 업그레이드합니다. 플러그인은 비활성 상태여야 합니다.
    pub async fn upgrade(
        &self,
        name: &str,
        remote: &str,
        privileges: Value,
        auth: Option<&RegistryAuth>,
    ) -> Result<ByteStream> {
        validate::require_reference(name, "name")?;
        validate::require_reference(remote, "remote")?;
        require_privileges(&privileges)?;
        let request = ApiRequest::post(Self::path(name, "upgrade"))
            .query(Query::new().param("remote", remote))
            .body(RequestBody::Json(privileges));
        self.api.stream(with_auth(request, auth)?).await
    }

    /// `rootfs`와 `config.json`을 담은 tar로 플러그인을 만듭니다.
    pub async fn create(&self, name: &str, archive: impl Into<Bytes>) -> Result<()> {
        validate::require_reference(name, "name")?;
        let archive = archive.into();
        if archive.is_empty() {
            return Err(DockerError::invalid("archive", "must not be empty"));
        }
        let request = ApiRequest::post("/plugins/create")
            .query(Query::new().param("name", name))
            .body(RequestBody::tar(archive));
        self.api.empty(request).await
    }

    /// 레지스트리로 push 합니다.
    pub async fn push(&self, name: &str, auth: Option<&RegistryAuth>) -> Result<ByteStream> {
        validate::require_reference(name, "name")?;
        let request = ApiRequest::post(Self::path(name, "push"));
        self.api.stream(with_auth(request, auth)?).await
    }

    /// 설정 변경. 각 항목은 `KEY=value` 형식입니다.
    pub async fn set(&self, name: &str, settings: &[&str]) -> Result<()> {
        validate::require_reference(name, "name")?;
        for setting in settings {
            match setting.split_once('=') {
                Some((key, _)) if !key.is_empty() => {}
                _ => {
                    return Err(DockerError::invalid(
                        "settings",
                        format!("'{setting}' must look like KEY=value"),
                    ));
                }
            }
        }
        let request =
            ApiRequest::post(Self::path(name, "set")).body(RequestBody::json(settings)?);
        self.api.empty(request).await
    }
}

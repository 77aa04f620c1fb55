//! 네트워크 엔드포인트 (`/networks/*`)

use dockyard_core::body::RequestBody;
use dockyard_core::error::Result;
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::query::Query;
use dockyard_core::validate;
use serde_json::Value;

use super::{filter_query, path_segment, require_str_field, resource_client};
use crate::transport::{ApiRequest, Transport};

pub const LIST_FILTERS: FilterRules =
    FilterRules::new(&["driver", "id", "label", "name", "scope", "type"]).with_enums(&[
        ("scope", &["local", "global", "swarm"]),
        ("type", &["custom", "builtin"]),
    ]);

pub const PRUNE_FILTERS: FilterRules = FilterRules::new(&["until", "label"]);

const INSPECT_SCOPES: &[&str] = &["local", "global", "swarm"];

resource_client!(
    /// 네트워크 클라이언트
    Networks
);

impl<T: Transport> Networks<T> {
    fn path(id: &str) -> String {
        format!("/networks/{}", path_segment(id))
    }

    pub async fn list(&self, filters: &Filters) -> Result<Value> {
        let query = filter_query(filters, &LIST_FILTERS)?;
        self.api.json(ApiRequest::get("/networks").query(query)).await
    }

    /// 네트워크 상세 정보
    ///
    /// `verbose`는 swarm 네트워크의 서비스/태스크 정보를 포함합니다.
    pub async fn inspect(&self, id: &str, verbose: bool, scope: Option<&str>) -> Result<Value> {
        validate::require_id(id, "id")?;
        validate::require_enum(scope, INSPECT_SCOPES, "scope")?;
        let query = Query::new()
            .param("verbose", verbose.then_some(true))
            .param("scope", scope);
        self.api.json(ApiRequest::get(Self::path(id)).query(query)).await
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        validate::require_id(id, "id")?;
        self.api.empty(ApiRequest::delete(Self::path(id))).await
    }

    /// 네트워크 생성. `Name`이 필요합니다.
    pub async fn create(&self, config: Value) -> Result<Value> {
        validate::require_object(&config, "config")?;
        if let Some(map) = config.as_object() {
            require_str_field(map, "Name")?;
        }
        let request = ApiRequest::post("/networks/create").body(RequestBody::Json(config));
        self.api.json(request).await
    }

    /// 컨테이너를 네트워크에 연결합니다. `Container`가 필요합니다.
    pub async fn connect(&self, id: &str, config: Value) -> Result<()> {
        self.attach_container(id, "connect", config).await
    }

    /// 컨테이너를 네트워크에서 분리합니다. `Container`가 필요합니다.
    pub async fn disconnect(&self, id: &str, config: Value) -> Result<()> {
        self.attach_container(id, "disconnect", config).await
    }

    async fn attach_container(&self, id: &str, action: &str, config: Value) -> Result<()> {
        validate::require_id(id, "id")?;
        validate::require_object(&config, "config")?;
        if let Some(map) = config.as_object() {
            require_str_field(map, "Container")?;
        }
        let request = ApiRequest::post(format!("{}/{action}", Self::path(id)))
            .body(RequestBody::Json(config));
        self.api.empty(request).await
    }

    /// 사용하지 않는 네트워크 정리
    pub async fn prune(&self, filters: &Filters) -> Result<Value> {
        let query = filter_query(filters, &PRUNE_FILTERS)?;
        self.api.json(ApiRequest::post("/networks/prune").query(query)).await
    }
}

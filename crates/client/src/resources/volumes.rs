//! 볼륨 엔드포인트 (`/volumes/*`)

use dockyard_core::body::RequestBody;
use dockyard_core::error::Result;
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::query::Query;
use dockyard_core::validate;
use serde_json::{Map, Value};

use super::{filter_query, path_segment, resource_client, versioned};
use crate::transport::{ApiRequest, Transport};

pub const LIST_FILTERS: FilterRules = FilterRules::new(&["dangling", "driver", "label", "name"])
    .with_enums(&[("dangling", &["true", "false", "1", "0"])]);

pub const PRUNE_FILTERS: FilterRules = FilterRules::new(&["label", "all"]);

resource_client!(
    /// 볼륨 클라이언트
    Volumes
);

impl<T: Transport> Volumes<T> {
    fn path(name: &str) -> String {
        format!("/volumes/{}", path_segment(name))
    }

    /// 볼륨 목록. 응답은 `{"Volumes": [..], "Warnings": [..]}`입니다.
    pub async fn list(&self, filters: &Filters) -> Result<Value> {
        let query = filter_query(filters, &LIST_FILTERS)?;
        self.api.json(ApiRequest::get("/volumes").query(query)).await
    }

    /// 볼륨 생성. 빈 객체를 넘기면 데몬이 이름을 정합니다.
    pub async fn create(&self, config: Option<Value>) -> Result<Value> {
        let body = config.unwrap_or_else(|| Value::Object(Map::new()));
        validate::require_object(&body, "config")?;
        if let Some(name) = body.get("Name").and_then(Value::as_str) {
            validate::require_id(name, "Name")?;
        }
        let request = ApiRequest::post("/volumes/create").body(RequestBody::Json(body));
        self.api.json(request).await
    }

    pub async fn inspect(&self, name: &str) -> Result<Value> {
        validate::require_id(name, "name")?;
        self.api.json(ApiRequest::get(Self::path(name))).await
    }

    /// 클러스터 볼륨 수정 (swarm 전용)
    ///
    /// `version`은 현재 `Version.Index`입니다.
    pub async fn update(&self, name: &str, version: u64, spec: Value) -> Result<()> {
        validate::require_id(name, "name")?;
        validate::require_object(&spec, "spec")?;
        let request = ApiRequest::put(Self::path(name))
            .query(versioned(version))
            .body(RequestBody::Json(spec));
        self.api.empty(request).await
    }

    pub async fn remove(&self, name: &str, force: bool) -> Result<()> {
        validate::require_id(name, "name")?;
        let query = Query::new().param("force", force.then_some(true));
        self.api
            .empty(ApiRequest::delete(Self::path(name)).query(query))
            .await
    }

    /// 사용하지 않는 볼륨 정리
    pub async fn prune(&self, filters: &Filters) -> Result<Value> {
        let query = filter_query(filters, &PRUNE_FILTERS)?;
        self.api.json(ApiRequest::post("/volumes/prune").query(query)).await
    }
}

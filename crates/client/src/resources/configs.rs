//! 설정 객체 엔드포인트 (`/configs/*`)

use dockyard_core::body::RequestBody;
use dockyard_core::error::Result;
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::validate;
use serde_json::Value;

use super::{filter_query, path_segment, require_str_field, resource_client, versioned};
use crate::transport::{ApiRequest, Transport};

pub const LIST_FILTERS: FilterRules = FilterRules::new(&["id", "label", "name", "names"]);

resource_client!(
    /// swarm config 클라이언트
    Configs
);

impl<T: Transport> Configs<T> {
    fn path(id: &str) -> String {
        format!("/configs/{}", path_segment(id))
    }

    pub async fn list(&self, filters: &Filters) -> Result<Value> {
        let query = filter_query(filters, &LIST_FILTERS)?;
        self.api.json(ApiRequest::get("/configs").query(query)).await
    }

    /// config 생성. `Name`과 base64로 인코딩된 `Data`가 필요합니다.
    pub async fn create(&self, spec: Value) -> Result<Value> {
        validate::require_object(&spec, "spec")?;
        if let Some(map) = spec.as_object() {
            require_str_field(map, "Name")?;
            require_str_field(map, "Data")?;
            let data = map.get("Data").and_then(Value::as_str).unwrap_or_default();
            validate::require_base64(data, "Data")?;
        }
        let request = ApiRequest::post("/configs/create").body(RequestBody::Json(spec));
        self.api.json(request).await
    }

    pub async fn inspect(&self, id: &str) -> Result<Value> {
        validate::require_id(id, "id")?;
        self.api.json(ApiRequest::get(Self::path(id))).await
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        validate::require_id(id, "id")?;
        self.api.empty(ApiRequest::delete(Self::path(id))).await
    }

    /// 레이블만 변경할 수 있습니다. `Data`가 있으면 거부합니다.
    pub async fn update(&self, id: &str, version: u64, spec: Value) -> Result<()> {
        validate::require_id(id, "id")?;
        validate::require_object(&spec, "spec")?;
        validate::reject_field(&spec, "Data", "Data")?;
        let request = ApiRequest::post(format!("{}/update", Self::path(id)))
            .query(versioned(version))
            .body(RequestBody::Json(spec));
        self.api.empty(request).await
    }
}

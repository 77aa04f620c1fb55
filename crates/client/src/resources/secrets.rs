//! 시크릿 엔드포인트 (`/secrets/*`)

use dockyard_core::body::RequestBody;
use dockyard_core::error::Result;
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::validate;
use serde_json::Value;

use super::{filter_query, path_segment, require_str_field, resource_client, versioned};
use crate::transport::{ApiRequest, Transport};

pub const LIST_FILTERS: FilterRules = FilterRules::new(&["id", "label", "name", "names"]);

resource_client!(
    /// swarm 시크릿 클라이언트
    Secrets
);

impl<T: Transport> Secrets<T> {
    fn path(id: &str) -> String {
        format!("/secrets/{}", path_segment(id))
    }

    pub async fn list(&self, filters: &Filters) -> Result<Value> {
        let query = filter_query(filters, &LIST_FILTERS)?;
        self.api.json(ApiRequest::get("/secrets").query(query)).await
    }

    /// 시크릿 생성. 응답은 `{"ID": ..}`입니다.
    ///
    /// `Data`는 이미 base64로 인코딩되어 있어야 합니다.
    /// 외부 `Driver`가 값을 제공하는 경우에만 `Data`를 생략할 수 있습니다.
    pub async fn create(&self, spec: Value) -> Result<Value> {
        validate::require_object(&spec, "spec")?;
        if let Some(map) = spec.as_object() {
            require_str_field(map, "Name")?;
            if map.contains_key("Data") || !map.contains_key("Driver") {
                require_str_field(map, "Data")?;
                let data = map.get("Data").and_then(Value::as_str).unwrap_or_default();
                validate::require_base64(data, "Data")?;
            }
        }
        let request = ApiRequest::post("/secrets/create").body(RequestBody::Json(spec));
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

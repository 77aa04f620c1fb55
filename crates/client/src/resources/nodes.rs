//! 노드 엔드포인트 (`/nodes/*`)

use dockyard_core::body::RequestBody;
use dockyard_core::error::Result;
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::query::Query;
use dockyard_core::validate;
use serde_json::Value;

use super::{filter_query, path_segment, resource_client, versioned};
use crate::transport::{ApiRequest, Transport};

pub const LIST_FILTERS: FilterRules =
    FilterRules::new(&["id", "label", "membership", "name", "node.label", "role"]).with_enums(&[
        ("membership", &["accepted", "pending"]),
        ("role", &["manager", "worker"]),
    ]);

const ROLES: &[&str] = &["worker", "manager"];
const AVAILABILITY: &[&str] = &["active", "pause", "drain"];

resource_client!(
    /// swarm 노드 클라이언트
    Nodes
);

impl<T: Transport> Nodes<T> {
    fn path(id: &str) -> String {
        format!("/nodes/{}", path_segment(id))
    }

    pub async fn list(&self, filters: &Filters) -> Result<Value> {
        let query = filter_query(filters, &LIST_FILTERS)?;
        self.api.json(ApiRequest::get("/nodes").query(query)).await
    }

    pub async fn inspect(&self, id: &str) -> Result<Value> {
        validate::require_id(id, "id")?;
        self.api.json(ApiRequest::get(Self::path(id))).await
    }

    pub async fn remove(&self, id: &str, force: bool) -> Result<()> {
        validate::require_id(id, "id")?;
        let query = Query::new().param("force", force.then_some(true));
        self.api
            .empty(ApiRequest::delete(Self::path(id)).query(query))
            .await
    }

    /// 노드 spec 변경 (`Role`, `Availability`, `Labels`)
    ///
    /// `version`은 현재 `Version.Index`입니다.
    pub async fn update(&self, id: &str, version: u64, spec: Value) -> Result<()> {
        validate::require_id(id, "id")?;
        validate::require_object(&spec, "spec")?;
        validate::require_enum(spec.get("Role").and_then(Value::as_str), ROLES, "Role")?;
        validate::require_enum(
            spec.get("Availability").and_then(Value::as_str),
            AVAILABILITY,
            "Availability",
        )?;
        let request = ApiRequest::post(format!("{}/update", Self::path(id)))
            .query(versioned(version))
            .body(RequestBody::Json(spec));
        self.api.empty(request).await
    }
}

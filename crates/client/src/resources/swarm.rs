//! swarm 엔드포인트 (`/swarm/*`)

use dockyard_core::body::RequestBody;
use dockyard_core::error::{DockerError, Result};
use dockyard_core::query::Query;
use dockyard_core::validate;
use serde::Serialize;
use serde_json::{Value, json};

use super::{resource_client, versioned};
use crate::transport::{ApiRequest, Transport};

/// `update` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct SwarmUpdateOptions {
    #[serde(rename = "rotateWorkerToken")]
    pub rotate_worker_token: Option<bool>,
    #[serde(rename = "rotateManagerToken")]
    pub rotate_manager_token: Option<bool>,
    #[serde(rename = "rotateManagerUnlockKey")]
    pub rotate_manager_unlock_key: Option<bool>,
}

resource_client!(
    /// swarm 클라이언트
    Swarm
);

impl<T: Transport> Swarm<T> {
    /// swarm 정보 (`JoinTokens`, `Version.Index` 포함)
    pub async fn inspect(&self) -> Result<Value> {
        self.api.json(ApiRequest::get("/swarm")).await
    }

    /// 새 swarm을 만듭니다. 응답은 노드 ID 문자열입니다.
    pub async fn init(&self, config: Value) -> Result<Value> {
        validate::require_object(&config, "config")?;
        if let Some(addr) = config.get("ListenAddr") {
            validate::require_string(addr.as_str(), "ListenAddr")?;
        }
        let request = ApiRequest::post("/swarm/init").body(RequestBody::Json(config));
        self.api.json(request).await
    }

    /// 기존 swarm에 가입합니다.
    ///
    /// `RemoteAddrs`는 비어 있지 않은 배열, `JoinToken`은 `SWMTKN-1-` 접두어가 필요합니다.
    pub async fn join(&self, config: Value) -> Result<()> {
        validate::require_object(&config, "config")?;
        let remotes = config.get("RemoteAddrs").unwrap_or(&Value::Null);
        if !remotes.is_array() {
            return Err(DockerError::invalid("RemoteAddrs", "must be a non-empty array"));
        }
        validate::require_array(remotes, "RemoteAddrs", false)?;
        let token = config.get("JoinToken").and_then(Value::as_str);
        validate::require_string(token, "JoinToken")?;
        validate::require_swarm_token(token.unwrap_or_default(), "JoinToken")?;

        let request = ApiRequest::post("/swarm/join").body(RequestBody::Json(config));
        self.api.empty(request).await
    }

    /// swarm을 떠납니다. 매니저는 `force`가 필요합니다.
    pub async fn leave(&self, force: bool) -> Result<()> {
        let query = Query::new().param("force", force.then_some(true));
        self.api
            .empty(ApiRequest::post("/swarm/leave").query(query))
            .await
    }

    /// swarm 설정을 변경합니다. `version`은 현재 `Version.Index`입니다.
    pub async fn update(
        &self,
        version: u64,
        spec: Value,
        options: &SwarmUpdateOptions,
    ) -> Result<()> {
        validate::require_object(&spec, "spec")?;
        let mut query = versioned(version);
        query.merge(Query::from_options(options)?);
        let request = ApiRequest::post("/swarm/update")
            .query(query)
            .body(RequestBody::Json(spec));
        self.api.empty(request).await
    }

    /// 매니저 잠금 해제 키
    pub async fn unlock_key(&self) -> Result<Value> {
        self.api.json(ApiRequest::get("/swarm/unlockkey")).await
    }

    /// 잠긴 매니저를 해제합니다.
    pub async fn unlock(&self, key: &str) -> Result<()> {
        validate::require_string(Some(key), "UnlockKey")?;
        let request =
            ApiRequest::post("/swarm/unlock").body(RequestBody::Json(json!({ "UnlockKey": key })));
        self.api.empty(request).await
    }
}

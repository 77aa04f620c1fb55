//! 태스크 엔드포인트 (`/tasks/*`)

use dockyard_core::error::Result;
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::validate;
use serde_json::Value;

use super::services::ServiceLogsOptions;
use super::{filter_query, path_segment, resource_client};
use crate::response::ByteStream;
use crate::transport::{ApiRequest, Transport};

pub const LIST_FILTERS: FilterRules =
    FilterRules::new(&["desired-state", "id", "label", "name", "node", "service"])
        .with_enums(&[("desired-state", &["running", "shutdown", "accepted"])]);

resource_client!(
    /// swarm 태스크 클라이언트
    Tasks
);

impl<T: Transport> Tasks<T> {
    fn path(id: &str) -> String {
        format!("/tasks/{}", path_segment(id))
    }

    pub async fn list(&self, filters: &Filters) -> Result<Value> {
        let query = filter_query(filters, &LIST_FILTERS)?;
        self.api.json(ApiRequest::get("/tasks").query(query)).await
    }

    pub async fn inspect(&self, id: &str) -> Result<Value> {
        validate::require_id(id, "id")?;
        self.api.json(ApiRequest::get(Self::path(id))).await
    }

    /// 태스크 로그 스트림
    pub async fn logs(&self, id: &str, options: &ServiceLogsOptions) -> Result<ByteStream> {
        validate::require_id(id, "id")?;
        let request = ApiRequest::get(format!("{}/logs", Self::path(id))).query(options.to_query()?);
        self.api.stream(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::transport::MockTransport;
    use dockyard_core::error::DockerError;
    use serde_json::json;

    fn tasks(mock: MockTransport) -> Tasks<MockTransport> {
        Tasks::new(ApiClient::new(mock))
    }

    #[tokio::test]
    async fn desired_state_is_enum_checked() {
        let t = tasks(MockTransport::new().with_json(200, json!([])));
        let err = t
            .list(&Filters::new().add("desired-state", "paused"))
            .await
            .unwrap_err();
        assert!(matches!(err, DockerError::InvalidParameter { ref name, .. } if name == "desired-state"));
        assert_eq!(t.api.transport().request_count(), 0);

        t.list(&Filters::new().add("desired-state", "running").add("service", "web"))
            .await
            .unwrap();
        assert_eq!(t.api.transport().last_request().path, "/tasks");
    }

    #[tokio::test]
    async fn inspect_and_logs_paths() {
        let t = tasks(
            MockTransport::new()
                .with_json(200, json!({"ID": "t1", "DesiredState": "running"}))
                .with_body(200, "log line\n"),
        );
        let task = t.inspect("t1").await.unwrap();
        assert_eq!(task["DesiredState"], "running");
        t.logs("t1", &ServiceLogsOptions::all_output()).await.unwrap();
        assert_eq!(t.api.transport().last_request().path, "/tasks/t1/logs");
    }
}

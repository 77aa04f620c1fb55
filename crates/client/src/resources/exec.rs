//! exec 엔드포인트 (`/containers/{id}/exec`, `/exec/*`)

use dockyard_core::body::RequestBody;
use dockyard_core::error::{DockerError, Result};
use dockyard_core::query::Query;
use dockyard_core::validate;
use serde::Serialize;
use serde_json::Value;

use super::{path_segment, resource_client};
use crate::response::ByteStream;
use crate::transport::{ApiRequest, Transport};

/// `start` 본문
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecStartOptions {
    /// 출력을 받지 않고 즉시 반환
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detach: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<bool>,
    /// `[height, width]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_size: Option<[u32; 2]>,
}

resource_client!(
    /// exec 인스턴스 클라이언트
    Exec
);

impl<T: Transport> Exec<T> {
    fn path(id: &str, action: &str) -> String {
        format!("/exec/{}/{action}", path_segment(id))
    }

    /// 실행 중인 컨테이너에 exec 인스턴스를 만듭니다. 응답은 `{"Id": ..}`입니다.
    ///
    /// `Cmd`는 비어 있지 않은 배열이어야 합니다.
    pub async fn create(&self, container: &str, config: Value) -> Result<Value> {
        validate::require_id(container, "container")?;
        validate::require_object(&config, "config")?;
        let cmd = config.get("Cmd").unwrap_or(&Value::Null);
        if !cmd.is_array() {
            return Err(DockerError::invalid("Cmd", "must be a non-empty array"));
        }
        validate::require_array(cmd, "Cmd", false)?;
        let request = ApiRequest::post(format!("/containers/{}/exec", path_segment(container)))
            .body(RequestBody::Json(config));
        self.api.json(request).await
    }

    /// exec를 시작하고 출력 스트림을 반환합니다.
    ///
    /// TTY가 없으면 출력은 다중화 프레임입니다 ([`ByteStream::demux`]).
    pub async fn start(&self, id: &str, options: &ExecStartOptions) -> Result<ByteStream> {
        validate::require_id(id, "id")?;
        let request = ApiRequest::post(Self::path(id, "start")).body(RequestBody::json(options)?);
        self.api.stream(request).await
    }

    /// exec TTY 크기 조정
    pub async fn resize(&self, id: &str, height: i64, width: i64) -> Result<()> {
        validate::require_id(id, "id")?;
        validate::require_int_range(Some(height), "h", Some(1), Some(i64::from(u16::MAX)))?;
        validate::require_int_range(Some(width), "w", Some(1), Some(i64::from(u16::MAX)))?;
        let query = Query::new().param("h", height).param("w", width);
        self.api
            .empty(ApiRequest::post(Self::path(id, "resize")).query(query))
            .await
    }

    /// exec 상태 (`Running`, `ExitCode` 등)
    pub async fn inspect(&self, id: &str) -> Result<Value> {
        validate::require_id(id, "id")?;
        self.api.json(ApiRequest::get(Self::path(id, "json"))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::mux::StreamKind;
    use crate::transport::MockTransport;
    use futures_util::StreamExt;
    use serde_json::json;

    fn exec(mock: MockTransport) -> Exec<MockTransport> {
        Exec::new(ApiClient::new(mock))
    }

    fn assert_cmd_invalid(result: Result<Value>) {
        assert!(matches!(result, Err(DockerError::InvalidParameter { ref name, .. }) if name == "Cmd"));
    }

    #[tokio::test]
    async fn create_requires_non_empty_cmd() {
        let e = exec(MockTransport::new());
        assert_cmd_invalid(e.create("web", json!({})).await);
        assert_cmd_invalid(e.create("web", json!({"Cmd": []})).await);
        assert_cmd_invalid(e.create("web", json!({"Cmd": "ls"})).await);
        assert_eq!(e.api.transport().request_count(), 0);
    }

    #[tokio::test]
    async fn create_posts_to_container() {
        let e = exec(MockTransport::new().with_json(201, json!({"Id": "e1"})));
        let created = e
            .create("web", json!({"Cmd": ["ls", "-l"], "AttachStdout": true}))
            .await
            .unwrap();
        assert_eq!(created["Id"], "e1");
        assert_eq!(e.api.transport().last_request().path, "/containers/web/exec");
    }

    #[tokio::test]
    async fn start_returns_multiplexed_output() {
        let mut body = vec![2u8, 0, 0, 0, 0, 0, 0, 3];
        body.extend_from_slice(b"err");
        let e = exec(MockTransport::new().with_body(200, body));
        let frames: Vec<_> = e
            .start("e1", &ExecStartOptions::default())
            .await
            .unwrap()
            .demux()
            .map(|f| f.unwrap())
            .collect()
            .await;
        assert_eq!(frames[0].stream, StreamKind::Stderr);

        let sent = e.api.transport().last_request();
        assert_eq!(sent.path, "/exec/e1/start");
        assert_eq!(sent.body, RequestBody::Json(json!({})));
    }

    #[tokio::test]
    async fn start_body_uses_docker_field_names() {
        let e = exec(MockTransport::new());
        let options = ExecStartOptions {
            detach: Some(false),
            tty: Some(true),
            console_size: Some([24, 80]),
        };
        e.start("e1", &options).await.unwrap();
        assert_eq!(
            e.api.transport().last_request().body,
            RequestBody::Json(json!({"Detach": false, "Tty": true, "ConsoleSize": [24, 80]}))
        );
    }

    #[tokio::test]
    async fn resize_and_inspect() {
        let e = exec(MockTransport::new().with_body(201, "").with_json(200, json!({"Running": false, "ExitCode": 0})));
        e.resize("e1", 40, 120).await.unwrap();
        assert_eq!(e.api.transport().last_request().path, "/exec/e1/resize");
        let info = e.inspect("e1").await.unwrap();
        assert_eq!(info["ExitCode"], 0);
        assert!(e.resize("e1", 40, 0).await.is_err());
    }
}

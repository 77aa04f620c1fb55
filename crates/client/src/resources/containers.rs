//! 컨테이너 엔드포인트 (`/containers/*`)

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use dockyard_core::body::RequestBody;
use dockyard_core::container::RequestPayload;
use dockyard_core::error::{DockerError, Result};
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::query::Query;
use dockyard_core::validate;
use serde::Serialize;
use serde_json::Value;

use super::{apply_filters, filter_query, path_segment, resource_client};
use crate::response::ByteStream;
use crate::transport::{ApiRequest, Transport};

/// HEAD 응답에 담기는 경로 정보 헤더
pub const PATH_STAT_HEADER: &str = "X-Docker-Container-Path-Stat";

pub const LIST_FILTERS: FilterRules = FilterRules::new(&[
    "ancestor", "before", "expose", "exited", "health", "id", "isolation", "is-task", "label",
    "name", "network", "publish", "since", "status", "volume",
])
.with_enums(&[
    ("health", &["starting", "healthy", "unhealthy", "none"]),
    ("isolation", &["default", "process", "hyperv"]),
    ("is-task", &["true", "false"]),
    (
        "status",
        &["created", "restarting", "running", "removing", "paused", "exited", "dead"],
    ),
]);

pub const PRUNE_FILTERS: FilterRules = FilterRules::new(&["until", "label"]);

const RESTART_POLICIES: &[&str] = &["", "no", "always", "unless-stopped", "on-failure"];
const WAIT_CONDITIONS: &[&str] = &["not-running", "next-exit", "removed"];

/// `list` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContainerListOptions {
    /// 정지된 컨테이너 포함
    pub all: Option<bool>,
    pub limit: Option<i64>,
    /// 크기 정보 (`SizeRw`, `SizeRootFs`) 포함
    pub size: Option<bool>,
    #[serde(skip)]
    pub filters: Filters,
}

/// `create` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContainerCreateOptions {
    pub name: Option<String>,
    /// `os[/arch[/variant]]`
    pub platform: Option<String>,
}

/// `logs` / `logs_stream` 옵션
///
/// `stdout`, `stderr` 중 하나는 켜야 합니다.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogsOptions {
    pub follow: Option<bool>,
    pub stdout: Option<bool>,
    pub stderr: Option<bool>,
    /// UNIX 타임스탬프 (초)
    pub since: Option<i64>,
    pub until: Option<i64>,
    pub timestamps: Option<bool>,
    /// 끝에서부터 줄 수 또는 `"all"`
    pub tail: Option<String>,
}

impl LogsOptions {
    /// stdout과 stderr를 모두 받는 옵션
    pub fn all_output() -> Self {
        Self {
            stdout: Some(true),
            stderr: Some(true),
            ..Self::default()
        }
    }
}

/// `stop` / `restart` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct StopOptions {
    pub signal: Option<String>,
    /// 강제 종료 전 대기 시간 (초)
    pub t: Option<i64>,
}

/// `attach` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttachOptions {
    #[serde(rename = "detachKeys")]
    pub detach_keys: Option<String>,
    pub logs: Option<bool>,
    pub stream: Option<bool>,
    pub stdin: Option<bool>,
    pub stdout: Option<bool>,
    pub stderr: Option<bool>,
}

/// `remove` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemoveOptions {
    /// 익명 볼륨도 삭제
    pub v: Option<bool>,
    pub force: Option<bool>,
    pub link: Option<bool>,
}

/// `put_archive` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct PutArchiveOptions {
    #[serde(rename = "noOverwriteDirNonDir")]
    pub no_overwrite_dir_non_dir: Option<bool>,
    #[serde(rename = "copyUIDGID")]
    pub copy_uid_gid: Option<bool>,
}

/// `X-Docker-Container-Path-Stat` 헤더 값을 해석합니다.
///
/// 헤더는 base64(JSON) 형식입니다. 해석 실패는 잘못된 응답이므로 `Transport` 에러입니다.
pub fn decode_path_stat(header: &str) -> Result<Value> {
    let raw = STANDARD
        .decode(header.trim())
        .map_err(|e| DockerError::transport_with("invalid base64 in path stat header", e))?;
    serde_json::from_slice(&raw)
        .map_err(|e| DockerError::transport_with("invalid JSON in path stat header", e))
}

fn require_path(path: &str) -> Result<()> {
    validate::require_string(Some(path), "path")
}

resource_client!(
    /// 컨테이너 클라이언트
    Containers
);

impl<T: Transport> Containers<T> {
    fn path(id: &str, action: &str) -> String {
        format!("/containers/{}/{action}", path_segment(id))
    }

    /// 컨테이너 목록
    pub async fn list(&self, options: &ContainerListOptions) -> Result<Value> {
        let mut query = Query::from_options(options)?;
        apply_filters(&mut query, &options.filters, &LIST_FILTERS)?;
        self.api
            .json(ApiRequest::get("/containers/json").query(query))
            .await
    }

    /// 컨테이너를 생성합니다. 응답은 `{"Id": .., "Warnings": [..]}`입니다.
    pub async fn create(
        &self,
        payload: impl RequestPayload,
        options: &ContainerCreateOptions,
    ) -> Result<Value> {
        if let Some(name) = options.name.as_deref() {
            validate::require_id(name.trim_start_matches('/'), "name")?;
        }
        let payload = payload.into_payload()?;
        super::require_str_field(&payload, "Image")?;
        if let Some(ports) = payload.get("ExposedPorts") {
            validate::require_array(ports, "ExposedPorts", true)?;
            if let Some(ports) = ports.as_object() {
                for port in ports.keys() {
                    validate::require_port(port, "ExposedPorts")?;
                }
            }
        }
        if let Some(env) = payload.get("Env") {
            validate::require_array(env, "Env", true)?;
        }

        let request = ApiRequest::post("/containers/create")
            .query(Query::from_options(options)?)
            .body(RequestBody::Json(Value::Object(payload)));
        self.api.json(request).await
    }

    /// 컨테이너 상세 정보
    pub async fn inspect(&self, id: &str, size: bool) -> Result<Value> {
        validate::require_id(id, "id")?;
        let query = Query::new().param("size", size.then_some(true));
        self.api
            .json(ApiRequest::get(Self::path(id, "json")).query(query))
            .await
    }

    /// 컨테이너 내부 프로세스 목록
    pub async fn top(&self, id: &str, ps_args: Option<&str>) -> Result<Value> {
        validate::require_id(id, "id")?;
        let query = Query::new().param("ps_args", ps_args);
        self.api
            .json(ApiRequest::get(Self::path(id, "top")).query(query))
            .await
    }

    fn logs_request(id: &str, options: &LogsOptions) -> Result<ApiRequest> {
        validate::require_id(id, "id")?;
        if options.stdout != Some(true) && options.stderr != Some(true) {
            return Err(DockerError::invalid(
                "stdout",
                "at least one of stdout or stderr must be enabled",
            ));
        }
        if let Some(tail) = options.tail.as_deref()
            && tail != "all"
            && tail.parse::<u64>().is_err()
        {
            return Err(DockerError::invalid(
                "tail",
                format!("'{tail}' must be a line count or \"all\""),
            ));
        }
        Ok(ApiRequest::get(Self::path(id, "logs")).query(Query::from_options(options)?))
    }

    /// 로그 전체를 문자열로 읽습니다. `follow`는 무시됩니다.
    ///
    /// TTY 없이 생성된 컨테이너의 로그는 다중화 프레임이므로
    /// 분리가 필요하면 [`logs_stream`](Self::logs_stream)과
    /// [`ByteStream::demux`]를 사용합니다.
    pub async fn logs(&self, id: &str, options: &LogsOptions) -> Result<String> {
        let options = LogsOptions {
            follow: None,
            ..options.clone()
        };
        self.api.text(Self::logs_request(id, &options)?).await
    }

    /// 로그를 스트림으로 받습니다.
    pub async fn logs_stream(&self, id: &str, options: &LogsOptions) -> Result<ByteStream> {
        self.api.stream(Self::logs_request(id, options)?).await
    }

    /// 파일시스템 변경 목록
    pub async fn changes(&self, id: &str) -> Result<Value> {
        validate::require_id(id, "id")?;
        self.api.json(ApiRequest::get(Self::path(id, "changes"))).await
    }

    /// 파일시스템을 tar로 내보냅니다.
    pub async fn export(&self, id: &str) -> Result<ByteStream> {
        validate::require_id(id, "id")?;
        self.api.stream(ApiRequest::get(Self::path(id, "export"))).await
    }

    /// 리소스 사용량 스냅샷
    ///
    /// `one_shot`이면 데몬이 두 번째 샘플을 기다리지 않습니다 (`precpu_stats`가 비어 있음).
    pub async fn stats(&self, id: &str, one_shot: bool) -> Result<Value> {
        validate::require_id(id, "id")?;
        let query = Query::new()
            .param("stream", false)
            .param("one-shot", one_shot.then_some(true));
        self.api
            .json(ApiRequest::get(Self::path(id, "stats")).query(query))
            .await
    }

    /// 리소스 사용량 스트림 (줄 단위 JSON)
    pub async fn stats_stream(&self, id: &str) -> Result<ByteStream> {
        validate::require_id(id, "id")?;
        let query = Query::new().param("stream", true);
        self.api
            .stream(ApiRequest::get(Self::path(id, "stats")).query(query))
            .await
    }

    /// TTY 크기 조정
    pub async fn resize(&self, id: &str, height: i64, width: i64) -> Result<()> {
        validate::require_id(id, "id")?;
        validate::require_int_range(Some(height), "h", Some(1), Some(i64::from(u16::MAX)))?;
        validate::require_int_range(Some(width), "w", Some(1), Some(i64::from(u16::MAX)))?;
        let query = Query::new().param("h", height).param("w", width);
        self.api
            .empty(ApiRequest::post(Self::path(id, "resize")).query(query))
            .await
    }

    /// 컨테이너 시작 (이미 실행 중이면 304로 성공)
    pub async fn start(&self, id: &str, detach_keys: Option<&str>) -> Result<()> {
        validate::require_id(id, "id")?;
        let query = Query::new().param("detachKeys", detach_keys);
        self.api
            .empty(ApiRequest::post(Self::path(id, "start")).query(query))
            .await
    }

    fn stop_query(options: &StopOptions) -> Result<Query> {
        if let Some(signal) = options.signal.as_deref() {
            validate::require_signal(signal, "signal")?;
        }
        validate::require_int_range(options.t, "t", Some(-1), None)?;
        Query::from_options(options)
    }

    /// 컨테이너 정지
    pub async fn stop(&self, id: &str, options: &StopOptions) -> Result<()> {
        validate::require_id(id, "id")?;
        let query = Self::stop_query(options)?;
        self.api
            .empty(ApiRequest::post(Self::path(id, "stop")).query(query))
            .await
    }

    /// 컨테이너 재시작
    pub async fn restart(&self, id: &str, options: &StopOptions) -> Result<()> {
        validate::require_id(id, "id")?;
        let query = Self::stop_query(options)?;
        self.api
            .empty(ApiRequest::post(Self::path(id, "restart")).query(query))
            .await
    }

    /// 시그널 전송 (기본값 SIGKILL)
    pub async fn kill(&self, id: &str, signal: Option<&str>) -> Result<()> {
        validate::require_id(id, "id")?;
        if let Some(signal) = signal {
            validate::require_signal(signal, "signal")?;
        }
        let query = Query::new().param("signal", signal);
        self.api
            .empty(ApiRequest::post(Self::path(id, "kill")).query(query))
            .await
    }

    /// 실행 중인 컨테이너의 리소스 제한을 변경합니다.
    pub async fn update(&self, id: &str, payload: impl RequestPayload) -> Result<Value> {
        validate::require_id(id, "id")?;
        let payload = payload.into_payload()?;

        if let Some(weight) = payload.get("BlkioWeight").and_then(Value::as_i64)
            && weight != 0
        {
            validate::require_int_range(Some(weight), "BlkioWeight", Some(10), Some(1000))?;
        }
        if let Some(policy) = payload.get("RestartPolicy") {
            validate::require_object(policy, "RestartPolicy")?;
            let name = policy.get("Name").and_then(Value::as_str);
            validate::require_enum(name, RESTART_POLICIES, "RestartPolicy.Name")?;
        }

        let request = ApiRequest::post(Self::path(id, "update"))
            .body(RequestBody::Json(Value::Object(payload)));
        self.api.json(request).await
    }

    /// 이름 변경
    pub async fn rename(&self, id: &str, name: &str) -> Result<()> {
        validate::require_id(id, "id")?;
        validate::require_id(name, "name")?;
        let query = Query::new().param("name", name);
        self.api
            .empty(ApiRequest::post(Self::path(id, "rename")).query(query))
            .await
    }

    pub async fn pause(&self, id: &str) -> Result<()> {
        validate::require_id(id, "id")?;
        self.api.empty(ApiRequest::post(Self::path(id, "pause"))).await
    }

    pub async fn unpause(&self, id: &str) -> Result<()> {
        validate::require_id(id, "id")?;
        self.api.empty(ApiRequest::post(Self::path(id, "unpause"))).await
    }

    /// 컨테이너 입출력에 연결합니다.
    pub async fn attach(&self, id: &str, options: &AttachOptions) -> Result<ByteStream> {
        validate::require_id(id, "id")?;
        let request = ApiRequest::post(Self::path(id, "attach"))
            .query(Query::from_options(options)?);
        self.api.stream(request).await
    }

    /// 컨테이너가 조건에 도달할 때까지 기다립니다. 응답은 `{"StatusCode": ..}`입니다.
    pub async fn wait(&self, id: &str, condition: Option<&str>) -> Result<Value> {
        validate::require_id(id, "id")?;
        validate::require_enum(condition, WAIT_CONDITIONS, "condition")?;
        let query = Query::new().param("condition", condition);
        self.api
            .json(ApiRequest::post(Self::path(id, "wait")).query(query))
            .await
    }

    /// 컨테이너 삭제
    pub async fn remove(&self, id: &str, options: &RemoveOptions) -> Result<()> {
        validate::require_id(id, "id")?;
        let request = ApiRequest::delete(format!("/containers/{}", path_segment(id)))
            .query(Query::from_options(options)?);
        self.api.empty(request).await
    }

    /// 컨테이너 내부 경로 정보 (HEAD)
    pub async fn archive_info(&self, id: &str, path: &str) -> Result<Value> {
        validate::require_id(id, "id")?;
        require_path(path)?;
        let request =
            ApiRequest::head(Self::path(id, "archive")).query(Query::new().param("path", path));
        let response = self.api.request(request).await?;
        let header = response.header(PATH_STAT_HEADER).ok_or_else(|| {
            DockerError::transport(format!("response is missing {PATH_STAT_HEADER} header"))
        })?;
        decode_path_stat(header)
    }

    /// 경로를 tar 아카이브로 내려받습니다.
    pub async fn get_archive(&self, id: &str, path: &str) -> Result<ByteStream> {
        validate::require_id(id, "id")?;
        require_path(path)?;
        let request =
            ApiRequest::get(Self::path(id, "archive")).query(Query::new().param("path", path));
        self.api.stream(request).await
    }

    /// tar 아카이브를 컨테이너 경로에 풀어 넣습니다.
    pub async fn put_archive(
        &self,
        id: &str,
        path: &str,
        archive: impl Into<Bytes>,
        options: &PutArchiveOptions,
    ) -> Result<()> {
        validate::require_id(id, "id")?;
        require_path(path)?;
        let mut query = Query::new().param("path", path);
        query.merge(Query::from_options(options)?);
        let request = ApiRequest::put(Self::path(id, "archive"))
            .query(query)
            .body(RequestBody::tar(archive));
        self.api.empty(request).await
    }

    /// 정지된 컨테이너 정리
    pub async fn prune(&self, filters: &Filters) -> Result<Value> {
        let query = filter_query(filters, &PRUNE_FILTERS)?;
        self.api
            .json(ApiRequest::post("/containers/prune").query(query))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::transport::MockTransport;
    use dockyard_core::ContainerCreateRequest;
    use dockyard_core::ContainerUpdateRequest;
    use http::Method;
    use serde_json::json;

    fn containers(mock: MockTransport) -> Containers<MockTransport> {
        Containers::new(ApiClient::new(mock))
    }

    fn assert_invalid<V: std::fmt::Debug>(result: Result<V>, name: &str) {
        match result {
            Err(DockerError::InvalidParameter { name: n, .. }) => assert_eq!(n, name),
            other => panic!("expected InvalidParameter for {name}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_sends_options_and_filters() {
        let c = containers(MockTransport::new().with_json(200, json!([])));
        let options = ContainerListOptions {
            all: Some(true),
            limit: Some(5),
            filters: Filters::new().add("status", "running"),
            ..Default::default()
        };
        c.list(&options).await.unwrap();

        let request = c.api.transport().last_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/containers/json");
        assert_eq!(request.query.get("all"), Some("true"));
        assert_eq!(request.query.get("limit"), Some("5"));
        assert_eq!(request.query.get("filters"), Some(r#"{"status":["running"]}"#));
        assert!(request.query.get("size").is_none());
    }

    #[tokio::test]
    async fn list_rejects_unknown_filter_without_request() {
        let c = containers(MockTransport::new());
        let options = ContainerListOptions {
            filters: Filters::new().add("colour", "red"),
            ..Default::default()
        };
        assert_invalid(c.list(&options).await, "filters");
        assert_eq!(c.api.transport().request_count(), 0);
    }

    #[tokio::test]
    async fn list_rejects_bad_status_value() {
        let c = containers(MockTransport::new());
        let options = ContainerListOptions {
            filters: Filters::new().add("status", "sleeping"),
            ..Default::default()
        };
        assert_invalid(c.list(&options).await, "status");
        assert_eq!(c.api.transport().request_count(), 0);
    }

    #[tokio::test]
    async fn create_accepts_builder() {
        let c = containers(MockTransport::new().with_json(201, json!({"Id": "abc", "Warnings": []})));
        let request = ContainerCreateRequest::new("nginx:1.27")
            .env("MODE", "prod")
            .label("team", "edge")
            .expose("80/tcp");
        let options = ContainerCreateOptions {
            name: Some("web".to_owned()),
            ..Default::default()
        };
        let created = c.create(request, &options).await.unwrap();
        assert_eq!(created["Id"], "abc");

        let sent = c.api.transport().last_request();
        assert_eq!(sent.path, "/containers/create");
        assert_eq!(sent.query.get("name"), Some("web"));
        let RequestBody::Json(body) = sent.body else {
            panic!("expected JSON body");
        };
        assert_eq!(body["Image"], "nginx:1.27");
        assert_eq!(body["Env"], json!(["MODE=prod"]));
        assert_eq!(body["Labels"], json!({"team": "edge"}));
        assert_eq!(body["ExposedPorts"], json!({"80/tcp": {}}));
    }

    #[tokio::test]
    async fn create_accepts_raw_mapping() {
        let c = containers(MockTransport::new().with_json(201, json!({"Id": "x"})));
        c.create(json!({"Image": "alpine", "Cmd": ["true"]}), &Default::default())
            .await
            .unwrap();
        let sent = c.api.transport().last_request();
        assert_eq!(sent.body, RequestBody::Json(json!({"Image": "alpine", "Cmd": ["true"]})));
    }

    #[tokio::test]
    async fn create_validates_before_sending() {
        let c = containers(MockTransport::new());
        assert_invalid(c.create(json!({"Cmd": ["true"]}), &Default::default()).await, "Image");
        assert_invalid(
            c.create(
                json!({"Image": "alpine", "ExposedPorts": {"80": {}}}),
                &Default::default(),
            )
            .await,
            "ExposedPorts",
        );
        assert_invalid(c.create(json!(["alpine"]), &Default::default()).await, "body");
        let bad_name = ContainerCreateOptions {
            name: Some("-web".to_owned()),
            ..Default::default()
        };
        assert_invalid(c.create(json!({"Image": "alpine"}), &bad_name).await, "name");
        assert_eq!(c.api.transport().request_count(), 0);
    }

    #[tokio::test]
    async fn inspect_missing_container_is_client_error() {
        let c = containers(
            MockTransport::new().with_json(404, json!({"message": "No such container: missing"})),
        );
        let err = c.inspect("missing", false).await.unwrap_err();
        match err {
            DockerError::Client { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "No such container: missing");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(c.api.transport().last_request().path, "/containers/missing/json");
    }

    #[tokio::test]
    async fn invalid_id_never_reaches_transport() {
        let c = containers(MockTransport::new());
        assert_invalid(c.inspect("-bad", false).await, "id");
        assert_invalid(c.pause("../x").await, "id");
        assert_invalid(c.remove("", &RemoveOptions::default()).await, "id");
        assert_eq!(c.api.transport().request_count(), 0);
    }

    #[tokio::test]
    async fn logs_require_an_output_stream() {
        let c = containers(MockTransport::new());
        assert_invalid(c.logs("web", &LogsOptions::default()).await, "stdout");
        let bad_tail = LogsOptions {
            tail: Some("last".to_owned()),
            ..LogsOptions::all_output()
        };
        assert_invalid(c.logs("web", &bad_tail).await, "tail");
        assert_eq!(c.api.transport().request_count(), 0);
    }

    #[tokio::test]
    async fn logs_return_text_and_drop_follow() {
        let c = containers(MockTransport::new().with_body(200, "line 1\nline 2\n"));
        let options = LogsOptions {
            follow: Some(true),
            tail: Some("100".to_owned()),
            ..LogsOptions::all_output()
        };
        let text = c.logs("web", &options).await.unwrap();
        assert_eq!(text, "line 1\nline 2\n");

        let sent = c.api.transport().last_request();
        assert_eq!(sent.path, "/containers/web/logs");
        assert!(sent.query.get("follow").is_none());
        assert_eq!(sent.query.get("tail"), Some("100"));
        assert_eq!(sent.query.get("stdout"), Some("true"));
    }

    #[tokio::test]
    async fn stats_snapshot_and_stream_modes() {
        let c = containers(
            MockTransport::new()
                .with_json(200, json!({"cpu_stats": {}}))
                .with_body(200, "{\"read\":\"t1\"}\n{\"read\":\"t2\"}\n"),
        );
        let snapshot = c.stats("web", true).await.unwrap();
        assert!(snapshot.get("cpu_stats").is_some());
        let first = c.api.transport().last_request();
        assert_eq!(first.query.get("stream"), Some("false"));
        assert_eq!(first.query.get("one-shot"), Some("true"));

        use futures_util::StreamExt;
        let records: Vec<Value> = c
            .stats_stream("web")
            .await
            .unwrap()
            .json_lines()
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(records.len(), 2);
        assert_eq!(c.api.transport().last_request().query.get("stream"), Some("true"));
    }

    #[tokio::test]
    async fn kill_and_stop_validate_signals() {
        let c = containers(MockTransport::new().with_body(204, "").with_body(204, ""));
        c.kill("web", Some("SIGTERM")).await.unwrap();
        assert_eq!(c.api.transport().last_request().query.get("signal"), Some("SIGTERM"));

        let stop = StopOptions {
            signal: Some("SIGINT".to_owned()),
            t: Some(30),
        };
        c.stop("web", &stop).await.unwrap();
        let sent = c.api.transport().last_request();
        assert_eq!(sent.path, "/containers/web/stop");
        assert_eq!(sent.query.to_string(), "?signal=SIGINT&t=30");

        assert_invalid(c.kill("web", Some("SIGNOPE")).await, "signal");
        let bad = StopOptions {
            signal: Some("TERM".to_owned()),
            t: None,
        };
        assert_invalid(c.restart("web", &bad).await, "signal");
        assert_eq!(c.api.transport().request_count(), 2);
    }

    #[tokio::test]
    async fn update_checks_blkio_weight_and_restart_policy() {
        let c = containers(MockTransport::new().with_json(200, json!({"Warnings": []})));
        assert_invalid(
            c.update("web", ContainerUpdateRequest::new().blkio_weight(5)).await,
            "BlkioWeight",
        );
        assert_invalid(
            c.update(
                "web",
                ContainerUpdateRequest::new().restart_policy("sometimes", None),
            )
            .await,
            "RestartPolicy.Name",
        );
        assert_eq!(c.api.transport().request_count(), 0);

        c.update(
            "web",
            ContainerUpdateRequest::new()
                .blkio_weight(0)
                .memory(512)
                .restart_policy("on-failure", Some(3)),
        )
        .await
        .unwrap();
        let sent = c.api.transport().last_request();
        assert_eq!(sent.path, "/containers/web/update");
        let RequestBody::Json(body) = sent.body else {
            panic!("expected JSON body");
        };
        assert_eq!(body["Memory"], 512);
        assert_eq!(body["RestartPolicy"]["Name"], "on-failure");
    }

    #[tokio::test]
    async fn wait_condition_is_enum_checked() {
        let c = containers(MockTransport::new().with_json(200, json!({"StatusCode": 0})));
        assert_invalid(c.wait("web", Some("forever")).await, "condition");
        let status = c.wait("web", Some("next-exit")).await.unwrap();
        assert_eq!(status["StatusCode"], 0);
        assert_eq!(
            c.api.transport().last_request().query.get("condition"),
            Some("next-exit")
        );
    }

    #[tokio::test]
    async fn resize_bounds() {
        let c = containers(MockTransport::new());
        assert_invalid(c.resize("web", 0, 80).await, "h");
        c.resize("web", 24, 80).await.unwrap();
        assert_eq!(c.api.transport().last_request().query.to_string(), "?h=24&w=80");
    }

    #[test]
    fn path_stat_header_decodes() {
        let stat = json!({"name": "hosts", "size": 174, "mode": 420});
        let header = STANDARD.encode(stat.to_string());
        assert_eq!(decode_path_stat(&header).unwrap(), stat);
        assert!(matches!(
            decode_path_stat("%%%"),
            Err(DockerError::Transport { .. })
        ));
        assert!(matches!(
            decode_path_stat(&STANDARD.encode("not json")),
            Err(DockerError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn archive_info_uses_head_and_header() {
        let stat = json!({"name": "etc", "size": 4096});
        let header = STANDARD.encode(stat.to_string());
        let c = containers(MockTransport::new().with_reply(
            200,
            vec![(PATH_STAT_HEADER, header.as_str())],
            "",
        ));
        let info = c.archive_info("web", "/etc").await.unwrap();
        assert_eq!(info, stat);
        let sent = c.api.transport().last_request();
        assert_eq!(sent.method, Method::HEAD);
        assert_eq!(sent.query.get("path"), Some("/etc"));
    }

    #[tokio::test]
    async fn archive_info_without_header_is_transport_error() {
        let c = containers(MockTransport::new().with_body(200, ""));
        let err = c.archive_info("web", "/etc").await.unwrap_err();
        assert!(matches!(err, DockerError::Transport { .. }));
    }

    #[tokio::test]
    async fn put_archive_sends_tar() {
        let c = containers(MockTransport::new());
        let options = PutArchiveOptions {
            no_overwrite_dir_non_dir: Some(true),
            ..Default::default()
        };
        c.put_archive("web", "/tmp", vec![0u8; 1024], &options)
            .await
            .unwrap();
        let sent = c.api.transport().last_request();
        assert_eq!(sent.method, Method::PUT);
        assert_eq!(sent.query.to_string(), "?path=%2Ftmp&noOverwriteDirNonDir=true");
        assert_eq!(sent.body.kind(), "binary");
        assert_eq!(sent.body.approx_len(), 1024);

        assert_invalid(c.put_archive("web", "", vec![0u8], &options).await, "path");
    }

    #[tokio::test]
    async fn remove_and_prune() {
        let c = containers(
            MockTransport::new()
                .with_body(204, "")
                .with_json(200, json!({"ContainersDeleted": ["a"], "SpaceReclaimed": 10})),
        );
        let options = RemoveOptions {
            v: Some(true),
            force: Some(true),
            ..Default::default()
        };
        c.remove("web", &options).await.unwrap();
        let sent = c.api.transport().last_request();
        assert_eq!(sent.method, Method::DELETE);
        assert_eq!(sent.path, "/containers/web");
        assert_eq!(sent.query.to_string(), "?v=true&force=true");

        let report = c
            .prune(&Filters::new().add("until", "24h"))
            .await
            .unwrap();
        assert_eq!(report["SpaceReclaimed"], 10);
        assert_invalid(c.prune(&Filters::new().add("status", "exited")).await, "filters");
    }

    #[tokio::test]
    async fn attach_streams_demuxed_frames() {
        use futures_util::StreamExt;
        let mut body = vec![1u8, 0, 0, 0, 0, 0, 0, 2];
        body.extend_from_slice(b"hi");
        let c = containers(MockTransport::new().with_body(200, body));
        let options = AttachOptions {
            stream: Some(true),
            stdout: Some(true),
            ..Default::default()
        };
        let frames: Vec<_> = c
            .attach("web", &options)
            .await
            .unwrap()
            .demux()
            .collect()
            .await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref().unwrap().text(), "hi");
        assert_eq!(c.api.transport().last_request().method, Method::POST);
    }
}

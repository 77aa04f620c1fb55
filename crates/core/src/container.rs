//! 컨테이너 생성/수정 요청 빌더
//!
//! [`ContainerCreateRequest`]와 [`ContainerUpdateRequest`]는 Docker API의
//! PascalCase 필드를 그대로 따르는 평면 구조체입니다. 소비형 setter로 값을
//! 채운 뒤 [`ContainerCreateRequest::to_value`]로 요청 매핑을 얻습니다.
//!
//! 빌더는 검증하지 않습니다. 검증은 리소스 클라이언트 경계에서 수행됩니다.
//!
//! ```
//! use dockyard_core::container::ContainerCreateRequest;
//!
//! let request = ContainerCreateRequest::new("nginx:1.27")
//!     .env("MODE", "prod")
//!     .label("team", "edge")
//!     .expose("80/tcp");
//! let value = request.to_value().unwrap();
//! assert_eq!(value["Env"][0], "MODE=prod");
//! assert_eq!(value["ExposedPorts"]["80/tcp"], serde_json::json!({}));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DockerError, Result};
use crate::validate;

/// `{}`로 직렬화되는 빈 객체 (`ExposedPorts`, `Volumes` 값)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyObject {}

/// 호스트 포트 바인딩
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortBinding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_port: Option<String>,
}

/// 재시작 정책
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RestartPolicy {
    /// `no`, `always`, `unless-stopped`, `on-failure`
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_retry_count: Option<i64>,
}

/// 헬스체크 설정 (시간 단위는 나노초)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_period: Option<i64>,
}

/// 로그 드라이버 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(rename = "Type")]
    pub driver: String,
    #[serde(rename = "Config", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
}

/// 호스트 측 설정
///
/// 자주 쓰는 필드만 타입으로 두고 나머지는 `extra`로 그대로 전달합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binds: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_swap: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nano_cpus: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_shares: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_quota: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_period: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpuset_cpus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blkio_weight: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pids_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub port_bindings: BTreeMap<String, Vec<PortBinding>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_all_ports: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readonly_rootfs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_remove: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cap_add: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cap_drop: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_hosts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_config: Option<LogConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `POST /containers/create` 요청 본문
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerCreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domainname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stdin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stdout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stderr: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exposed_ports: BTreeMap<String, EmptyObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_stdin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin_once: Option<bool>,
    /// `KEY=value` 형식
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<HealthConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub volumes: BTreeMap<String, EmptyObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_signal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_config: Option<HostConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networking_config: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContainerCreateRequest {
    /// 이미지를 지정해 요청을 시작합니다.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            ..Self::default()
        }
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn domainname(mut self, domainname: impl Into<String>) -> Self {
        self.domainname = Some(domainname.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// stdin/stdout/stderr 연결 여부를 한 번에 지정합니다.
    pub fn attach(mut self, stdin: bool, stdout: bool, stderr: bool) -> Self {
        self.attach_stdin = Some(stdin);
        self.attach_stdout = Some(stdout);
        self.attach_stderr = Some(stderr);
        self
    }

    pub fn tty(mut self, tty: bool) -> Self {
        self.tty = Some(tty);
        self
    }

    pub fn open_stdin(mut self, open: bool) -> Self {
        self.open_stdin = Some(open);
        self
    }

    pub fn stdin_once(mut self, once: bool) -> Self {
        self.stdin_once = Some(once);
        self
    }

    /// 환경변수를 `KEY=value`로 추가합니다.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .push(format!("{}={}", key.as_ref(), value.as_ref()));
        self
    }

    /// 여러 환경변수를 추가합니다.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (k, v) in vars {
            self = self.env(k, v);
        }
        self
    }

    pub fn cmd<I, S>(mut self, cmd: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cmd = Some(cmd.into_iter().map(Into::into).collect());
        self
    }

    pub fn entrypoint<I, S>(mut self, entrypoint: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entrypoint = Some(entrypoint.into_iter().map(Into::into).collect());
        self
    }

    pub fn shell<I, S>(mut self, shell: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shell = Some(shell.into_iter().map(Into::into).collect());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.labels
            .extend(labels.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// 컨테이너 포트를 노출합니다 (`80/tcp`).
    pub fn expose(mut self, port: impl Into<String>) -> Self {
        self.exposed_ports.insert(port.into(), EmptyObject {});
        self
    }

    /// 익명 볼륨 마운트 지점을 추가합니다.
    pub fn volume(mut self, path: impl Into<String>) -> Self {
        self.volumes.insert(path.into(), EmptyObject {});
        self
    }

    pub fn network_disabled(mut self, disabled: bool) -> Self {
        self.network_disabled = Some(disabled);
        self
    }

    pub fn stop_signal(mut self, signal: impl Into<String>) -> Self {
        self.stop_signal = Some(signal.into());
        self
    }

    pub fn stop_timeout(mut self, secs: i64) -> Self {
        self.stop_timeout = Some(secs);
        self
    }

    pub fn healthcheck(mut self, health: HealthConfig) -> Self {
        self.healthcheck = Some(health);
        self
    }

    pub fn host_config(mut self, host_config: HostConfig) -> Self {
        self.host_config = Some(host_config);
        self
    }

    pub fn networking_config(mut self, config: Value) -> Self {
        self.networking_config = Some(config);
        self
    }

    /// 바인드 마운트를 추가합니다 (`/host:/container[:ro]`).
    pub fn bind(mut self, bind: impl Into<String>) -> Self {
        self.host_config_mut().binds.push(bind.into());
        self
    }

    /// 컨테이너 포트를 호스트 포트에 게시합니다. 노출 목록에도 추가됩니다.
    pub fn publish(
        mut self,
        container_port: impl Into<String>,
        host_ip: Option<&str>,
        host_port: impl Into<String>,
    ) -> Self {
        let container_port = container_port.into();
        self.exposed_ports
            .insert(container_port.clone(), EmptyObject {});
        self.host_config_mut()
            .port_bindings
            .entry(container_port)
            .or_default()
            .push(PortBinding {
                host_ip: host_ip.map(str::to_owned),
                host_port: Some(host_port.into()),
            });
        self
    }

    /// 메모리 제한 (바이트)
    pub fn memory(mut self, bytes: i64) -> Self {
        self.host_config_mut().memory = Some(bytes);
        self
    }

    /// CPU 제한 (10^-9 CPU 단위)
    pub fn nano_cpus(mut self, nano_cpus: i64) -> Self {
        self.host_config_mut().nano_cpus = Some(nano_cpus);
        self
    }

    pub fn restart_policy(mut self, name: impl Into<String>, max_retries: Option<i64>) -> Self {
        self.host_config_mut().restart_policy = Some(RestartPolicy {
            name: name.into(),
            maximum_retry_count: max_retries,
        });
        self
    }

    pub fn network_mode(mut self, mode: impl Into<String>) -> Self {
        self.host_config_mut().network_mode = Some(mode.into());
        self
    }

    pub fn auto_remove(mut self, auto_remove: bool) -> Self {
        self.host_config_mut().auto_remove = Some(auto_remove);
        self
    }

    pub fn privileged(mut self, privileged: bool) -> Self {
        self.host_config_mut().privileged = Some(privileged);
        self
    }

    /// 타입이 없는 필드를 그대로 추가합니다 (`MacAddress` 등).
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    fn host_config_mut(&mut self) -> &mut HostConfig {
        self.host_config.get_or_insert_with(HostConfig::default)
    }

    /// 요청 매핑으로 직렬화합니다.
    pub fn to_value(&self) -> Result<Value> {
        to_payload_value(self)
    }
}

/// `POST /containers/{id}/update` 요청 본문
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_shares: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_period: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_quota: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpuset_cpus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpuset_mems: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_reservation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_swap: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nano_cpus: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blkio_weight: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pids_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContainerUpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cpu_shares(mut self, shares: i64) -> Self {
        self.cpu_shares = Some(shares);
        self
    }

    pub fn memory(mut self, bytes: i64) -> Self {
        self.memory = Some(bytes);
        self
    }

    pub fn memory_reservation(mut self, bytes: i64) -> Self {
        self.memory_reservation = Some(bytes);
        self
    }

    pub fn memory_swap(mut self, bytes: i64) -> Self {
        self.memory_swap = Some(bytes);
        self
    }

    pub fn cpu_period(mut self, micros: i64) -> Self {
        self.cpu_period = Some(micros);
        self
    }

    pub fn cpu_quota(mut self, micros: i64) -> Self {
        self.cpu_quota = Some(micros);
        self
    }

    pub fn cpuset_cpus(mut self, cpus: impl Into<String>) -> Self {
        self.cpuset_cpus = Some(cpus.into());
        self
    }

    pub fn cpuset_mems(mut self, mems: impl Into<String>) -> Self {
        self.cpuset_mems = Some(mems.into());
        self
    }

    pub fn nano_cpus(mut self, nano_cpus: i64) -> Self {
        self.nano_cpus = Some(nano_cpus);
        self
    }

    /// 블록 IO 가중치 (10-1000)
    pub fn blkio_weight(mut self, weight: i64) -> Self {
        self.blkio_weight = Some(weight);
        self
    }

    pub fn pids_limit(mut self, limit: i64) -> Self {
        self.pids_limit = Some(limit);
        self
    }

    pub fn restart_policy(mut self, name: impl Into<String>, max_retries: Option<i64>) -> Self {
        self.restart_policy = Some(RestartPolicy {
            name: name.into(),
            maximum_retry_count: max_retries,
        });
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// 요청 매핑으로 직렬화합니다.
    pub fn to_value(&self) -> Result<Value> {
        to_payload_value(self)
    }
}

fn to_payload_value<T: Serialize>(request: &T) -> Result<Value> {
    serde_json::to_value(request)
        .map_err(|e| DockerError::invalid("body", format!("cannot serialize request: {e}")))
}

/// 생성/수정 요청 본문으로 쓸 수 있는 값
///
/// 빌더와 원시 JSON 매핑을 같은 메서드에 넘길 수 있게 합니다.
pub trait RequestPayload {
    /// JSON 객체로 변환합니다.
    fn into_payload(self) -> Result<Map<String, Value>>;
}

impl RequestPayload for ContainerCreateRequest {
    fn into_payload(self) -> Result<Map<String, Value>> {
        self.to_value()?.into_payload()
    }
}

impl RequestPayload for ContainerUpdateRequest {
    fn into_payload(self) -> Result<Map<String, Value>> {
        self.to_value()?.into_payload()
    }
}

impl RequestPayload for Map<String, Value> {
    fn into_payload(self) -> Result<Map<String, Value>> {
        Ok(self)
    }
}

impl RequestPayload for Value {
    fn into_payload(self) -> Result<Map<String, Value>> {
        validate::require_object(&self, "body")?;
        match self {
            Value::Object(map) => Ok(map),
            _ => Err(DockerError::invalid("body", "must be a JSON object")),
        }
    }
}

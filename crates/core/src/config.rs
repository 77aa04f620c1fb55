//! 설정 관리: dockyard.toml 파싱 및 클라이언트 설정
//!
//! [`ClientConfig`]는 연결 대상, 타임아웃, 기본 헤더, TLS, 재시도 정책을 담습니다.
//!
//! # 설정 로딩 우선순위
//! 1. 빌더/명시적 값 (최고 우선)
//! 2. 환경변수 (`DOCKER_HOST`, `DOCKER_TLS_VERIFY`, `DOCKER_CERT_PATH`, `DOCKYARD_*`)
//! 3. 설정 파일 (`dockyard.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), dockyard_core::error::DockerError> {
//! use dockyard_core::config::ClientConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ClientConfig::load("dockyard.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ClientConfig::parse("host = \"http://127.0.0.1:2375\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::endpoint::{DEFAULT_API_VERSION, DEFAULT_HOST, Endpoint, is_valid_api_version};
use crate::error::{ConfigError, DockerError};

/// 타임아웃 최대값 (초)
const MAX_TIMEOUT_SECS: u64 = 3600;

/// 재시도 최대 횟수
const MAX_RETRY_ATTEMPTS: u32 = 10;

/// 재시도 백오프 기준 최대값 (밀리초)
const MAX_RETRY_BACKOFF_MS: u64 = 60_000;

/// 모든 요청에 붙는 기본 헤더
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "application/json"),
    ("Accept", "application/json"),
];

/// Docker 클라이언트 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 데몬 주소 (`unix://`, `tcp://`, `http://`, `https://`)
    pub host: String,
    /// API 버전 (`v1.45`)
    pub api_version: String,
    /// 요청 전체 타임아웃 (초)
    #[serde(alias = "timeout")]
    pub timeout_secs: u64,
    /// 연결 타임아웃 (초)
    #[serde(alias = "connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 기본 헤더 위에 덮어쓸 추가 헤더
    pub headers: BTreeMap<String, String>,
    /// TLS 설정
    pub tls: TlsConfig,
    /// GET/HEAD 재시도 최대 횟수 (0 = 재시도 안 함)
    pub retry_max_attempts: u32,
    /// 재시도 백오프 기준 (밀리초, 시도 횟수에 비례)
    pub retry_backoff_base_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            timeout_secs: 60,
            connect_timeout_secs: 10,
            headers: BTreeMap::new(),
            tls: TlsConfig::default(),
            retry_max_attempts: 0,
            retry_backoff_base_ms: 500,
        }
    }
}

/// TLS 설정
///
/// 인증서 경로는 PEM 파일을 가리킵니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// 서버 인증서 검증 여부
    ///
    /// 지정하지 않으면 검증합니다. `Some(false)`일 때만 검증을 끕니다.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<bool>,
    /// CA 인증서 경로
    pub ca_cert: Option<PathBuf>,
    /// 클라이언트 인증서 경로
    pub cert: Option<PathBuf>,
    /// 클라이언트 개인키 경로
    pub ssl_key: Option<PathBuf>,
}

impl TlsConfig {
    /// TLS 관련 설정이 하나라도 있는지 여부
    ///
    /// `verify = true`이거나 인증서 경로가 있으면 `tcp://` 호스트를 https로 연결합니다.
    pub fn is_configured(&self) -> bool {
        self.verify == Some(true)
            || self.ca_cert.is_some()
            || self.cert.is_some()
            || self.ssl_key.is_some()
    }

    /// 서버 인증서를 검증할지 여부
    pub fn verifies(&self) -> bool {
        self.verify != Some(false)
    }
}

impl ClientConfig {
    /// 주어진 호스트를 사용하는 기본 설정을 만듭니다.
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// 기본 설정에 환경변수 오버라이드만 적용합니다.
    pub fn from_env() -> Result<Self, DockerError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DockerError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    ///
    /// 검증하지 않습니다. 검증은 오버라이드까지 적용한 뒤 [`load`](Self::load)에서 한 번 합니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DockerError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::ReadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, DockerError> {
        toml::from_str(toml_str).map_err(|e| {
            ConfigError::ParseFailed {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// Docker CLI와 같은 `DOCKER_HOST`, `DOCKER_TLS_VERIFY`, `DOCKER_CERT_PATH`를
    /// 따르며, dockyard 전용 값은 `DOCKYARD_` 접두어를 사용합니다.
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.host, "DOCKER_HOST");
        override_tls_verify(&mut self.tls.verify, "DOCKER_TLS_VERIFY");
        override_cert_path(&mut self.tls, "DOCKER_CERT_PATH");

        override_u64(&mut self.timeout_secs, "DOCKYARD_TIMEOUT_SECS");
        override_u64(
            &mut self.connect_timeout_secs,
            "DOCKYARD_CONNECT_TIMEOUT_SECS",
        );
        override_u32(&mut self.retry_max_attempts, "DOCKYARD_RETRY_MAX_ATTEMPTS");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_TIMEOUT_SECS}"),
            });
        }

        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > self.timeout_secs {
            return Err(ConfigError::InvalidValue {
                field: "connect_timeout_secs".to_owned(),
                reason: format!("must be 1-{} (not above timeout_secs)", self.timeout_secs),
            });
        }

        if self.retry_max_attempts > MAX_RETRY_ATTEMPTS {
            return Err(ConfigError::InvalidValue {
                field: "retry_max_attempts".to_owned(),
                reason: format!("must be at most {MAX_RETRY_ATTEMPTS}"),
            });
        }

        if self.retry_backoff_base_ms > MAX_RETRY_BACKOFF_MS {
            return Err(ConfigError::InvalidValue {
                field: "retry_backoff_base_ms".to_owned(),
                reason: format!("must be at most {MAX_RETRY_BACKOFF_MS}"),
            });
        }

        if !is_valid_api_version(&self.api_version) {
            return Err(ConfigError::InvalidValue {
                field: "api_version".to_owned(),
                reason: format!("'{}' must look like v1.NN", self.api_version),
            });
        }

        if let Err(e) = self.endpoint_unchecked() {
            return Err(ConfigError::InvalidValue {
                field: "host".to_owned(),
                reason: e.to_string(),
            });
        }

        if self.tls.cert.is_some() != self.tls.ssl_key.is_some() {
            return Err(ConfigError::InvalidValue {
                field: "tls".to_owned(),
                reason: "cert and ssl_key must be set together".to_owned(),
            });
        }

        for name in self.headers.keys() {
            if name.is_empty() || !name.bytes().all(is_header_name_byte) {
                return Err(ConfigError::InvalidValue {
                    field: "headers".to_owned(),
                    reason: format!("'{name}' is not a valid header name"),
                });
            }
        }

        Ok(())
    }

    /// 호스트 문자열을 엔드포인트로 해석합니다.
    pub fn endpoint(&self) -> Result<Endpoint, DockerError> {
        self.validate()?;
        self.endpoint_unchecked()
    }

    fn endpoint_unchecked(&self) -> Result<Endpoint, DockerError> {
        Endpoint::parse(&self.host, &self.api_version, self.tls.is_configured())
    }

    /// 기본 헤더에 사용자 헤더를 병합한 목록
    ///
    /// 이름 비교는 대소문자를 구분하지 않으며 사용자 값이 우선합니다.
    pub fn effective_headers(&self) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = DEFAULT_HEADERS
            .iter()
            .filter(|(name, _)| {
                !self
                    .headers
                    .keys()
                    .any(|custom| custom.eq_ignore_ascii_case(name))
            })
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        merged.extend(self.headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

fn is_header_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// [`ClientConfig`] 빌더
///
/// `build()`에서 검증을 수행합니다.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기존 설정에서 시작합니다.
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// 데몬 주소를 설정합니다.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// API 버전을 설정합니다.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    /// 요청 타임아웃(초)을 설정합니다.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// 연결 타임아웃(초)을 설정합니다.
    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    /// 추가 헤더를 설정합니다.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    /// 서버 인증서 검증 여부를 설정합니다.
    pub fn tls_verify(mut self, verify: bool) -> Self {
        self.config.tls.verify = Some(verify);
        self
    }

    /// CA 인증서 경로를 설정합니다.
    pub fn ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tls.ca_cert = Some(path.into());
        self
    }

    /// 클라이언트 인증서와 키 경로를 설정합니다.
    pub fn client_cert(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.config.tls.cert = Some(cert.into());
        self.config.tls.ssl_key = Some(key.into());
        self
    }

    /// 재시도 최대 횟수를 설정합니다.
    pub fn retry_max_attempts(mut self, attempts: u32) -> Self {
        self.config.retry_max_attempts = attempts;
        self
    }

    /// 재시도 백오프 기준(밀리초)을 설정합니다.
    pub fn retry_backoff_base_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_base_ms = ms;
        self
    }

    /// 설정을 검증하고 반환합니다.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key)
        && !val.is_empty()
    {
        *target = val;
    }
}

/// Docker CLI 규칙: 비어 있으면 무시, `0`/`false`면 검증 끄기, 그 외에는 켜기
fn override_tls_verify(target: &mut Option<bool>, env_key: &str) {
    let Ok(val) = std::env::var(env_key) else {
        return;
    };
    if val.is_empty() {
        return;
    }
    *target = Some(!(val == "0" || val.eq_ignore_ascii_case("false")));
}

fn override_cert_path(tls: &mut TlsConfig, env_key: &str) {
    let Ok(dir) = std::env::var(env_key) else {
        return;
    };
    if dir.is_empty() {
        warn!(env_key, "empty cert path in env var, ignoring");
        return;
    }
    let dir = PathBuf::from(dir);
    tls.ca_cert = Some(dir.join("ca.pem"));
    tls.cert = Some(dir.join("cert.pem"));
    tls.ssl_key = Some(dir.join("key.pem"));
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

//! 에러 타입: Docker 호출 실패 분류
//!
//! [`DockerError`]는 모든 Docker 작업 실패를 네 가지 등급으로 나눕니다.
//!
//! | 등급 | 발생 시점 | 의미 |
//! |------|-----------|------|
//! | `InvalidParameter` | I/O 이전 | 호출자가 잘못된 입력을 전달 |
//! | `Client` | 4xx 응답 | 데몬이 요청을 거부 (not found, conflict 등) |
//! | `Server` | 5xx 응답 | 데몬 내부 실패 |
//! | `Transport` | I/O 도중 | 연결 거부, DNS, 타임아웃, TLS, 잘못된 응답 본문 |
//!
//! 설정 로딩 에러는 [`ConfigError`]로 분리되어 있으며,
//! 클라이언트 API 경계를 넘을 때 `InvalidParameter`로 변환됩니다.

use std::fmt;

/// 에러 등급
///
/// 호출자는 이 값으로 입력 수정 / 사용자 에러 / 인프라 장애를 구분합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 요청 전 파라미터 검증 실패
    InvalidParameter,
    /// 4xx 응답
    ClientError,
    /// 5xx 응답
    ServerError,
    /// 전송 계층 실패 또는 응답 디코딩 실패
    TransportError,
}

impl ErrorKind {
    /// 메트릭 레이블용 고정 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "invalid_parameter",
            Self::ClientError => "client",
            Self::ServerError => "server",
            Self::TransportError => "transport",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Docker 작업 실패
#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    /// 파라미터 검증 실패 (네트워크 호출 없음)
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// 데몬이 요청을 거부함 (4xx)
    #[error("docker client error ({status}): {message}")]
    Client { status: u16, message: String },

    /// 데몬 내부 실패 (5xx)
    #[error("docker server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// 연결/타임아웃/TLS 실패 또는 응답 디코딩 실패
    #[error("docker transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DockerError {
    /// `InvalidParameter` 에러를 생성합니다.
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// 원인 없이 `Transport` 에러를 생성합니다.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// 원인 에러를 감싼 `Transport` 에러를 생성합니다.
    pub fn transport_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// HTTP 상태 코드로 `Client` 또는 `Server` 에러를 생성합니다.
    ///
    /// 500 이상은 `Server`, 나머지는 `Client`로 분류합니다.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status >= 500 {
            Self::Server { status, message }
        } else {
            Self::Client { status, message }
        }
    }

    /// 에러 등급
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::Client { .. } => ErrorKind::ClientError,
            Self::Server { .. } => ErrorKind::ServerError,
            Self::Transport { .. } => ErrorKind::TransportError,
        }
    }

    /// 응답 상태 코드 (HTTP 응답에서 온 에러만)
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 404 응답 여부
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// 멱등 요청을 재시도해도 되는 에러인지 여부
    ///
    /// 입력 오류와 4xx는 재시도해도 결과가 같으므로 제외합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::ServerError | ErrorKind::TransportError)
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파일 읽기 실패
    #[error("failed to read config file {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<ConfigError> for DockerError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidValue { field, reason } => Self::InvalidParameter {
                name: field,
                reason,
            },
            other => Self::InvalidParameter {
                name: "config".to_owned(),
                reason: other.to_string(),
            },
        }
    }
}

/// dockyard 결과 타입
pub type Result<T, E = DockerError> = std::result::Result<T, E>;

//! 요청 파이프라인
//!
//! [`ApiClient`]는 모든 리소스 클라이언트가 공유하는 단일 호출 경로입니다.
//!
//! 1. 요청 로그 (`debug`)
//! 2. 전송 계층 호출 및 소요 시간 측정
//! 3. 상태 코드 분류 (4xx -> `Client`, 5xx -> `Server`)
//! 4. 실패 로그 (`error`) 및 메트릭 기록
//!
//! 재시도는 기본적으로 꺼져 있으며, 켜더라도 GET/HEAD 요청의
//! `Server`/`Transport` 실패만 재시도합니다.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dockyard_core::config::ClientConfig;
use dockyard_core::error::{DockerError, Result};
use dockyard_core::metrics as m;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::response::{ApiResponse, ByteStream, RawResponse};
use crate::transport::{ApiRequest, HttpTransport, Transport};

/// 멱등 요청 재시도 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최초 시도 이후 추가 시도 횟수 (0 = 재시도 없음)
    pub max_attempts: u32,
    /// 선형 백오프 기준 (`backoff_base * attempt`)
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// 재시도하지 않는 정책
    pub const fn none() -> Self {
        Self {
            max_attempts: 0,
            backoff_base: Duration::from_millis(500),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_attempts: config.retry_max_attempts,
            backoff_base: Duration::from_millis(config.retry_backoff_base_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Docker API 호출기
///
/// 전송 계층을 `Arc`로 공유하므로 복제 비용이 작습니다.
pub struct ApiClient<T: Transport = HttpTransport> {
    transport: Arc<T>,
    retry: RetryPolicy,
}

impl<T: Transport> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            retry: self.retry,
        }
    }
}

impl<T: Transport> std::fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// 이미 공유 중인 전송 계층으로 생성합니다.
    pub fn from_shared(transport: Arc<T>) -> Self {
        Self {
            transport,
            retry: RetryPolicy::none(),
        }
    }

    /// 재시도 정책을 설정합니다.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 현재 재시도 정책
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// 내부 전송 계층
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 요청을 보내고 성공 응답을 반환합니다.
    ///
    /// # Errors
    ///
    /// - 4xx: `DockerError::Client`
    /// - 5xx: `DockerError::Server`
    /// - 연결/타임아웃/TLS 실패: `DockerError::Transport`
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
        if self.retry.max_attempts == 0 || !request.is_idempotent() {
            return self.execute(request).await;
        }

        let mut attempt = 0;
        loop {
            match self.execute(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    attempt += 1;
                    let backoff = self.retry.backoff_base * attempt;
                    warn!(
                        method = %request.method,
                        path = %request.path,
                        attempt = attempt,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "retrying docker request"
                    );
                    metrics::counter!(m::API_RETRIES_TOTAL, m::LABEL_METHOD => request.method.to_string())
                        .increment(1);
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 재시도 없이 요청 한 번을 수행합니다.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let method = request.method.to_string();
        let path = request.path.clone();

        debug!(
            method = %method,
            path = %path,
            query = %request.query,
            body = request.body.kind(),
            body_len = request.body.approx_len(),
            "docker request"
        );

        let started = Instant::now();
        let result = self.transport.send(request).await;
        metrics::histogram!(m::API_REQUEST_DURATION_SECONDS, m::LABEL_METHOD => method.clone())
            .record(started.elapsed().as_secs_f64());

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                error!(method = %method, path = %path, error = %e, "docker request failed");
                record_error(&e);
                return Err(e);
            }
        };

        metrics::counter!(
            m::API_REQUESTS_TOTAL,
            m::LABEL_METHOD => method.clone(),
            m::LABEL_STATUS => raw.status.as_u16().to_string()
        )
        .increment(1);

        debug!(
            method = %method,
            path = %path,
            status = raw.status.as_u16(),
            headers = ?raw.headers,
            "docker response"
        );

        if raw.status.as_u16() < 400 {
            return Ok(ApiResponse::from_raw(raw));
        }

        let status = raw.status.as_u16();
        let err = DockerError::from_status(status, error_message(raw).await);
        error!(method = %method, path = %path, status = status, error = %err, "docker request rejected");
        record_error(&err);
        Err(err)
    }

    /// 요청 후 JSON 본문을 반환합니다.
    pub async fn json(&self, request: ApiRequest) -> Result<Value> {
        self.request(request).await?.into_json().await
    }

    /// 요청 후 본문 문자열을 반환합니다.
    pub async fn text(&self, request: ApiRequest) -> Result<String> {
        self.request(request).await?.into_string().await
    }

    /// 요청 후 본문 스트림을 반환합니다.
    pub async fn stream(&self, request: ApiRequest) -> Result<ByteStream> {
        Ok(self.request(request).await?.into_stream())
    }

    /// 본문이 없는 응답 (204 등)을 기다립니다. 남은 본문은 버립니다.
    pub async fn empty(&self, request: ApiRequest) -> Result<()> {
        self.request(request).await?.into_bytes().await?;
        Ok(())
    }
}

fn record_error(err: &DockerError) {
    metrics::counter!(m::API_ERRORS_TOTAL, m::LABEL_KIND => err.kind().as_str()).increment(1);
}

/// 에러 응답에서 메시지를 꺼냅니다.
///
/// JSON `message` 필드, 원문 본문, 표준 사유 문구 순으로 사용합니다.
async fn error_message(raw: RawResponse) -> String {
    let reason = raw
        .status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("HTTP {}", raw.status.as_u16()));

    let body = match raw.body.collect_bytes().await {
        Ok(body) => body,
        Err(e) => return format!("{reason} (body unreadable: {e})"),
    };

    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(&body)
        && let Some(Value::String(message)) = map.get("message")
    {
        return message.clone();
    }

    let text = String::from_utf8_lossy(&body);
    let text = text.trim();
    if text.is_empty() {
        reason
    } else {
        text.to_owned()
    }
}

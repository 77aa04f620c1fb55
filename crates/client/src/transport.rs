//! 전송 계층 추상화
//!
//! [`Transport`] trait은 HTTP 왕복 한 번을 추상화합니다. 운영 코드는
//! reqwest 기반 [`HttpTransport`]를, 테스트는 `MockTransport`를 사용합니다.
//!
//! ```text
//! ┌──────────────────┐
//! │ Resource Clients │
//! └────────┬─────────┘
//!          ▼
//!   ┌────────────┐
//!   │ ApiClient  │ 로그, 메트릭, 상태 코드 매핑, 재시도
//!   └─────┬──────┘
//!         ▼
//!   ┌────────────┐
//!   │ Transport  │ (trait)
//!   └────────────┘
//!      │      │
//!      ▼      ▼
//!   ┌──────┐ ┌──────┐
//!   │ Http │ │ Mock │
//!   └──┬───┘ └──────┘
//!      ▼
//!  Docker Daemon (Unix socket / TCP / TLS)
//! ```

use std::future::Future;
use std::time::Duration;

use dockyard_core::body::{MultipartPart, RequestBody};
use dockyard_core::config::{ClientConfig, TlsConfig};
use dockyard_core::endpoint::Endpoint;
use dockyard_core::error::{DockerError, Result};
use dockyard_core::query::Query;
use futures_util::StreamExt;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::Method;
use tracing::debug;

use crate::response::{ByteStream, RawResponse};

/// 요청 기술자
///
/// 호출마다 새로 만들어지며, 재시도를 위해 복제할 수 있습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// API 버전 접두어를 뺀 경로 (`/containers/json`)
    pub path: String,
    pub query: Query,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    /// 메서드와 경로로 요청을 생성합니다.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(Method::HEAD, path)
    }

    /// 쿼리를 설정합니다.
    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// 헤더를 추가합니다.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 본문을 설정합니다.
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// 추가 헤더 값 (대소문자 무시)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// 재시도해도 안전한 메서드인지 여부
    pub fn is_idempotent(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }
}

/// HTTP 왕복 한 번을 수행하는 전송 계층
///
/// `Send + Sync + 'static`이므로 `Arc`로 공유해 여러 태스크에서 사용할 수 있습니다.
///
/// # Errors
///
/// 응답을 받지 못한 경우(연결 실패, DNS, 타임아웃, TLS)만 `Transport` 에러를 반환합니다.
/// 4xx/5xx 응답은 `Ok(RawResponse)`로 돌려주고, 분류는 `ApiClient`가 담당합니다.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<RawResponse>> + Send;
}

/// reqwest 기반 운영 전송 계층
///
/// Unix 소켓, 평문 TCP, TLS(선택적 클라이언트 인증서)를 지원합니다.
/// 내부 `reqwest::Client`의 커넥션 풀은 복제본끼리 공유됩니다.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Endpoint,
}

impl HttpTransport {
    /// 설정으로 전송 계층을 생성합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패, 잘못된 헤더, 인증서 파일 읽기 실패는 `InvalidParameter`입니다.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let endpoint = config.endpoint()?;

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .default_headers(default_headers(config)?);

        if let Some(path) = endpoint.socket_path() {
            #[cfg(unix)]
            {
                builder = builder.unix_socket(path.to_path_buf());
            }
            #[cfg(not(unix))]
            {
                return Err(DockerError::invalid(
                    "host",
                    format!("unix socket {} is not supported on this platform", path.display()),
                ));
            }
        }

        if endpoint.is_tls() {
            builder = apply_tls(builder, &config.tls)?;
        }

        let client = builder
            .build()
            .map_err(|e| DockerError::transport_with("failed to build HTTP client", e))?;

        debug!(
            base_url = endpoint.base_url(),
            socket = ?endpoint.socket_path(),
            tls = endpoint.is_tls(),
            "docker transport ready"
        );

        Ok(Self { client, endpoint })
    }

    /// 연결 엔드포인트
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        let url = self
            .endpoint
            .url_for(&request.path, &request.query.to_string());

        let mut builder = self.client.request(request.method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)?),
            RequestBody::Binary { data, content_type } => {
                builder.header(CONTENT_TYPE, content_type).body(data)
            }
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = ByteStream::new(response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| DockerError::transport_with("failed to read response body", e))
        }));

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn default_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in config.effective_headers() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| DockerError::invalid("headers", format!("'{name}': {e}")))?;
        let header_value = HeaderValue::from_str(&value)
            .map_err(|e| DockerError::invalid("headers", format!("value of '{name}': {e}")))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// TLS 설정을 적용합니다.
///
/// 서버 인증서 검증은 `verify = false`를 명시했을 때만 끕니다.
/// CA를 지정하면 그 CA로, 지정하지 않으면 기본 루트 인증서로 검증합니다.
fn apply_tls(
    mut builder: reqwest::ClientBuilder,
    tls: &TlsConfig,
) -> Result<reqwest::ClientBuilder> {
    builder = builder.use_rustls_tls();

    if let Some(ca_path) = &tls.ca_cert {
        let pem = read_pem(ca_path, "tls.ca_cert")?;
        let cert = reqwest::Certificate::from_pem(&pem)
            .map_err(|e| DockerError::invalid("tls.ca_cert", e.to_string()))?;
        builder = builder.add_root_certificate(cert);
    }

    if let (Some(cert_path), Some(key_path)) = (&tls.cert, &tls.ssl_key) {
        let mut pem = read_pem(cert_path, "tls.cert")?;
        pem.push(b'\n');
        pem.extend(read_pem(key_path, "tls.ssl_key")?);
        let identity = reqwest::Identity::from_pem(&pem)
            .map_err(|e| DockerError::invalid("tls.cert", e.to_string()))?;
        builder = builder.identity(identity);
    }

    if !tls.verifies() {
        builder = builder.danger_accept_invalid_certs(true);
    }

    Ok(builder)
}

fn read_pem(path: &std::path::Path, field: &str) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| DockerError::invalid(field, format!("cannot read {}: {e}", path.display())))
}

fn multipart_form(parts: Vec<MultipartPart>) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        let mut body = reqwest::multipart::Part::bytes(part.data.to_vec());
        if let Some(filename) = part.filename {
            body = body.file_name(filename);
        }
        if let Some(content_type) = part.content_type {
            body = body
                .mime_str(&content_type)
                .map_err(|e| DockerError::invalid(part.name.clone(), e.to_string()))?;
        }
        form = form.part(part.name, body);
    }
    Ok(form)
}

fn map_reqwest_error(err: reqwest::Error) -> DockerError {
    let what = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_builder() {
        "invalid request"
    } else {
        "request failed"
    };
    DockerError::transport_with(format!("{what}: {err}"), err)
}

// --- 테스트용 Mock ---

/// 테스트용 mock 응답
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 상태 코드, 헤더, 본문
    Reply {
        status: u16,
        headers: Vec<(String, String)>,
        body: bytes::Bytes,
    },
    /// 응답 없이 전송 실패
    Fail(String),
}

/// 테스트용 Mock 전송 계층
///
/// 받은 요청을 기록하고, 큐에 넣어 둔 응답을 순서대로 돌려줍니다.
/// 큐가 비면 `200 {}`을 반환합니다.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockTransport {
    requests: std::sync::Mutex<Vec<ApiRequest>>,
    responses: std::sync::Mutex<std::collections::VecDeque<MockResponse>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON 응답을 큐에 추가합니다.
    pub fn with_json(self, status: u16, body: serde_json::Value) -> Self {
        self.with_body(status, body.to_string())
    }

    /// 원시 본문 응답을 큐에 추가합니다.
    pub fn with_body(self, status: u16, body: impl Into<bytes::Bytes>) -> Self {
        self.with_reply(status, Vec::new(), body)
    }

    /// 헤더가 있는 응답을 큐에 추가합니다.
    pub fn with_reply(
        self,
        status: u16,
        headers: Vec<(&str, &str)>,
        body: impl Into<bytes::Bytes>,
    ) -> Self {
        self.push(MockResponse::Reply {
            status,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
            body: body.into(),
        });
        self
    }

    /// 전송 실패를 큐에 추가합니다.
    pub fn with_failure(self, message: &str) -> Self {
        self.push(MockResponse::Fail(message.to_owned()));
        self
    }

    fn push(&self, response: MockResponse) {
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .push_back(response);
    }

    /// 기록된 요청 목록
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }

    /// 기록된 요청 수
    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("mock lock poisoned").len()
    }

    /// 마지막 요청
    pub fn last_request(&self) -> ApiRequest {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .last()
            .cloned()
            .expect("no request was recorded")
    }
}

#[cfg(test)]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(request);
        let next = self
            .responses
            .lock()
            .expect("mock lock poisoned")
            .pop_front();

        match next {
            None => Ok(RawResponse {
                status: http::StatusCode::OK,
                headers: HeaderMap::new(),
                body: ByteStream::from_bytes("{}"),
            }),
            Some(MockResponse::Fail(message)) => Err(DockerError::transport(message)),
            Some(MockResponse::Reply {
                status,
                headers,
                body,
            }) => {
                let mut map = HeaderMap::new();
                for (k, v) in headers {
                    map.insert(
                        HeaderName::from_bytes(k.as_bytes()).expect("valid header name"),
                        HeaderValue::from_str(&v).expect("valid header value"),
                    );
                }
                Ok(RawResponse {
                    status: http::StatusCode::from_u16(status).expect("valid status"),
                    headers: map,
                    body: ByteStream::from_bytes(body),
                })
            }
        }
    }
}

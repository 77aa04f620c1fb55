//! 메트릭 상수 및 설명 등록
//!
//! dockyard가 기록하는 모든 메트릭의 이름과 레이블 키를 한곳에서 정의합니다.
//! 라이브러리는 `metrics` 파사드로 값만 기록하며, exporter 설치는
//! 호스트 애플리케이션의 몫입니다. recorder가 없으면 기록은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `dockyard_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! metrics::counter!(
//!     dockyard_core::metrics::API_REQUESTS_TOTAL,
//!     dockyard_core::metrics::LABEL_METHOD => "GET",
//!     dockyard_core::metrics::LABEL_STATUS => "200",
//! )
//! .increment(1);
//! ```

// ─── 레이블 키 ─────────────────────────────────────────────────────

/// HTTP 메서드 레이블 키 (GET, POST, PUT, DELETE, HEAD)
pub const LABEL_METHOD: &str = "method";

/// 응답 상태 코드 레이블 키
pub const LABEL_STATUS: &str = "status";

/// 에러 등급 레이블 키 (invalid_parameter, client, server, transport)
pub const LABEL_KIND: &str = "kind";

// ─── API 메트릭 ────────────────────────────────────────────────────

/// 데몬이 응답한 요청 수 (counter, labels: method, status)
pub const API_REQUESTS_TOTAL: &str = "dockyard_api_requests_total";

/// 요청 왕복 시간 (histogram, 초, label: method)
pub const API_REQUEST_DURATION_SECONDS: &str = "dockyard_api_request_duration_seconds";

/// 실패한 요청 수 (counter, label: kind)
pub const API_ERRORS_TOTAL: &str = "dockyard_api_errors_total";

/// I/O 전에 거부된 파라미터 수 (counter)
pub const VALIDATION_FAILURES_TOTAL: &str = "dockyard_validation_failures_total";

/// 재시도 횟수 (counter, label: method)
pub const API_RETRIES_TOTAL: &str = "dockyard_api_retries_total";

/// 요청 지연 히스토그램 버킷 (초)
///
/// 호스트의 exporter가 [`API_REQUEST_DURATION_SECONDS`]에 적용할 값입니다.
pub const REQUEST_DURATION_BUCKETS: &[f64] =
    &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// 모든 메트릭의 설명을 등록합니다.
///
/// recorder 설치 직후 한 번 호출하면 exporter 출력에 HELP 텍스트가 붙습니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        API_REQUESTS_TOTAL,
        "Docker Engine API requests that received a response, by method and status"
    );
    describe_histogram!(
        API_REQUEST_DURATION_SECONDS,
        "Docker Engine API request round-trip latency in seconds"
    );
    describe_counter!(
        API_ERRORS_TOTAL,
        "Failed Docker Engine API calls, by error kind"
    );
    describe_counter!(
        VALIDATION_FAILURES_TOTAL,
        "Parameters rejected locally before any request was sent"
    );
    describe_counter!(
        API_RETRIES_TOTAL,
        "Idempotent requests retried after a server or transport failure"
    );
}

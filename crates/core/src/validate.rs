//! 파라미터 검증: 요청 전 입력 형태/형식 검사
//!
//! 모든 함수는 부수효과 없는 순수 함수이며, 위반 시
//! [`DockerError::InvalidParameter`]를 반환합니다.
//! 리소스 클라이언트는 엔드포인트마다 필요한 검사를 조합해 사용하고,
//! 검증이 실패하면 네트워크 호출은 일어나지 않습니다.
//!
//! # 사용 예시
//! ```
//! use dockyard_core::validate;
//!
//! validate::require_id("my-container_1.0", "id").unwrap();
//! validate::require_port("8080/tcp", "port").unwrap();
//! assert!(validate::require_signal("SIGNOPE", "signal").is_err());
//! ```

use std::fmt;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde_json::Value;

use crate::error::{DockerError, Result};

/// 이름 형태의 식별자 (컨테이너 이름, 볼륨 이름 등)
static NAME_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("valid regex"));

/// 12~64자 16진수 콘텐츠 ID
static HEX_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{12,64}$").expect("valid regex"));

static PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+/(tcp|udp|sctp)$").expect("valid regex"));

/// 이미지/플러그인 참조 (`registry:5000/ns/name:tag@sha256:...`)
static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._/:@-]*$").expect("valid regex"));

static SWARM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^SWMTKN-1-").expect("valid regex"));

/// 허용되는 POSIX 시그널 이름
pub const SIGNALS: &[&str] = &[
    "SIGABRT", "SIGALRM", "SIGBUS", "SIGCHLD", "SIGCLD", "SIGCONT", "SIGFPE", "SIGHUP", "SIGILL",
    "SIGINT", "SIGIO", "SIGIOT", "SIGKILL", "SIGPIPE", "SIGPOLL", "SIGPROF", "SIGPWR", "SIGQUIT",
    "SIGSEGV", "SIGSTKFLT", "SIGSTOP", "SIGSYS", "SIGTERM", "SIGTRAP", "SIGTSTP", "SIGTTIN",
    "SIGTTOU", "SIGURG", "SIGUSR1", "SIGUSR2", "SIGVTALRM", "SIGWINCH", "SIGXCPU", "SIGXFSZ",
];

fn fail(name: &str, reason: impl Into<String>) -> DockerError {
    metrics::counter!(crate::metrics::VALIDATION_FAILURES_TOTAL).increment(1);
    DockerError::invalid(name, reason)
}

/// 값이 비어 있지 않은지 검사합니다.
///
/// null, 빈 문자열, 빈 배열/객체, `false`, `0`은 모두 비어 있는 값으로 취급합니다.
pub fn require_non_empty(value: &Value, name: &str) -> Result<()> {
    let empty = match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    };
    if empty {
        return Err(fail(name, "must not be empty"));
    }
    Ok(())
}

/// 문자열이 존재하고 비어 있지 않은지 검사합니다.
pub fn require_string(value: Option<&str>, name: &str) -> Result<()> {
    match value {
        Some(s) if !s.is_empty() => Ok(()),
        Some(_) => Err(fail(name, "must not be an empty string")),
        None => Err(fail(name, "is required")),
    }
}

/// 값이 배열 또는 객체인지 검사합니다.
///
/// `allow_empty`가 `false`이면 비어 있는 컬렉션도 거부합니다.
pub fn require_array(value: &Value, name: &str, allow_empty: bool) -> Result<()> {
    let len = match value {
        Value::Array(a) => a.len(),
        Value::Object(o) => o.len(),
        _ => return Err(fail(name, "must be an array or mapping")),
    };
    if len == 0 && !allow_empty {
        return Err(fail(name, "must not be empty"));
    }
    Ok(())
}

/// 값이 JSON 객체인지 검사합니다.
pub fn require_object(value: &Value, name: &str) -> Result<()> {
    if value.is_object() {
        Ok(())
    } else {
        Err(fail(name, "must be a JSON object"))
    }
}

/// 정수가 `[min, max]` 범위에 있는지 검사합니다.
///
/// 값이 `None`이면 선택 필드로 보고 통과합니다. 각 경계도 생략할 수 있습니다.
pub fn require_int_range(
    value: Option<i64>,
    name: &str,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<()> {
    let Some(v) = value else {
        return Ok(());
    };
    if let Some(min) = min
        && v < min
    {
        return Err(fail(name, format!("must be >= {min}, got {v}")));
    }
    if let Some(max) = max
        && v > max
    {
        return Err(fail(name, format!("must be <= {max}, got {v}")));
    }
    Ok(())
}

/// 값이 허용 목록에 속하는지 검사합니다.
///
/// 비교는 `PartialEq` 그대로이므로 `json!("0")`과 `json!(0)`은 서로 다릅니다.
/// 값이 `None`이면 통과합니다.
pub fn require_enum<T>(value: Option<&T>, allowed: &[&T], name: &str) -> Result<()>
where
    T: PartialEq + fmt::Debug + ?Sized,
{
    let Some(v) = value else {
        return Ok(());
    };
    if allowed.iter().any(|a| *a == v) {
        return Ok(());
    }
    let choices = allowed
        .iter()
        .map(|a| format!("{a:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    Err(fail(name, format!("must be one of: {choices}, got {v:?}")))
}

/// 10자 이상 소문자 16진수로만 된 값은 이름이 아니라 ID로 취급합니다.
const HEX_LIKE_MIN_LEN: usize = 10;

fn looks_like_hex_id(value: &str) -> bool {
    value.len() >= HEX_LIKE_MIN_LEN
        && value.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// 이름 형태 식별자 또는 12~64자 16진수 ID인지 검사합니다.
///
/// 10자 이상 16진수 문자열은 ID 길이 규칙(12~64자)을 따라야 합니다.
pub fn require_id(value: &str, name: &str) -> Result<()> {
    if looks_like_hex_id(value) {
        if HEX_ID.is_match(value) {
            return Ok(());
        }
        return Err(fail(
            name,
            format!("'{value}' looks like a hex ID but is not 12-64 characters"),
        ));
    }
    if NAME_ID.is_match(value) {
        return Ok(());
    }
    Err(fail(name, format!("'{value}' is not a valid name or ID")))
}

/// 이미지/플러그인 참조 형식인지 검사합니다.
///
/// `/`로 나눈 각 구간은 비어 있거나 `.`/`..`일 수 없습니다.
/// 이런 구간은 URL 정규화로 다른 엔드포인트를 가리키게 됩니다.
pub fn require_reference(value: &str, name: &str) -> Result<()> {
    if !REFERENCE.is_match(value) {
        return Err(fail(name, format!("'{value}' is not a valid image reference")));
    }
    if value
        .split('/')
        .any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(fail(
            name,
            format!("'{value}' contains an empty or relative path segment"),
        ));
    }
    Ok(())
}

/// 문자열이 유효한 JSON인지 검사합니다.
pub fn require_json(text: &str, name: &str) -> Result<()> {
    serde_json::from_str::<serde::de::IgnoredAny>(text)
        .map(|_| ())
        .map_err(|e| fail(name, format!("is not valid JSON: {e}")))
}

/// `<port>/<proto>` 형식인지 검사합니다 (`80/tcp`, `53/udp`, `9/sctp`).
pub fn require_port(text: &str, name: &str) -> Result<()> {
    if PORT.is_match(text) {
        return Ok(());
    }
    Err(fail(
        name,
        format!("'{text}' must look like <port>/<tcp|udp|sctp>"),
    ))
}

/// 시그널 이름 또는 10진수 시그널 번호인지 검사합니다.
pub fn require_signal(text: &str, name: &str) -> Result<()> {
    if SIGNALS.contains(&text) {
        return Ok(());
    }
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(());
    }
    Err(fail(name, format!("'{text}' is not a known signal")))
}

/// 이미 base64로 인코딩된 문자열인지 검사합니다.
///
/// decode 후 다시 encode한 결과가 원본과 같아야 통과합니다.
pub fn require_base64(text: &str, name: &str) -> Result<()> {
    let decoded = STANDARD
        .decode(text)
        .map_err(|e| fail(name, format!("is not valid base64: {e}")))?;
    if STANDARD.encode(decoded) != text {
        return Err(fail(name, "is not canonical base64"));
    }
    Ok(())
}

/// swarm 가입 토큰 형식인지 검사합니다.
pub fn require_swarm_token(text: &str, name: &str) -> Result<()> {
    if SWARM_TOKEN.is_match(text) {
        return Ok(());
    }
    Err(fail(name, "must start with 'SWMTKN-1-'"))
}

/// 객체에 특정 필드가 없어야 함을 검사합니다 (수정 불가 필드).
pub fn reject_field(payload: &Value, field: &str, name: &str) -> Result<()> {
    if payload.get(field).is_some() {
        return Err(fail(
            name,
            format!("field '{field}' cannot be changed by this call"),
        ));
    }
    Ok(())
}

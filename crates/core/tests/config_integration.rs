//! dockyard.toml 통합 설정 테스트
//!
//! - dockyard.toml.example 파싱 테스트
//! - 부분 설정 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use std::io::Write;

use dockyard_core::config::{ClientConfig, ClientConfigBuilder};
use dockyard_core::error::{ConfigError, DockerError};

const EXAMPLE: &str = include_str!("../../../dockyard.toml.example");

/// 테스트 동안 환경변수를 설정하고 원래 값을 되돌립니다.
fn with_env<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
    let originals: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(k, _)| ((*k).to_owned(), std::env::var(k).ok()))
        .collect();

    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        for (key, value) in vars {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    let result = f();

    // SAFETY: 테스트 정리
    unsafe {
        for (key, original) in originals {
            match original {
                Some(v) => std::env::set_var(&key, v),
                None => std::env::remove_var(&key),
            }
        }
    }

    result
}

// =============================================================================
// dockyard.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let config = ClientConfig::parse(EXAMPLE).expect("example config should parse");
    assert_eq!(config.host, "unix:///var/run/docker.sock");
    assert_eq!(config.api_version, "v1.45");
}

#[test]
fn example_config_passes_validation() {
    let config = ClientConfig::parse(EXAMPLE).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let config = ClientConfig::parse(EXAMPLE).expect("should parse");
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn example_config_resolves_to_socket_endpoint() {
    let config = ClientConfig::parse(EXAMPLE).expect("should parse");
    let endpoint = config.endpoint().expect("endpoint should resolve");
    assert_eq!(endpoint.base_url(), "http://localhost/v1.45");
    assert!(endpoint.socket_path().is_some());
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_host_only() {
    let config = ClientConfig::parse(r#"host = "http://127.0.0.1:2375""#).expect("should parse");
    assert_eq!(config.host, "http://127.0.0.1:2375");
    assert_eq!(config.timeout_secs, 60);
    assert_eq!(config.connect_timeout_secs, 10);
}

#[test]
fn partial_config_tls_section_only() {
    let toml = r#"
[tls]
verify = true
ca_cert = "/certs/ca.pem"
"#;
    let config = ClientConfig::parse(toml).expect("should parse");
    assert_eq!(config.tls.verify, Some(true));
    assert!(config.tls.cert.is_none());
    assert_eq!(config.host, "unix:///var/run/docker.sock");
}

#[test]
fn partial_config_tcp_with_tls_becomes_https() {
    let toml = r#"
host = "tcp://docker.internal:2376"

[tls]
verify = true
"#;
    let config = ClientConfig::parse(toml).expect("should parse");
    let endpoint = config.endpoint().expect("should resolve");
    assert_eq!(endpoint.base_url(), "https://docker.internal:2376/v1.45");
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let mut config =
        ClientConfig::parse(r#"host = "http://127.0.0.1:2375""#).expect("should parse");
    with_env(&[("DOCKER_HOST", Some("unix:///run/docker.sock"))], || {
        config.apply_env_overrides();
    });
    assert_eq!(config.host, "unix:///run/docker.sock");
}

#[test]
#[serial_test::serial]
fn env_override_cert_path_enables_client_certificates() {
    let mut config = ClientConfig::default();
    with_env(
        &[
            ("DOCKER_CERT_PATH", Some("/home/ci/.docker")),
            ("DOCKER_TLS_VERIFY", Some("1")),
        ],
        || config.apply_env_overrides(),
    );
    assert_eq!(config.tls.verify, Some(true));
    assert!(config.tls.cert.is_some());
    assert!(config.tls.ssl_key.is_some());
    config.validate().expect("cert and key come together");
}

#[test]
#[serial_test::serial]
fn env_cert_path_without_tls_verify_still_verifies() {
    let mut config = ClientConfig::default();
    with_env(
        &[
            ("DOCKER_CERT_PATH", Some("/home/ci/.docker")),
            ("DOCKER_TLS_VERIFY", None),
        ],
        || config.apply_env_overrides(),
    );
    assert!(config.tls.is_configured());
    assert_eq!(config.tls.verify, None);
    assert!(config.tls.verifies());
}

#[test]
fn tls_verification_defaults_on_and_only_explicit_false_disables_it() {
    let ca_only = ClientConfig::parse(
        r#"
host = "tcp://docker.internal:2376"

[tls]
ca_cert = "/certs/ca.pem"
"#,
    )
    .expect("should parse");
    assert!(ca_only.tls.verifies());
    assert_eq!(
        ca_only.endpoint().expect("should resolve").base_url(),
        "https://docker.internal:2376/v1.45"
    );

    let insecure = ClientConfig::parse(
        r#"
[tls]
verify = false
ca_cert = "/certs/ca.pem"
"#,
    )
    .expect("should parse");
    assert!(!insecure.tls.verifies());

    assert!(ClientConfig::default().tls.verifies());
}

#[test]
#[serial_test::serial]
fn env_override_numeric_fields() {
    let mut config = ClientConfig::default();
    with_env(
        &[
            ("DOCKYARD_TIMEOUT_SECS", Some("120")),
            ("DOCKYARD_CONNECT_TIMEOUT_SECS", Some("7")),
            ("DOCKYARD_RETRY_MAX_ATTEMPTS", Some("3")),
        ],
        || config.apply_env_overrides(),
    );
    assert_eq!(config.timeout_secs, 120);
    assert_eq!(config.connect_timeout_secs, 7);
    assert_eq!(config.retry_max_attempts, 3);
}

#[test]
#[serial_test::serial]
fn env_override_missing_var_keeps_toml_value() {
    let mut config = ClientConfig::parse("timeout_secs = 42").expect("should parse");
    with_env(&[("DOCKYARD_TIMEOUT_SECS", None)], || {
        config.apply_env_overrides();
    });
    assert_eq!(config.timeout_secs, 42);
}

#[test]
#[serial_test::serial]
fn from_env_validates_result() {
    let result = with_env(&[("DOCKER_HOST", Some("ftp://nope"))], ClientConfig::from_env);
    assert!(matches!(
        result,
        Err(DockerError::InvalidParameter { ref name, .. }) if name == "host"
    ));
}

// =============================================================================
// 에러 케이스
// =============================================================================

#[test]
fn empty_string_parses_with_defaults() {
    let config = ClientConfig::parse("").expect("should parse");
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn comments_only_parses_with_defaults() {
    let config = ClientConfig::parse("# nothing here\n# at all\n").expect("should parse");
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn malformed_toml_returns_parse_error() {
    let err = ClientConfig::parse("host = ").unwrap_err();
    assert!(err.to_string().contains("failed to parse config"));
}

#[test]
fn wrong_type_for_numeric_field() {
    assert!(ClientConfig::parse(r#"timeout_secs = "fast""#).is_err());
}

#[test]
fn builder_and_file_agree() {
    let from_builder = ClientConfigBuilder::new()
        .host("http://10.1.1.1:2375")
        .timeout_secs(15)
        .connect_timeout_secs(5)
        .build()
        .expect("valid");
    let from_toml = ClientConfig::parse(
        "host = \"http://10.1.1.1:2375\"\ntimeout_secs = 15\nconnect_timeout_secs = 5",
    )
    .expect("should parse");
    assert_eq!(from_builder, from_toml);
}

#[test]
fn config_error_displays_field() {
    let err = ClientConfigBuilder::new()
        .connect_timeout_secs(120)
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "connect_timeout_secs"));
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
async fn from_file_nonexistent_returns_file_not_found() {
    let err = ClientConfig::from_file("/tmp/dockyard_test_nonexistent_12345.toml")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("config file not found"));
}

#[tokio::test]
#[serial_test::serial]
async fn load_from_temp_file_applies_validation() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "host = \"http://127.0.0.1:2375\"\ntimeout_secs = 30").expect("write");

    let keys = [
        "DOCKER_HOST",
        "DOCKYARD_TIMEOUT_SECS",
        "DOCKYARD_CONNECT_TIMEOUT_SECS",
        "DOCKYARD_RETRY_MAX_ATTEMPTS",
        "DOCKER_TLS_VERIFY",
        "DOCKER_CERT_PATH",
    ];
    let originals: Vec<Option<String>> = keys.iter().map(|k| std::env::var(k).ok()).collect();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        for key in keys {
            std::env::remove_var(key);
        }
    }

    let result = ClientConfig::load(file.path()).await;

    // SAFETY: 테스트 정리
    unsafe {
        for (key, original) in keys.iter().zip(originals) {
            if let Some(v) = original {
                std::env::set_var(key, v);
            }
        }
    }

    let config = result.expect("should load");
    assert_eq!(config.host, "http://127.0.0.1:2375");
    assert_eq!(config.timeout_secs, 30);
}

/// 환경변수를 바꾼 상태로 `load`를 실행하고 원래 값을 되돌립니다.
async fn load_with_env(
    path: &std::path::Path,
    vars: &[(&str, Option<&str>)],
) -> Result<ClientConfig, DockerError> {
    let originals: Vec<Option<String>> = vars.iter().map(|(k, _)| std::env::var(k).ok()).collect();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        for (key, value) in vars {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    let result = ClientConfig::load(path).await;

    // SAFETY: 테스트 정리
    unsafe {
        for ((key, _), original) in vars.iter().zip(originals) {
            match original {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
    result
}

#[tokio::test]
#[serial_test::serial]
async fn load_rejects_invalid_values_in_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "timeout_secs = 0").expect("write");
    let err = load_with_env(file.path(), &[("DOCKYARD_TIMEOUT_SECS", None)])
        .await
        .unwrap_err();
    assert!(matches!(err, DockerError::InvalidParameter { ref name, .. } if name == "timeout_secs"));
}

#[tokio::test]
#[serial_test::serial]
async fn env_override_can_correct_an_invalid_file_value() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "timeout_secs = 0").expect("write");

    let raw = ClientConfig::from_file(file.path())
        .await
        .expect("from_file only parses");
    assert_eq!(raw.timeout_secs, 0);

    let config = load_with_env(file.path(), &[("DOCKYARD_TIMEOUT_SECS", Some("30"))])
        .await
        .expect("env value wins before validation");
    assert_eq!(config.timeout_secs, 30);
}

#[test]
fn serialize_and_reparse_roundtrip() {
    let original = ClientConfigBuilder::new()
        .host("https://docker.example:2376")
        .client_cert("/c/cert.pem", "/c/key.pem")
        .retry_max_attempts(2)
        .build()
        .expect("valid");
    let toml_str = toml::to_string_pretty(&original).expect("should serialize");
    let reparsed = ClientConfig::parse(&toml_str).expect("should reparse");
    assert_eq!(original, reparsed);
}

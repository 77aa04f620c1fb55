//! 연결 엔드포인트: 호스트 문자열 해석
//!
//! Docker 호스트 문자열을 실제 연결 대상과 논리 base URL로 나눕니다.
//!
//! | 입력 | 연결 | base URL |
//! |------|------|----------|
//! | `unix:///var/run/docker.sock` | Unix 소켓 | `http://localhost/v1.45` |
//! | `http://10.0.0.5:2375` | TCP | `http://10.0.0.5:2375/v1.45` |
//! | `https://docker.local:2376/v1.45` | TCP + TLS | 그대로 |
//! | `tcp://10.0.0.5:2376` | TCP (TLS 설정 시 https) | `http(s)://10.0.0.5:2376/v1.45` |

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{DockerError, Result};

/// 기본 Docker 소켓 호스트
pub const DEFAULT_HOST: &str = "unix:///var/run/docker.sock";

/// 기본 API 버전
pub const DEFAULT_API_VERSION: &str = "v1.45";

static API_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v1\.\d{1,3}$").expect("valid regex"));

/// 엔드포인트 연결 방식
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Unix 도메인 소켓
    Unix(PathBuf),
    /// 평문 HTTP
    Http,
    /// TLS HTTP
    Https,
}

/// 해석된 연결 엔드포인트
///
/// 클라이언트 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    transport: Transport,
    base_url: String,
}

impl Endpoint {
    /// 호스트 문자열과 API 버전으로 엔드포인트를 해석합니다.
    ///
    /// `tls`는 `tcp://` 호스트를 https로 취급할지 결정합니다.
    pub fn parse(host: &str, api_version: &str, tls: bool) -> Result<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(DockerError::invalid("host", "must not be empty"));
        }
        if !is_valid_api_version(api_version) {
            return Err(DockerError::invalid(
                "api_version",
                format!("'{api_version}' must look like v1.NN"),
            ));
        }

        if let Some(path) = host.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(DockerError::invalid("host", "unix socket path is empty"));
            }
            return Ok(Self {
                transport: Transport::Unix(PathBuf::from(path)),
                base_url: format!("http://localhost/{api_version}"),
            });
        }

        let normalized = match host.strip_prefix("tcp://") {
            Some(rest) if tls => format!("https://{rest}"),
            Some(rest) => format!("http://{rest}"),
            None => host.to_owned(),
        };

        let url = Url::parse(&normalized)
            .map_err(|e| DockerError::invalid("host", format!("'{host}' is not a valid URL: {e}")))?;
        let transport = match url.scheme() {
            "http" => Transport::Http,
            "https" => Transport::Https,
            other => {
                return Err(DockerError::invalid(
                    "host",
                    format!("unsupported scheme '{other}' (expected unix, tcp, http or https)"),
                ));
            }
        };
        if url.host_str().is_none_or(str::is_empty) {
            return Err(DockerError::invalid("host", format!("'{host}' has no host")));
        }

        let trimmed = normalized.trim_end_matches('/');
        let suffix = format!("/{api_version}");
        let base_url = if trimmed.ends_with(&suffix) {
            trimmed.to_owned()
        } else {
            format!("{trimmed}{suffix}")
        };

        Ok(Self {
            transport,
            base_url,
        })
    }

    /// 연결 방식
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// 버전이 포함된 논리 base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Unix 소켓 경로 (소켓 엔드포인트일 때만)
    pub fn socket_path(&self) -> Option<&Path> {
        match &self.transport {
            Transport::Unix(path) => Some(path),
            _ => None,
        }
    }

    /// TLS 사용 여부
    pub fn is_tls(&self) -> bool {
        self.transport == Transport::Https
    }

    /// 상대 경로와 쿼리 문자열로 전체 URL을 만듭니다.
    ///
    /// `query`는 빈 문자열이거나 `?`로 시작해야 합니다.
    pub fn url_for(&self, path: &str, query: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{path}{query}", self.base_url)
    }
}

/// `v1.NN` 형식 검사
pub fn is_valid_api_version(version: &str) -> bool {
    API_VERSION.is_match(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_socket_uses_localhost_base() {
        let ep = Endpoint::parse(DEFAULT_HOST, DEFAULT_API_VERSION, false).unwrap();
        assert_eq!(ep.base_url(), "http://localhost/v1.45");
        assert_eq!(ep.socket_path(), Some(Path::new("/var/run/docker.sock")));
        assert!(!ep.is_tls());
    }

    #[test]
    fn http_gets_version_appended() {
        let ep = Endpoint::parse("http://10.0.0.5:2375", "v1.45", false).unwrap();
        assert_eq!(ep.base_url(), "http://10.0.0.5:2375/v1.45");
        assert_eq!(ep.transport(), &Transport::Http);
        assert!(ep.socket_path().is_none());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let ep = Endpoint::parse("http://docker.local:2375/", "v1.45", false).unwrap();
        assert_eq!(ep.base_url(), "http://docker.local:2375/v1.45");
    }

    #[test]
    fn existing_version_suffix_is_kept() {
        let ep = Endpoint::parse("https://docker.local:2376/v1.45", "v1.45", false).unwrap();
        assert_eq!(ep.base_url(), "https://docker.local:2376/v1.45");
        assert!(ep.is_tls());
    }

    #[test]
    fn tcp_alias_follows_tls_setting() {
        let plain = Endpoint::parse("tcp://10.0.0.5:2375", "v1.45", false).unwrap();
        assert_eq!(plain.base_url(), "http://10.0.0.5:2375/v1.45");

        let secure = Endpoint::parse("tcp://10.0.0.5:2376", "v1.45", true).unwrap();
        assert_eq!(secure.base_url(), "https://10.0.0.5:2376/v1.45");
        assert!(secure.is_tls());
    }

    #[test]
    fn url_for_joins_path_and_query() {
        let ep = Endpoint::parse("http://h:2375", "v1.45", false).unwrap();
        assert_eq!(
            ep.url_for("/containers/json", "?all=true"),
            "http://h:2375/v1.45/containers/json?all=true"
        );
        assert_eq!(ep.url_for("_ping", ""), "http://h:2375/v1.45/_ping");
    }

    #[test]
    fn rejects_empty_and_unknown_schemes() {
        for host in ["", "   ", "unix://", "ftp://h:21", "npipe:////./pipe/docker_engine"] {
            let err = Endpoint::parse(host, "v1.45", false).unwrap_err();
            assert!(
                matches!(err, DockerError::InvalidParameter { ref name, .. } if name == "host"),
                "host {host:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn rejects_bad_api_version() {
        for version in ["1.45", "v2.0", "v1.", "latest"] {
            let err = Endpoint::parse(DEFAULT_HOST, version, false).unwrap_err();
            assert!(
                matches!(err, DockerError::InvalidParameter { ref name, .. } if name == "api_version")
            );
        }
    }

    #[test]
    fn custom_api_version_is_used() {
        let ep = Endpoint::parse("unix:///run/user/1000/docker.sock", "v1.43", false).unwrap();
        assert_eq!(ep.base_url(), "http://localhost/v1.43");
    }
}

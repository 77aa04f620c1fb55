//! 레지스트리 인증 헤더
//!
//! 이미지 push/pull, 서비스 생성/수정, 플러그인 설치는
//! `X-Registry-Auth` 헤더에 base64url(JSON) 인코딩된 자격 증명을 받습니다.
//! 빌드는 여러 레지스트리를 담은 `X-Registry-Config`를 받습니다.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use serde::{Deserialize, Serialize};

use crate::error::{DockerError, Result};

/// 단일 레지스트리 인증 헤더 이름
pub const REGISTRY_AUTH_HEADER: &str = "X-Registry-Auth";

/// 빌드용 다중 레지스트리 설정 헤더 이름
pub const REGISTRY_CONFIG_HEADER: &str = "X-Registry-Config";

/// 레지스트리 자격 증명
///
/// 사용자 이름/비밀번호 또는 identity token 중 하나를 사용합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAuth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serveraddress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identitytoken: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrytoken: Option<String>,
}

impl RegistryAuth {
    /// 사용자 이름/비밀번호 자격 증명
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    /// identity token 자격 증명
    pub fn token(identity_token: impl Into<String>) -> Self {
        Self {
            identitytoken: Some(identity_token.into()),
            ..Self::default()
        }
    }

    /// 레지스트리 주소를 지정합니다.
    pub fn server(mut self, address: impl Into<String>) -> Self {
        self.serveraddress = Some(address.into());
        self
    }

    /// `X-Registry-Auth` 헤더 값 (base64url(JSON))
    pub fn header_value(&self) -> Result<String> {
        encode_json(self, REGISTRY_AUTH_HEADER)
    }

    /// 헤더 값을 해석합니다.
    pub fn from_header(value: &str) -> Result<Self> {
        decode_json(value, REGISTRY_AUTH_HEADER)
    }
}

/// 빌드용 다중 레지스트리 자격 증명 (레지스트리 주소 → 자격 증명)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryConfig(BTreeMap<String, RegistryAuth>);

impl RegistryConfig {
    /// 빈 설정을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 레지스트리 자격 증명을 추가합니다.
    pub fn with(mut self, registry: impl Into<String>, auth: RegistryAuth) -> Self {
        self.0.insert(registry.into(), auth);
        self
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `X-Registry-Config` 헤더 값
    pub fn header_value(&self) -> Result<String> {
        encode_json(self, REGISTRY_CONFIG_HEADER)
    }
}

fn encode_json<T: Serialize>(value: &T, name: &str) -> Result<String> {
    let json = serde_json::to_vec(value)
        .map_err(|e| DockerError::invalid(name, format!("cannot serialize credentials: {e}")))?;
    Ok(URL_SAFE.encode(json))
}

fn decode_json<T: for<'de> Deserialize<'de>>(value: &str, name: &str) -> Result<T> {
    let raw = URL_SAFE
        .decode(value)
        .map_err(|e| DockerError::invalid(name, format!("invalid base64url: {e}")))?;
    serde_json::from_slice(&raw)
        .map_err(|e| DockerError::invalid(name, format!("invalid credentials JSON: {e}")))
}

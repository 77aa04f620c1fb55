#![doc = include_str!("../README.md")]

pub mod auth;
pub mod body;
pub mod config;
pub mod container;
pub mod endpoint;
pub mod error;
pub mod filters;
pub mod metrics;
pub mod query;
pub mod validate;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, DockerError, ErrorKind, Result};

// 설정
pub use config::{ClientConfig, ClientConfigBuilder, TlsConfig};
pub use endpoint::Endpoint;

// 요청 구성
pub use auth::{RegistryAuth, RegistryConfig};
pub use body::{MultipartPart, RequestBody};
pub use filters::{FilterRules, Filters};
pub use query::{Query, build_query};

// 컨테이너 요청 빌더
pub use container::{
    ContainerCreateRequest, ContainerUpdateRequest, HostConfig, RequestPayload,
};

#![doc = include_str!("../README.md")]

pub mod api;
pub mod docker;
pub mod mux;
pub mod resources;
pub mod response;
pub mod transport;

// --- 주요 타입 re-export ---

// 파사드와 요청 파이프라인
pub use api::{ApiClient, RetryPolicy};
pub use docker::Docker;
pub use transport::{ApiRequest, HttpTransport, Transport};

// 응답과 스트림
pub use mux::{LogFrame, LogFrameDecoder, StreamKind};
pub use response::{ApiResponse, ByteStream, MAX_JSON_LINE_LEN};

// 공통 타입 (dockyard-core)
pub use dockyard_core::{
    ClientConfig, ClientConfigBuilder, ConfigError, ContainerCreateRequest,
    ContainerUpdateRequest, DockerError, ErrorKind, Filters, RegistryAuth, RegistryConfig,
    Result,
};

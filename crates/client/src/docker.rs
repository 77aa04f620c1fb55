//! `Docker` 파사드
//!
//! 연결 문자열이나 [`ClientConfig`]로 전송 계층을 한 번 만들고,
//! 모든 리소스 클라이언트가 같은 [`ApiClient`]를 공유합니다.

use std::sync::Arc;

use dockyard_core::config::ClientConfig;
use dockyard_core::error::Result;
use tracing::{debug, info};

use crate::api::{ApiClient, RetryPolicy};
use crate::resources::configs::Configs;
use crate::resources::containers::Containers;
use crate::resources::exec::Exec;
use crate::resources::images::Images;
use crate::resources::networks::Networks;
use crate::resources::nodes::Nodes;
use crate::resources::plugins::Plugins;
use crate::resources::secrets::Secrets;
use crate::resources::services::Services;
use crate::resources::swarm::Swarm;
use crate::resources::system::System;
use crate::resources::tasks::Tasks;
use crate::resources::volumes::Volumes;
use crate::transport::{HttpTransport, Transport};

/// Docker Engine API 클라이언트
///
/// # 사용 예시
///
/// ```no_run
/// # async fn run() -> dockyard_client::Result<()> {
/// use dockyard_client::Docker;
///
/// let docker = Docker::connect("unix:///var/run/docker.sock")?;
/// let version = docker.system().version().await?;
/// println!("{}", version["ApiVersion"]);
/// # Ok(())
/// # }
/// ```
pub struct Docker<T: Transport = HttpTransport> {
    api: ApiClient<T>,
}

impl<T: Transport> Clone for Docker<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
        }
    }
}

impl<T: Transport> std::fmt::Debug for Docker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Docker").field("api", &self.api).finish()
    }
}

impl Docker<HttpTransport> {
    /// 연결 문자열(`unix://`, `tcp://`, `http://`, `https://`)로 연결합니다.
    ///
    /// 나머지 설정은 기본값을 사용합니다.
    pub fn connect(host: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::for_host(host))
    }

    /// `DOCKER_HOST` 등 환경변수를 반영한 기본 설정으로 연결합니다.
    pub fn connect_local() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// 설정으로 연결합니다. 설정은 먼저 검증됩니다.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        info!(
            host = %config.host,
            api_version = %config.api_version,
            retry_max_attempts = config.retry_max_attempts,
            "docker client configured"
        );
        let api = ApiClient::new(transport).with_retry(RetryPolicy::from_config(&config));
        Ok(Self { api })
    }
}

impl<T: Transport> Docker<T> {
    /// 임의의 전송 계층으로 생성합니다. 재시도는 꺼져 있습니다.
    pub fn with_transport(transport: T) -> Self {
        Self {
            api: ApiClient::new(transport),
        }
    }

    /// 공유 중인 전송 계층과 설정의 재시도 정책으로 생성합니다.
    pub fn with_shared_transport(transport: Arc<T>, config: &ClientConfig) -> Self {
        Self {
            api: ApiClient::from_shared(transport).with_retry(RetryPolicy::from_config(config)),
        }
    }

    /// 내부 호출기. 리소스 클라이언트가 다루지 않는 엔드포인트에 사용합니다.
    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    pub fn containers(&self) -> Containers<T> {
        Containers::new(self.api.clone())
    }

    pub fn images(&self) -> Images<T> {
        Images::new(self.api.clone())
    }

    pub fn networks(&self) -> Networks<T> {
        Networks::new(self.api.clone())
    }

    pub fn volumes(&self) -> Volumes<T> {
        Volumes::new(self.api.clone())
    }

    pub fn exec(&self) -> Exec<T> {
        Exec::new(self.api.clone())
    }

    pub fn system(&self) -> System<T> {
        System::new(self.api.clone())
    }

    pub fn swarm(&self) -> Swarm<T> {
        Swarm::new(self.api.clone())
    }

    pub fn nodes(&self) -> Nodes<T> {
        Nodes::new(self.api.clone())
    }

    pub fn services(&self) -> Services<T> {
        Services::new(self.api.clone())
    }

    pub fn tasks(&self) -> Tasks<T> {
        Tasks::new(self.api.clone())
    }

    pub fn secrets(&self) -> Secrets<T> {
        Secrets::new(self.api.clone())
    }

    pub fn configs(&self) -> Configs<T> {
        Configs::new(self.api.clone())
    }

    pub fn plugins(&self) -> Plugins<T> {
        Plugins::new(self.api.clone())
    }

    /// 데몬이 응답하는지 확인합니다.
    ///
    /// 에러를 반환하지 않는 유일한 호출입니다. 실패 원인은 `debug` 로그로만 남습니다.
    pub async fn ping(&self) -> bool {
        match self.system().ping().await {
            Ok(body) => body.trim() == "OK",
            Err(e) => {
                debug!(error = %e, "ping failed");
                false
            }
        }
    }
}

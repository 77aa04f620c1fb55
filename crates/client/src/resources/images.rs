//! 이미지 엔드포인트 (`/images/*`, `/build`, `/commit`, `/distribution`)

use std::collections::BTreeMap;

use bytes::Bytes;
use dockyard_core::auth::{REGISTRY_AUTH_HEADER, REGISTRY_CONFIG_HEADER, RegistryAuth, RegistryConfig};
use dockyard_core::body::RequestBody;
use dockyard_core::error::{DockerError, Result};
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::query::Query;
use dockyard_core::validate;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{apply_filters, filter_query, path_segment, resource_client, with_auth};
use crate::response::ByteStream;
use crate::transport::{ApiRequest, Transport};

pub const LIST_FILTERS: FilterRules =
    FilterRules::new(&["before", "dangling", "label", "reference", "since", "until"])
        .with_enums(&[("dangling", &["true", "false"])]);

pub const BUILD_PRUNE_FILTERS: FilterRules = FilterRules::new(&[
    "until",
    "id",
    "parent",
    "type",
    "description",
    "inuse",
    "shared",
    "private",
]);

pub const SEARCH_FILTERS: FilterRules = FilterRules::new(&["is-official", "stars"])
    .with_enums(&[("is-official", &["true", "false"])]);

pub const PRUNE_FILTERS: FilterRules = FilterRules::new(&["dangling", "until", "label"])
    .with_enums(&[("dangling", &["true", "false"])]);

/// `list` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageListOptions {
    /// 중간 레이어 이미지 포함
    pub all: Option<bool>,
    #[serde(rename = "shared-size")]
    pub shared_size: Option<bool>,
    pub digests: Option<bool>,
    pub manifests: Option<bool>,
    #[serde(skip)]
    pub filters: Filters,
}

/// `build` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildOptions {
    /// 컨텍스트 내 Dockerfile 경로
    pub dockerfile: Option<String>,
    /// `name:tag`
    pub t: Option<String>,
    pub extrahosts: Option<String>,
    /// 원격 컨텍스트 URL
    pub remote: Option<String>,
    /// 진행 출력 억제
    pub q: Option<bool>,
    pub nocache: Option<bool>,
    /// JSON 배열 문자열
    pub cachefrom: Option<String>,
    pub pull: Option<String>,
    pub rm: Option<bool>,
    pub forcerm: Option<bool>,
    pub memory: Option<i64>,
    pub memswap: Option<i64>,
    pub cpushares: Option<i64>,
    pub cpusetcpus: Option<String>,
    pub cpuperiod: Option<i64>,
    pub cpuquota: Option<i64>,
    pub buildargs: Option<BTreeMap<String, String>>,
    pub shmsize: Option<i64>,
    pub squash: Option<bool>,
    pub labels: Option<BTreeMap<String, String>>,
    pub networkmode: Option<String>,
    pub platform: Option<String>,
    pub target: Option<String>,
    pub outputs: Option<String>,
}

/// `build_prune` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildPruneOptions {
    /// 남겨 둘 캐시 용량 (바이트)
    #[serde(rename = "keep-storage")]
    pub keep_storage: Option<i64>,
    pub all: Option<bool>,
    #[serde(skip)]
    pub filters: Filters,
}

/// `create` (pull) 옵션
///
/// `from_image` 또는 `from_src` 중 하나가 필요합니다.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageCreateOptions {
    #[serde(rename = "fromImage")]
    pub from_image: Option<String>,
    #[serde(rename = "fromSrc")]
    pub from_src: Option<String>,
    pub repo: Option<String>,
    pub tag: Option<String>,
    pub message: Option<String>,
    pub platform: Option<String>,
}

impl ImageCreateOptions {
    /// 레지스트리에서 pull 하는 옵션
    pub fn pull(image: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            from_image: Some(image.into()),
            tag: Some(tag.into()),
            ..Self::default()
        }
    }
}

/// `import` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageImportOptions {
    pub repo: Option<String>,
    pub tag: Option<String>,
    pub message: Option<String>,
    pub platform: Option<String>,
}

/// `remove` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageRemoveOptions {
    pub force: Option<bool>,
    pub noprune: Option<bool>,
}

/// `commit` 옵션
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitOptions {
    /// 커밋할 컨테이너 (필수)
    pub container: String,
    pub repo: Option<String>,
    pub tag: Option<String>,
    pub comment: Option<String>,
    pub author: Option<String>,
    pub pause: Option<bool>,
    /// Dockerfile 지시문
    pub changes: Option<String>,
}

resource_client!(
    /// 이미지 클라이언트
    Images
);

impl<T: Transport> Images<T> {
    fn path(name: &str, action: &str) -> String {
        format!("/images/{}/{action}", path_segment(name))
    }

    /// 이미지 목록
    pub async fn list(&self, options: &ImageListOptions) -> Result<Value> {
        let mut query = Query::from_options(options)?;
        apply_filters(&mut query, &options.filters, &LIST_FILTERS)?;
        self.api.json(ApiRequest::get("/images/json").query(query)).await
    }

    /// tar 컨텍스트로 이미지를 빌드합니다. 진행 상황은 줄 단위 JSON입니다.
    ///
    /// `remote`를 지정하면 컨텍스트는 비워도 됩니다.
    pub async fn build(
        &self,
        context: impl Into<Bytes>,
        options: &BuildOptions,
        registry_config: Option<&RegistryConfig>,
    ) -> Result<ByteStream> {
        let context = context.into();
        if context.is_empty() && options.remote.is_none() {
            return Err(DockerError::invalid(
                "context",
                "a tar build context or a remote URL is required",
            ));
        }
        if let Some(tag) = options.t.as_deref() {
            validate::require_reference(tag, "t")?;
        }
        if let Some(cache_from) = options.cachefrom.as_deref() {
            validate::require_json(cache_from, "cachefrom")?;
        }

        let mut request = ApiRequest::post("/build").query(Query::from_options(options)?);
        if !context.is_empty() {
            request = request.body(RequestBody::tar(context));
        }
        if let Some(config) = registry_config.filter(|c| !c.is_empty()) {
            request = request.header(REGISTRY_CONFIG_HEADER, config.header_value()?);
        }
        self.api.stream(request).await
    }

    /// 빌드 캐시 정리
    pub async fn build_prune(&self, options: &BuildPruneOptions) -> Result<Value> {
        validate::require_int_range(options.keep_storage, "keep-storage", Some(0), None)?;
        let mut query = Query::from_options(options)?;
        apply_filters(&mut query, &options.filters, &BUILD_PRUNE_FILTERS)?;
        self.api.json(ApiRequest::post("/build/prune").query(query)).await
    }

    /// 이미지를 pull 하거나 URL에서 가져옵니다.
    pub async fn create(
        &self,
        options: &ImageCreateOptions,
        auth: Option<&RegistryAuth>,
    ) -> Result<ByteStream> {
        match (options.from_image.as_deref(), options.from_src.as_deref()) {
            (Some(image), _) => validate::require_reference(image, "fromImage")?,
            (None, Some(src)) => validate::require_string(Some(src), "fromSrc")?,
            (None, None) => {
                return Err(DockerError::invalid(
                    "fromImage",
                    "either fromImage or fromSrc is required",
                ));
            }
        }
        let request = ApiRequest::post("/images/create").query(Query::from_options(options)?);
        self.api.stream(with_auth(request, auth)?).await
    }

    /// tar 아카이브를 이미지로 가져옵니다 (`fromSrc=-`).
    pub async fn import(
        &self,
        archive: impl Into<Bytes>,
        options: &ImageImportOptions,
    ) -> Result<ByteStream> {
        let archive = archive.into();
        if archive.is_empty() {
            return Err(DockerError::invalid("archive", "must not be empty"));
        }
        let mut query = Query::new().param("fromSrc", "-");
        query.merge(Query::from_options(options)?);
        let request = ApiRequest::post("/images/create")
            .query(query)
            .body(RequestBody::tar(archive));
        self.api.stream(request).await
    }

    /// 이미지 상세 정보
    pub async fn inspect(&self, name: &str) -> Result<Value> {
        validate::require_reference(name, "name")?;
        self.api.json(ApiRequest::get(Self::path(name, "json"))).await
    }

    /// 레이어 이력
    pub async fn history(&self, name: &str) -> Result<Value> {
        validate::require_reference(name, "name")?;
        self.api.json(ApiRequest::get(Self::path(name, "history"))).await
    }

    /// 레지스트리로 push 합니다.
    ///
    /// 데몬은 인증 헤더를 항상 요구하므로, 인증 정보가 없으면 빈 객체를 보냅니다.
    pub async fn push(
        &self,
        name: &str,
        tag: Option<&str>,
        auth: Option<&RegistryAuth>,
    ) -> Result<ByteStream> {
        validate::require_reference(name, "name")?;
        let header = auth.cloned().unwrap_or_default().header_value()?;
        let request = ApiRequest::post(Self::path(name, "push"))
            .query(Query::new().param("tag", tag))
            .header(REGISTRY_AUTH_HEADER, header);
        self.api.stream(request).await
    }

    /// 새 이름으로 태그를 붙입니다.
    pub async fn tag(&self, name: &str, repo: &str, tag: Option<&str>) -> Result<()> {
        validate::require_reference(name, "name")?;
        validate::require_reference(repo, "repo")?;
        let query = Query::new().param("repo", repo).param("tag", tag);
        self.api
            .empty(ApiRequest::post(Self::path(name, "tag")).query(query))
            .await
    }

    /// 이미지 삭제. 응답은 `Untagged`/`Deleted` 항목 목록입니다.
    pub async fn remove(&self, name: &str, options: &ImageRemoveOptions) -> Result<Value> {
        validate::require_reference(name, "name")?;
        let request = ApiRequest::delete(format!("/images/{}", path_segment(name)))
            .query(Query::from_options(options)?);
        self.api.json(request).await
    }

    /// Docker Hub 검색
    pub async fn search(&self, term: &str, limit: Option<i64>, filters: &Filters) -> Result<Value> {
        validate::require_string(Some(term), "term")?;
        validate::require_int_range(limit, "limit", Some(1), None)?;
        let mut query = Query::new().param("term", term).param("limit", limit);
        apply_filters(&mut query, filters, &SEARCH_FILTERS)?;
        self.api.json(ApiRequest::get("/images/search").query(query)).await
    }

    /// 사용하지 않는 이미지 정리
    pub async fn prune(&self, filters: &Filters) -> Result<Value> {
        let query = filter_query(filters, &PRUNE_FILTERS)?;
        self.api.json(ApiRequest::post("/images/prune").query(query)).await
    }

    /// 컨테이너를 이미지로 커밋합니다. `config`는 컨테이너 설정 덮어쓰기입니다.
    pub async fn commit(&self, options: &CommitOptions, config: Option<Value>) -> Result<Value> {
        validate::require_id(&options.container, "container")?;
        if let Some(repo) = options.repo.as_deref() {
            validate::require_reference(repo, "repo")?;
        }
        let body = match config {
            Some(config) => {
                validate::require_object(&config, "config")?;
                config
            }
            None => Value::Object(Map::new()),
        };
        let request = ApiRequest::post("/commit")
            .query(Query::from_options(options)?)
            .body(RequestBody::Json(body));
        self.api.json(request).await
    }

    /// 이미지 하나를 tar로 내보냅니다.
    pub async fn export(&self, name: &str) -> Result<ByteStream> {
        validate::require_reference(name, "name")?;
        self.api.stream(ApiRequest::get(Self::path(name, "get"))).await
    }

    /// 여러 이미지를 하나의 tar로 내보냅니다.
    pub async fn export_multiple(&self, names: &[&str]) -> Result<ByteStream> {
        if names.is_empty() {
            return Err(DockerError::invalid("names", "must not be empty"));
        }
        for name in names {
            validate::require_reference(name, "names")?;
        }
        let mut query = Query::new();
        query.push_repeated("names", names.iter().copied());
        self.api.stream(ApiRequest::get("/images/get").query(query)).await
    }

    /// `export`로 만든 tar를 불러옵니다.
    pub async fn load(&self, archive: impl Into<Bytes>, quiet: bool) -> Result<ByteStream> {
        let archive = archive.into();
        if archive.is_empty() {
            return Err(DockerError::invalid("archive", "must not be empty"));
        }
        let request = ApiRequest::post("/images/load")
            .query(Query::new().param("quiet", quiet.then_some(true)))
            .body(RequestBody::tar(archive));
        self.api.stream(request).await
    }

    /// 레지스트리의 manifest 정보
    pub async fn distribution(&self, name: &str, auth: Option<&RegistryAuth>) -> Result<Value> {
        validate::require_reference(name, "name")?;
        let request = ApiRequest::get(format!("/distribution/{}/json", path_segment(name)));
        self.api.json(with_auth(request, auth)?).await
    }
}

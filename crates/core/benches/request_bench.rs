//! 요청 구성 벤치마크
//!
//! 파라미터 검증, 쿼리 문자열 생성, 필터 인코딩, 컨테이너 요청 직렬화 성능을 측정합니다.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use dockyard_core::filters::{FilterRules, Filters};
use dockyard_core::query::{Query, build_query};
use dockyard_core::{ContainerCreateRequest, validate};
use serde_json::json;

const CONTAINER_LIST: FilterRules = FilterRules::new(&[
    "ancestor", "before", "expose", "exited", "health", "id", "label", "name", "network",
    "publish", "since", "status", "volume",
])
.with_enums(&[(
    "status",
    &["created", "restarting", "running", "removing", "paused", "exited", "dead"],
)]);

fn bench_validation(c: &mut Criterion) {
    let hex_id = "4f66ad9a0b2e0d1c7e5f3a8b9c6d2e1f0a9b8c7d6e5f4a3b2c1d0e9f8a7b6c5d";

    let mut group = c.benchmark_group("validation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("require_id_name", |b| {
        b.iter(|| validate::require_id(black_box("web-frontend_1.2"), "id"))
    });
    group.bench_function("require_id_hex64", |b| {
        b.iter(|| validate::require_id(black_box(hex_id), "id"))
    });
    group.bench_function("require_port", |b| {
        b.iter(|| validate::require_port(black_box("8080/tcp"), "port"))
    });
    group.bench_function("require_signal", |b| {
        b.iter(|| validate::require_signal(black_box("SIGWINCH"), "signal"))
    });
    group.bench_function("require_base64", |b| {
        b.iter(|| validate::require_base64(black_box("aGVsbG8gd29ybGQ="), "Data"))
    });

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let params = json!({
        "all": true,
        "limit": 50,
        "size": null,
        "since": "",
        "filters": {"status": ["running"], "label": ["env=prod", "tier=web"]}
    });
    let map = params.as_object().cloned().unwrap_or_default();

    let mut group = c.benchmark_group("query");
    group.bench_function("build_query_mixed", |b| {
        b.iter(|| build_query(black_box(&map)))
    });
    group.bench_function("query_builder_chain", |b| {
        b.iter(|| {
            Query::new()
                .param("fromImage", black_box("registry.local:5000/team/app"))
                .param("tag", "v2")
                .param("platform", "linux/amd64")
                .to_string()
        })
    });
    group.finish();
}

fn bench_filters(c: &mut Criterion) {
    let filters = Filters::new()
        .add("status", "running")
        .add("label", "env=prod")
        .add("label", "tier=web")
        .add("name", "api");

    let mut group = c.benchmark_group("filters");
    group.bench_function("validate", |b| {
        b.iter(|| black_box(&filters).validate(&CONTAINER_LIST))
    });
    group.bench_function("encode", |b| {
        b.iter(|| black_box(&filters).to_query_value())
    });
    group.finish();
}

fn bench_container_request(c: &mut Criterion) {
    let request = ContainerCreateRequest::new("nginx:1.27")
        .env("MODE", "prod")
        .env("WORKERS", "4")
        .label("team", "edge")
        .publish("80/tcp", None, "8080")
        .memory(256 * 1024 * 1024)
        .restart_policy("unless-stopped", None);

    let mut group = c.benchmark_group("container_request");
    group.bench_function("to_value", |b| {
        b.iter(|| black_box(&request).to_value())
    });
    group.bench_function("build_and_serialize", |b| {
        b.iter(|| {
            ContainerCreateRequest::new(black_box("alpine:3.20"))
                .cmd(["sh", "-c", "sleep 3600"])
                .env("TZ", "UTC")
                .to_value()
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_validation,
    bench_query,
    bench_filters,
    bench_container_request
);
criterion_main!(benches);

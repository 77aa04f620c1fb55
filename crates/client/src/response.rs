//! 응답 및 바이트 스트림
//!
//! [`ApiResponse`]의 본문은 한 번만 소비할 수 있습니다.
//! JSON, 문자열, 또는 [`ByteStream`] 중 하나로 꺼냅니다.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use dockyard_core::error::{DockerError, Result};
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::io::StreamReader;

use crate::mux::{LogFrame, LogFrameDecoder};

/// 줄 단위 JSON 스트림에서 한 레코드의 최대 길이 (8 MiB)
pub const MAX_JSON_LINE_LEN: usize = 8 * 1024 * 1024;

/// 전송 계층이 돌려준 원시 응답 (상태 코드 검사 전)
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ByteStream,
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// 성공 응답
///
/// 상태 코드가 400 미만인 응답만 이 타입으로 노출됩니다.
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ByteStream,
}

impl ApiResponse {
    pub(crate) fn from_raw(raw: RawResponse) -> Self {
        Self {
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
        }
    }

    /// 상태 코드
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// 응답 헤더
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// 헤더 값 (ASCII가 아니면 `None`)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// 본문을 JSON으로 해석합니다.
    ///
    /// 빈 본문은 `{}`로 취급합니다. 해석 실패는 `Transport` 에러입니다.
    pub async fn into_json(self) -> Result<Value> {
        let body = self.body.collect_bytes().await?;
        parse_json_body(&body)
    }

    /// 본문을 문자열로 읽습니다.
    pub async fn into_string(self) -> Result<String> {
        self.body.collect_string().await
    }

    /// 본문 전체를 바이트로 읽습니다.
    pub async fn into_bytes(self) -> Result<Bytes> {
        self.body.collect_bytes().await
    }

    /// 본문을 스트림으로 넘깁니다.
    pub fn into_stream(self) -> ByteStream {
        self.body
    }
}

pub(crate) fn parse_json_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(body)
        .map_err(|e| DockerError::transport_with("invalid JSON in response body", e))
}

/// 응답 본문 청크 스트림
///
/// 한 번만 순회할 수 있으며, 끝나면 `None`을 반환합니다.
pub struct ByteStream {
    inner: BoxStream<'static, Result<Bytes>>,
}

impl ByteStream {
    /// 임의의 청크 스트림을 감쌉니다.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    /// 단일 청크 스트림을 만듭니다. 빈 입력은 빈 스트림입니다.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Self::empty();
        }
        Self::new(stream::once(async move { Ok(bytes) }))
    }

    /// 빈 스트림
    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    /// 전체 본문을 버퍼링합니다.
    pub async fn collect_bytes(mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.inner.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// 전체 본문을 문자열로 버퍼링합니다 (잘못된 UTF-8은 대체 문자로 치환).
    pub async fn collect_string(self) -> Result<String> {
        let bytes = self.collect_bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// 줄 단위 JSON 레코드 스트림 (빌드/풀 진행 상황, 이벤트)
    ///
    /// 빈 줄은 건너뜁니다. 한 줄이 [`MAX_JSON_LINE_LEN`]을 넘으면 에러를 내고 끝납니다.
    pub fn json_lines(self) -> BoxStream<'static, Result<Value>> {
        self.json_lines_limited(MAX_JSON_LINE_LEN)
    }

    fn json_lines_limited(self, max_line_len: usize) -> BoxStream<'static, Result<Value>> {
        FramedRead::new(
            self.into_reader(),
            LinesCodec::new_with_max_length(max_line_len),
        )
        .filter_map(move |line| async move {
            match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(serde_json::from_str(&line).map_err(|e| {
                    DockerError::transport_with("invalid JSON record in stream", e)
                })),
                Err(LinesCodecError::Io(e)) => {
                    Some(Err(DockerError::transport_with("stream read failed", e)))
                }
                Err(e @ LinesCodecError::MaxLineLengthExceeded) => Some(Err(
                    DockerError::transport_with(
                        format!("stream record exceeds {max_line_len} bytes"),
                        e,
                    ),
                )),
            }
        })
        .boxed()
    }

    /// TTY 없이 연결된 로그/attach 스트림의 stdout/stderr 프레임을 분리합니다.
    pub fn demux(self) -> BoxStream<'static, Result<LogFrame>> {
        FramedRead::new(self.into_reader(), LogFrameDecoder::new())
            .map(|frame| {
                frame.map_err(|e| DockerError::transport_with("invalid multiplexed stream", e))
            })
            .boxed()
    }

    /// `AsyncRead`로 변환합니다 (tar 아카이브를 파일로 복사할 때 등).
    pub fn into_reader(self) -> impl tokio::io::AsyncRead + Send + Unpin + 'static {
        StreamReader::new(self.inner.map(|chunk| chunk.map_err(std::io::Error::other)))
    }
}

impl Stream for ByteStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream").finish_non_exhaustive()
    }
}

//! 다중화된 stdout/stderr 스트림 디코더
//!
//! TTY 없이 생성된 컨테이너의 logs/attach 응답은 프레임마다 8바이트 헤더가 붙습니다.
//!
//! ```text
//! [stream_type, 0, 0, 0, size_be32...][payload; size]
//! ```
//!
//! `stream_type`은 0 = stdin, 1 = stdout, 2 = stderr, 3 = 데몬 시스템 에러입니다.

use std::fmt;
use std::io;

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;

/// 프레임 헤더 길이
pub const HEADER_LEN: usize = 8;

/// 한 번에 미리 확보할 최대 버퍼 크기
const MAX_RESERVE: usize = 64 * 1024;

/// 프레임 출처
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdin,
    Stdout,
    Stderr,
    /// attach 도중 데몬이 보낸 에러
    System,
}

impl StreamKind {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Stdin),
            1 => Some(Self::Stdout),
            2 => Some(Self::Stderr),
            3 => Some(Self::System),
            _ => None,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stdin => "stdin",
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::System => "system",
        };
        f.write_str(name)
    }
}

/// 디코딩된 프레임
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFrame {
    pub stream: StreamKind,
    pub data: Bytes,
}

impl LogFrame {
    /// 본문을 문자열로 (잘못된 UTF-8은 대체 문자로 치환)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// 8바이트 헤더 프레임 디코더
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFrameDecoder {
    _private: (),
}

impl LogFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for LogFrameDecoder {
    type Item = LogFrame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<LogFrame>, io::Error> {
        if src.len() < HEADER_LEN {
            return Ok(None);
        }

        let stream = StreamKind::from_byte(src[0]).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown stream type {} in frame header", src[0]),
            )
        })?;
        let len = u32::from_be_bytes([src[4], src[5], src[6], src[7]]) as usize;

        let total = HEADER_LEN.saturating_add(len);
        if src.len() < total {
            src.reserve((total - src.len()).min(MAX_RESERVE));
            return Ok(None);
        }

        src.advance(HEADER_LEN);
        let data = src.split_to(len).freeze();
        Ok(Some(LogFrame { stream, data }))
    }
}

/// 버퍼 전체를 프레임 목록으로 나눕니다.
///
/// 헤더가 잘리거나 알 수 없는 stream type이면 에러입니다.
pub fn split_frames(buf: &[u8]) -> io::Result<Vec<LogFrame>> {
    let mut src = BytesMut::from(buf);
    let mut decoder = LogFrameDecoder::new();
    let mut frames = Vec::new();
    while let Some(frame) = decoder.decode(&mut src)? {
        frames.push(frame);
    }
    if !src.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("{} trailing bytes after last frame", src.len()),
        ));
    }
    Ok(frames)
}

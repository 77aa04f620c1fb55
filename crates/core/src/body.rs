//! 요청 본문 기술자
//!
//! 전송 계층과 무관한 본문 표현입니다. 실제 인코딩은 클라이언트의
//! transport가 담당합니다.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DockerError, Result};

/// tar 아카이브 Content-Type
pub const TAR_CONTENT_TYPE: &str = "application/x-tar";

/// 요청 본문
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// 본문 없음
    #[default]
    Empty,
    /// JSON 본문
    Json(Value),
    /// `application/x-www-form-urlencoded` 본문
    Form(Vec<(String, String)>),
    /// `multipart/form-data` 본문
    Multipart(Vec<MultipartPart>),
    /// 임의 바이너리 본문 (tar 아카이브 등)
    Binary { data: Bytes, content_type: String },
}

/// multipart 본문의 한 파트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    pub name: String,
    pub data: Bytes,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl MultipartPart {
    /// 텍스트 파트를 생성합니다.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Bytes::from(value.into()),
            filename: None,
            content_type: None,
        }
    }

    /// 파일 파트를 생성합니다.
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
        }
    }
}

impl RequestBody {
    /// 직렬화 가능한 값을 JSON 본문으로 만듭니다.
    pub fn json<T: Serialize + ?Sized>(data: &T) -> Result<Self> {
        serde_json::to_value(data)
            .map(Self::Json)
            .map_err(|e| DockerError::invalid("body", format!("cannot serialize: {e}")))
    }

    /// 폼 본문을 만듭니다.
    pub fn form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// multipart 본문을 만듭니다.
    pub fn multipart(parts: Vec<MultipartPart>) -> Self {
        Self::Multipart(parts)
    }

    /// 바이너리 본문을 만듭니다.
    pub fn binary(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self::Binary {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    /// tar 아카이브 본문을 만듭니다.
    pub fn tar(data: impl Into<Bytes>) -> Self {
        Self::binary(data, TAR_CONTENT_TYPE)
    }

    /// 로그용 본문 종류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Json(_) => "json",
            Self::Form(_) => "form",
            Self::Multipart(_) => "multipart",
            Self::Binary { .. } => "binary",
        }
    }

    /// 본문이 없는지 여부
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// 본문 크기 추정치 (바이트, 로그용)
    pub fn approx_len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Json(v) => v.to_string().len(),
            Self::Form(pairs) => pairs.iter().map(|(k, v)| k.len() + v.len() + 2).sum(),
            Self::Multipart(parts) => parts.iter().map(|p| p.data.len()).sum(),
            Self::Binary { data, .. } => data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_from_struct() {
        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        struct Rename {
            name: String,
        }
        let body = RequestBody::json(&Rename {
            name: "web".to_owned(),
        })
        .unwrap();
        assert_eq!(body, RequestBody::Json(json!({"Name": "web"})));
        assert_eq!(body.kind(), "json");
    }

    #[test]
    fn tar_body_uses_tar_content_type() {
        let body = RequestBody::tar(vec![0u8; 512]);
        match &body {
            RequestBody::Binary { data, content_type } => {
                assert_eq!(data.len(), 512);
                assert_eq!(content_type, TAR_CONTENT_TYPE);
            }
            other => panic!("unexpected body {other:?}"),
        }
        assert_eq!(body.approx_len(), 512);
    }

    #[test]
    fn form_body_collects_pairs() {
        let body = RequestBody::form([("a", "1"), ("b", "2")]);
        assert_eq!(
            body,
            RequestBody::Form(vec![
                ("a".to_owned(), "1".to_owned()),
                ("b".to_owned(), "2".to_owned())
            ])
        );
        assert_eq!(body.kind(), "form");
    }

    #[test]
    fn multipart_parts() {
        let body = RequestBody::multipart(vec![
            MultipartPart::text("name", "plugin"),
            MultipartPart::file("context", "ctx.tar", vec![1u8, 2, 3], TAR_CONTENT_TYPE),
        ]);
        assert_eq!(body.kind(), "multipart");
        assert_eq!(body.approx_len(), "plugin".len() + 3);
    }

    #[test]
    fn default_is_empty() {
        let body = RequestBody::default();
        assert!(body.is_empty());
        assert_eq!(body.kind(), "empty");
        assert_eq!(body.approx_len(), 0);
    }
}

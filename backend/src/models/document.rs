use serde::Deserialize;
use std::path::Path;

/// 생성/수정 가능한 문서 확장자
pub const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "md"];

/// 업로드 가능한 이미지 확장자
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// 파일 확장자로 결정되는 문서 종류. 보기(view) 라우트가 이 값으로 렌더링 방식을 고릅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `.txt`: 원본 바이트를 text/plain으로 반환
    Text,
    /// `.md`: HTML로 변환해 페이지 템플릿에 넣음
    Markup,
    /// 업로드된 이미지: 원본 바이트를 이미지 MIME 타입으로 반환
    Image,
    Unsupported,
}

impl DocumentKind {
    pub fn from_name(name: &str) -> Self {
        match extension_of(name).map(|ext| ext.to_ascii_lowercase()).as_deref() {
            Some("txt") => DocumentKind::Text,
            Some("md") => DocumentKind::Markup,
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => DocumentKind::Image,
            _ => DocumentKind::Unsupported,
        }
    }

    /// 텍스트 편집기로 열 수 있는 종류인지
    pub fn is_editable(self) -> bool {
        matches!(self, DocumentKind::Text | DocumentKind::Markup)
    }
}

/// 파일 이름의 확장자 (점 제외). 확장자가 없거나 비어 있으면 None.
pub fn extension_of(name: &str) -> Option<&str> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
}

/// `POST /create` 폼
#[derive(Debug, Deserialize)]
pub struct CreateDocumentForm {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub content: String,
}

/// `POST /{filename}` 폼
#[derive(Debug, Deserialize)]
pub struct UpdateDocumentForm {
    #[serde(default)]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(DocumentKind::from_name("history.txt"), DocumentKind::Text);
        assert_eq!(DocumentKind::from_name("about.md"), DocumentKind::Markup);
        assert_eq!(DocumentKind::from_name("ABOUT.MD"), DocumentKind::Markup);
        assert_eq!(DocumentKind::from_name("logo.png"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_name("photo.JPEG"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_name("script.rb"), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_name("README"), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_name("trailing."), DocumentKind::Unsupported);
    }

    #[test]
    fn only_text_kinds_are_editable() {
        assert!(DocumentKind::Text.is_editable());
        assert!(DocumentKind::Markup.is_editable());
        assert!(!DocumentKind::Image.is_editable());
        assert!(!DocumentKind::Unsupported.is_editable());
    }
}

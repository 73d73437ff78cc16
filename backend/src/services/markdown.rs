//! # 마크다운 렌더링 서비스
//!
//! `.md` 문서를 보여줄 때 원본 마크다운을 HTML 조각으로 변환합니다.
//! 변환된 조각은 페이지 템플릿(`document.html`)의 본문에 그대로 삽입됩니다.

use pulldown_cmark::{html, Options, Parser};

/// 마크다운 텍스트를 HTML 조각으로 변환합니다.
///
/// 표, 취소선, 체크리스트 확장 문법을 지원합니다.
///
/// # 예시
/// ```text
/// render_markdown("# Ruby is") → "<h1>Ruby is</h1>\n"
/// ```
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_output, parser);
    html_output
}

/// 디스크에서 읽은 바이트를 텍스트로 바꿉니다.
/// UTF-8이 아닌 바이트는 대체 문자(U+FFFD)로 바뀝니다.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

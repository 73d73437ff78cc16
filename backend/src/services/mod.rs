//! # 서비스 모듈
//!
//! 저장소와 HTTP 계층 사이의 순수한 변환 로직을 담습니다.
//! - `markdown`: 마크다운 → HTML 렌더링

pub mod markdown;

pub use markdown::*;

//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `document`: 문서 종류(DocumentKind)와 문서 폼 요청
//! - `session`: 요청마다 주고받는 세션 값(로그인 사용자, 플래시 메시지)
//! - `user`: 자격증명과 로그인/회원가입 폼 요청

pub mod document;
pub mod session;
pub mod user;

pub use document::*;
pub use session::*;
pub use user::*;

//! # 미들웨어 / 추출기 모듈
//!
//! - `auth`: 세션 쿠키를 읽고 쓰는 `SessionContext`와, 로그인하지 않은 요청을
//!   `/`로 돌려보내는 `SignedIn` 가드 추출기

pub mod auth;

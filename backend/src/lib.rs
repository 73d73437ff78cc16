//! # flatdoc
//!
//! 디스크의 텍스트/마크다운 파일을 관리하는 작은 CMS 웹 서버입니다.
//!
//! - `store`: 문서 파일 저장소와 YAML 자격증명 저장소
//! - `models`: 문서 종류, 세션, 폼 요청 구조체
//! - `middleware`: 세션 쿠키와 로그인 가드 추출기
//! - `routes`: HTTP 핸들러와 라우터 구성
//! - `services`: 마크다운 렌더링

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use routes::{documents::AppState, router};

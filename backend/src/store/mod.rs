//! # 저장소 계층 (Storage Layer)
//!
//! 디스크와 직접 상호작용하는 모듈입니다. 데이터베이스 없이 파일 시스템이
//! 유일한 저장소이며, 요청 사이에 메모리에 남는 사본은 없습니다.
//!
//! - `documents`: 데이터 디렉토리의 문서 파일 CRUD와 이름/확장자 검증
//! - `credentials`: 사용자 이름 → 비밀번호 해시를 담은 YAML 파일
//! - `locks`: 파일 이름별 쓰기 직렬화에 쓰는 잠금 테이블

pub mod credentials;
pub mod documents;
pub mod locks;

pub use credentials::CredentialStore;
pub use documents::DocumentStore;
pub use locks::KeyedLocks;

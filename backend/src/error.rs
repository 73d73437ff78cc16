//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 도메인 에러(`NotFound`, `AlreadyExists`, `Validation`, `Unauthorized`,
//! `InvalidCredentials`)는 대부분 라우트 핸들러에서 직접 처리됩니다:
//! - `NotFound`, `Unauthorized` → 플래시 메시지와 함께 `/`로 리다이렉트
//! - `AlreadyExists`, `Validation`, `InvalidCredentials` → 폼을 422로 다시 렌더링
//!
//! 핸들러가 처리하지 못하고 `?`로 전파된 에러만 `IntoResponse`를 거쳐
//! 단순한 에러 페이지로 변환됩니다. I/O 계열 에러는 500이 됩니다.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use askama::Template;
use thiserror::Error;

/// 핸들러에서 처리되지 않은 에러를 보여주는 최소한의 페이지
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    code: u16,
    message: String,
}

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
#[derive(Debug, Error)]
pub enum AppError {
    /// 문서가 존재하지 않음. 필드는 요청된 파일 이름입니다.
    #[error("{0} does not exist.")]
    NotFound(String),

    /// 같은 이름의 문서나 사용자가 이미 있음 (메시지 그대로 사용자에게 표시)
    #[error("{0}")]
    AlreadyExists(String),

    /// 빈 이름, 확장자 누락/불허, 빈 사용자 이름 등 입력 검증 실패
    #[error("{0}")]
    Validation(String),

    /// 로그인하지 않은 상태에서 변경 작업을 시도함
    #[error("You must be signed in to do that.")]
    Unauthorized,

    /// 로그인 실패 (사용자 없음 또는 비밀번호 불일치)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// 파일 입출력 오류
    /// #[from]: std::io::Error → AppError::Io 자동 변환
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTML 템플릿 렌더링 오류
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// 세션 토큰 서명 오류
    #[error("Session error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),

    /// 자격증명 파일(YAML) 파싱/직렬화 오류
    #[error("Credential file error: {0}")]
    Credentials(#[from] serde_yaml::Error),

    /// 업로드 요청 본문 파싱 오류
    #[error("Upload error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// 비밀번호 해싱/해시 파싱 오류
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// 그 밖의 서버 내부 오류
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    /// 핸들러에서 처리되지 않은 에러를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러는 실제 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::AlreadyExists(ref msg) | AppError::Validation(ref msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Multipart(ref e) => {
                tracing::warn!("Rejected upload body: {}", e);
                (StatusCode::BAD_REQUEST, "The upload could not be read.".to_string())
            }
            AppError::Io(ref e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An IO error occurred".to_string(),
                )
            }
            AppError::Template(ref e) => {
                tracing::error!("Template error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Session(ref e) => {
                tracing::error!("Session error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Credentials(ref e) => {
                tracing::error!("Credential file error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::PasswordHash(ref msg) | AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        // layout.html을 상속하지 않음: 레이아웃 렌더링 실패도 이 페이지로 온다
        let page = ErrorTemplate {
            code: status.as_u16(),
            message,
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Error page could not be rendered: {}", e);
                (status, page.message).into_response()
            }
        }
    }
}

//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! 핸들러는 얇은 연결 코드입니다: 가드(로그인 확인) → 저장소 호출 → 뷰 선택.
//!
//! 각 하위 모듈:
//! - `auth`: 회원가입, 로그인, 로그아웃
//! - `documents`: 문서 목록/보기/생성/수정/삭제/복제
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `images`: 이미지 업로드

pub mod auth;
pub mod documents;
pub mod health;
pub mod images;

pub use documents::*;
pub use health::*;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{error::AppError, middleware::auth::SessionContext};

/// 레이아웃 템플릿이 공통으로 쓰는 값
pub struct Page {
    pub flash: Option<String>,
    pub username: Option<String>,
}

/// 플래시 메시지를 꺼내 페이지를 렌더링하고, 메시지가 비워진 세션을 쿠키로 돌려보냅니다.
pub fn render_page<F>(ctx: SessionContext, status: StatusCode, build: F) -> Result<Response, AppError>
where
    F: FnOnce(Page) -> Result<String, askama::Error>,
{
    let (session, flash) = ctx.session.clone().take_flash();
    let html = build(Page {
        flash,
        username: session.username.clone(),
    })?;
    Ok((status, ctx.commit(&session)?, Html(html)).into_response())
}

/// 전체 라우터를 구성합니다.
///
/// 정적 경로(`/new`, `/users/...`, `/image/upload`, `/health`)는
/// `/{filename}` 같은 동적 경로보다 우선 매칭됩니다.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/new", get(new_document))
        .route("/create", post(create_document))
        .route("/health", get(health_check))
        .route("/users/signin", get(auth::signin_form).post(auth::signin))
        .route("/users/signup", get(auth::signup_form).post(auth::signup))
        .route("/users/signout", post(auth::signout));

    if state.image_uploads {
        router = router.route(
            "/image/upload",
            get(images::upload_form).post(images::upload_image),
        );
    }

    let body_limit = state.max_upload_bytes;

    router
        .route("/{filename}", get(view_document).post(update_document))
        .route("/{filename}/edit", get(edit_document))
        .route("/{filename}/delete", post(delete_document))
        .route("/{filename}/clone", post(clone_document))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

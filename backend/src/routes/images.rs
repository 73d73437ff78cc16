//! # 이미지 업로드 핸들러
//!
//! - `GET  /image/upload` → 업로드 폼 (로그인 필요)
//! - `POST /image/upload` → multipart 본문의 `image` 필드를 데이터 디렉토리에 저장
//!
//! 업로드된 이미지는 문서와 같은 디렉토리에 저장되고 목록에도 나타납니다.
//! `ENABLE_IMAGE_UPLOADS=false`이면 이 라우트는 등록되지 않습니다.

use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    error::AppError,
    middleware::auth::{SessionContext, SignedIn},
    routes::{documents::AppState, render_page},
    store::DocumentStore,
};

#[derive(Template)]
#[template(path = "upload.html")]
pub struct UploadTemplate {
    pub flash: Option<String>,
    pub username: Option<String>,
    pub error: Option<String>,
}

/// `GET /image/upload`
pub async fn upload_form(guard: SignedIn) -> Result<Response, AppError> {
    render_upload(guard.ctx, StatusCode::OK, None)
}

/// `POST /image/upload`
pub async fn upload_image(
    State(state): State<AppState>,
    guard: SignedIn,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().map(base_name).unwrap_or_default();
        let bytes = field.bytes().await?;
        if !filename.is_empty() {
            upload = Some((filename, bytes.to_vec()));
        }
    }

    let Some((filename, bytes)) = upload else {
        return render_upload(
            guard.ctx,
            StatusCode::UNPROCESSABLE_ENTITY,
            Some("Please choose an image to upload.".to_string()),
        );
    };

    if !DocumentStore::validate_image_extension(&filename) {
        return render_upload(
            guard.ctx,
            StatusCode::UNPROCESSABLE_ENTITY,
            Some("Unsupported image type. Use .png, .jpg, .jpeg or .gif.".to_string()),
        );
    }

    match state.documents.create(&filename, &bytes).await {
        Ok(()) => {
            tracing::info!("{} uploaded {} ({} bytes)", guard.username, filename, bytes.len());
            let session = guard
                .ctx
                .session
                .clone()
                .with_flash(format!("{} has been uploaded.", filename));
            guard.ctx.redirect(&session, "/")
        }
        Err(AppError::Validation(message)) | Err(AppError::AlreadyExists(message)) => {
            render_upload(guard.ctx, StatusCode::UNPROCESSABLE_ENTITY, Some(message))
        }
        Err(e) => Err(e),
    }
}

/// 일부 브라우저는 클라이언트 쪽 전체 경로를 보냅니다. 마지막 구성요소만 씁니다.
fn base_name(raw: &str) -> String {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim().to_string()
}

fn render_upload(
    ctx: SessionContext,
    status: StatusCode,
    error: Option<String>,
) -> Result<Response, AppError> {
    render_page(ctx, status, |page| {
        UploadTemplate {
            flash: page.flash,
            username: page.username,
            error,
        }
        .render()
    })
}

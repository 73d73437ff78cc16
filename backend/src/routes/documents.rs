//! # 문서(Document) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET  /`                    → 문서 목록
//! - `GET  /new`                 → 새 문서 폼 (로그인 필요)
//! - `POST /create`              → 새 문서 생성 (로그인 필요)
//! - `GET  /{filename}`          → 문서 보기 (txt: 원문, md: HTML 렌더링)
//! - `GET  /{filename}/edit`     → 편집 폼 (로그인 필요)
//! - `POST /{filename}`          → 내용 덮어쓰기 (로그인 필요)
//! - `POST /{filename}/delete`   → 삭제 (로그인 필요)
//! - `POST /{filename}/clone`    → 기존 내용으로 채운 새 문서 폼 (로그인 필요)
//!
//! 로그인이 필요한 핸들러는 `SignedIn` 추출기를 받습니다.
//! 익명 요청은 핸들러 본문이 실행되기 전에 `/`로 리다이렉트됩니다.
//!
//! 도메인 에러는 여기서 처리합니다:
//! - `NotFound` → 플래시 메시지 + `/`로 리다이렉트
//! - `Validation`, `AlreadyExists` → 폼을 422로 다시 렌더링
//! 그 밖의 에러(I/O 등)는 `?`로 전파되어 500 페이지가 됩니다.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use std::sync::Arc;

use crate::{
    config::Config,
    error::AppError,
    middleware::auth::{SessionContext, SignedIn},
    models::*,
    routes::render_page,
    services,
    store::{CredentialStore, DocumentStore},
};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 저장소는 Arc로 감싸 clone해도 같은 잠금 테이블을 공유합니다.
#[derive(Clone)]
pub struct AppState {
    /// 문서 파일 저장소
    pub documents: Arc<DocumentStore>,
    /// 자격증명(YAML) 저장소
    pub credentials: Arc<CredentialStore>,
    /// 세션 쿠키 서명용 비밀키
    pub session_secret: String,
    /// 세션 쿠키 유효 시간 (시간)
    pub session_ttl_hours: i64,
    /// 이미지 업로드 라우트 활성화 여부
    pub image_uploads: bool,
    /// 요청 본문 최대 크기
    pub max_upload_bytes: usize,
}

impl AppState {
    /// 설정으로 상태를 만들고, 문서 디렉토리가 없으면 생성합니다.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let documents = DocumentStore::new(&config.data_path);
        documents.ensure_root().await?;

        Ok(Self {
            documents: Arc::new(documents),
            credentials: Arc::new(CredentialStore::new(&config.credentials_path)),
            session_secret: config.session_secret.clone(),
            session_ttl_hours: config.session_ttl_hours,
            image_uploads: config.enable_image_uploads,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub flash: Option<String>,
    pub username: Option<String>,
    pub files: Vec<String>,
    pub uploads_enabled: bool,
}

#[derive(Template)]
#[template(path = "document.html")]
pub struct DocumentTemplate {
    pub flash: Option<String>,
    pub username: Option<String>,
    pub filename: String,
    /// 렌더링된 HTML 조각 (템플릿에서 이스케이프하지 않음)
    pub body: String,
}

#[derive(Template)]
#[template(path = "new.html")]
pub struct NewDocumentTemplate {
    pub flash: Option<String>,
    pub username: Option<String>,
    pub filename: String,
    pub content: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditDocumentTemplate {
    pub flash: Option<String>,
    pub username: Option<String>,
    pub filename: String,
    pub content: String,
}

/// `GET /`: 데이터 디렉토리의 모든 파일 목록
pub async fn index(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<Response, AppError> {
    let files = state.documents.list().await?;

    render_page(ctx, StatusCode::OK, |page| {
        IndexTemplate {
            flash: page.flash,
            username: page.username,
            files,
            uploads_enabled: state.image_uploads,
        }
        .render()
    })
}

/// `GET /{filename}`: 문서 보기
///
/// 종류별 응답:
/// - Text: 원본 바이트 + `text/plain`
/// - Markup: HTML로 변환해 페이지 템플릿에 삽입
/// - Image: 원본 바이트 + 확장자로 추정한 MIME 타입
pub async fn view_document(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let bytes = match state.documents.read(&filename).await {
        Ok(bytes) => bytes,
        Err(AppError::NotFound(_)) | Err(AppError::Validation(_)) => {
            return missing(ctx, &filename);
        }
        Err(e) => return Err(e),
    };

    match DocumentStore::classify(&filename) {
        DocumentKind::Text => Ok(([(CONTENT_TYPE, "text/plain")], bytes).into_response()),
        DocumentKind::Markup => {
            let body = services::render_markdown(&services::decode_text(&bytes));
            render_page(ctx, StatusCode::OK, |page| {
                DocumentTemplate {
                    flash: page.flash,
                    username: page.username,
                    filename,
                    body,
                }
                .render()
            })
        }
        DocumentKind::Image => {
            let mime = mime_guess::from_path(&filename).first_or_octet_stream();
            Ok(([(CONTENT_TYPE, mime.to_string())], bytes).into_response())
        }
        DocumentKind::Unsupported => {
            // 디렉토리에 직접 넣은 파일. 렌더링하지 않고 그대로 내려준다.
            Ok(([(CONTENT_TYPE, "application/octet-stream")], bytes).into_response())
        }
    }
}

/// `GET /new`: 새 문서 폼
pub async fn new_document(guard: SignedIn) -> Result<Response, AppError> {
    render_new_form(guard.ctx, StatusCode::OK, String::new(), String::new(), None)
}

/// `POST /create`: 새 문서 생성
///
/// 이름이 비었거나, 확장자가 없거나 허용되지 않거나, 이미 있는 이름이면
/// 입력값을 유지한 채 폼을 422로 다시 보여줍니다.
pub async fn create_document(
    State(state): State<AppState>,
    guard: SignedIn,
    Form(form): Form<CreateDocumentForm>,
) -> Result<Response, AppError> {
    let filename = form.filename.trim().to_string();

    let result = match DocumentStore::validate_new_name(&filename) {
        Ok(()) => state.documents.create(&filename, form.content.as_bytes()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            tracing::info!("{} created {}", guard.username, filename);
            let session = guard
                .ctx
                .session
                .clone()
                .with_flash(format!("{} has been created.", filename));
            guard.ctx.redirect(&session, "/")
        }
        Err(AppError::Validation(message)) | Err(AppError::AlreadyExists(message)) => {
            render_new_form(
                guard.ctx,
                StatusCode::UNPROCESSABLE_ENTITY,
                filename,
                form.content,
                Some(message),
            )
        }
        Err(e) => Err(e),
    }
}

/// `GET /{filename}/edit`: 편집 폼 (기존 내용으로 채움)
pub async fn edit_document(
    State(state): State<AppState>,
    guard: SignedIn,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let bytes = match state.documents.read(&filename).await {
        Ok(bytes) => bytes,
        Err(AppError::NotFound(_)) | Err(AppError::Validation(_)) => {
            return missing(guard.ctx, &filename);
        }
        Err(e) => return Err(e),
    };

    if !DocumentStore::classify(&filename).is_editable() {
        return not_editable(guard.ctx, &filename);
    }

    let content = services::decode_text(&bytes);
    render_page(guard.ctx, StatusCode::OK, |page| {
        EditDocumentTemplate {
            flash: page.flash,
            username: page.username,
            filename,
            content,
        }
        .render()
    })
}

/// `POST /{filename}`: 내용 덮어쓰기. 파일이 없으면 새로 만듭니다.
pub async fn update_document(
    State(state): State<AppState>,
    guard: SignedIn,
    Path(filename): Path<String>,
    Form(form): Form<UpdateDocumentForm>,
) -> Result<Response, AppError> {
    if !DocumentStore::validate_extension(&filename) {
        return not_editable(guard.ctx, &filename);
    }

    let message = match state
        .documents
        .write(&filename, form.content.as_bytes())
        .await
    {
        Ok(()) => {
            tracing::info!("{} updated {}", guard.username, filename);
            format!("{} has been updated.", filename)
        }
        Err(AppError::Validation(message)) => message,
        Err(e) => return Err(e),
    };

    let session = guard.ctx.session.clone().with_flash(message);
    guard.ctx.redirect(&session, "/")
}

/// `POST /{filename}/delete`: 문서 삭제
///
/// 없는 파일을 삭제하려 하면 "does not exist" 플래시와 함께 리다이렉트합니다.
pub async fn delete_document(
    State(state): State<AppState>,
    guard: SignedIn,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    match state.documents.delete(&filename).await {
        Ok(()) => {
            tracing::info!("{} deleted {}", guard.username, filename);
            let session = guard
                .ctx
                .session
                .clone()
                .with_flash(format!("{} has been deleted.", filename));
            guard.ctx.redirect(&session, "/")
        }
        Err(AppError::NotFound(_)) | Err(AppError::Validation(_)) => {
            missing(guard.ctx, &filename)
        }
        Err(e) => Err(e),
    }
}

/// `POST /{filename}/clone`: 기존 문서를 복제하는 새 문서 폼
///
/// 아직 저장하지 않습니다. 사용자가 폼을 제출해야 `/create`로 생성됩니다.
pub async fn clone_document(
    State(state): State<AppState>,
    guard: SignedIn,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let bytes = match state.documents.read(&filename).await {
        Ok(bytes) => bytes,
        Err(AppError::NotFound(_)) | Err(AppError::Validation(_)) => {
            return missing(guard.ctx, &filename);
        }
        Err(e) => return Err(e),
    };

    if !DocumentStore::classify(&filename).is_editable() {
        return not_editable(guard.ctx, &filename);
    }

    let copy_name = state.documents.suggest_copy_name(&filename).await?;
    render_new_form(
        guard.ctx,
        StatusCode::OK,
        copy_name,
        services::decode_text(&bytes),
        None,
    )
}

fn render_new_form(
    ctx: SessionContext,
    status: StatusCode,
    filename: String,
    content: String,
    error: Option<String>,
) -> Result<Response, AppError> {
    render_page(ctx, status, |page| {
        NewDocumentTemplate {
            flash: page.flash,
            username: page.username,
            filename,
            content,
            error,
        }
        .render()
    })
}

fn missing(ctx: SessionContext, filename: &str) -> Result<Response, AppError> {
    let session = ctx
        .session
        .clone()
        .with_flash(AppError::NotFound(filename.to_string()).to_string());
    ctx.redirect(&session, "/")
}

fn not_editable(ctx: SessionContext, filename: &str) -> Result<Response, AppError> {
    let session = ctx
        .session
        .clone()
        .with_flash(format!("{} cannot be edited.", filename));
    ctx.redirect(&session, "/")
}

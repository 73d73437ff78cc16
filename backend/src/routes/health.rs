//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /health` → `{ "status": "ok", "documents": 3 }`
//!
//! 데이터 디렉토리를 실제로 읽어보므로, 디렉토리가 사라졌거나 권한이 없으면
//! 503과 `{ "status": "unavailable" }`을 반환합니다.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::routes::documents::AppState;

/// `GET /health`: 서버와 데이터 디렉토리 상태를 확인합니다.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.documents.list().await {
        Ok(files) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "documents": files.len()
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed to list documents: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

//! # flatdoc 웹 서버 진입점
//!
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 설정 로딩과 데이터 디렉토리 생성
//! 4. 라우터 설정
//! 5. HTTP 서버 시작

use anyhow::Result;
use flatdoc::{
    config::{Config, DEFAULT_SESSION_SECRET},
    router, AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flatdoc=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        "Starting flatdoc server on {}:{} ({:?} mode)",
        config.host,
        config.port,
        config.run_mode
    );
    if config.session_secret == DEFAULT_SESSION_SECRET {
        tracing::warn!("SESSION_SECRET is not set, sessions are signed with the default secret");
    }

    // 문서 디렉토리가 없으면 여기서 생성됩니다.
    let state = AppState::from_config(&config).await?;
    tracing::info!("Serving documents from {}", config.data_path.display());
    tracing::info!("Reading credentials from {}", config.credentials_path.display());
    if !config.enable_image_uploads {
        tracing::info!("Image uploads are disabled");
    }

    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

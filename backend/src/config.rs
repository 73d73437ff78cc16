//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `APP_ENV`: 실행 모드. `test`이면 테스트 전용 데이터 경로를 사용합니다.
//! - `DATA_PATH`: 문서 파일이 저장되는 디렉토리
//! - `CREDENTIALS_PATH`: 사용자 자격증명 YAML 파일
//! - `SESSION_SECRET`: 세션 쿠키 서명 비밀키
//! - `SESSION_TTL_HOURS`: 세션 쿠키 유효 시간
//! - `ENABLE_IMAGE_UPLOADS`: 이미지 업로드 라우트 활성화 여부
//! - `MAX_UPLOAD_BYTES`: 업로드 요청 본문 최대 크기
//! - `HOST`, `PORT`: 서버 바인딩 주소

use std::env;
use std::path::PathBuf;

/// 설정되지 않았을 때 사용하는 세션 비밀키. 운영 환경에서는 반드시 바꿔야 합니다.
pub const DEFAULT_SESSION_SECRET: &str = "secret";

/// 세션 쿠키 기본 유효 시간
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// 세션 쿠키 최대 유효 시간 (1년). 더 큰 값은 여기로 잘라냅니다.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// 실행 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
    Test,
}

impl RunMode {
    /// `APP_ENV` 값을 실행 모드로 해석합니다. 알 수 없는 값은 Development입니다.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "test" => RunMode::Test,
            "production" | "prod" => RunMode::Production,
            _ => RunMode::Development,
        }
    }

    /// 실행 모드별 기본 문서 디렉토리
    pub fn default_data_path(self) -> PathBuf {
        match self {
            RunMode::Test => PathBuf::from("test/data"),
            _ => PathBuf::from("data"),
        }
    }

    /// 실행 모드별 기본 자격증명 파일
    pub fn default_credentials_path(self) -> PathBuf {
        match self {
            RunMode::Test => PathBuf::from("test/users.yml"),
            _ => PathBuf::from("users.yml"),
        }
    }
}

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    pub run_mode: RunMode,
    /// 문서 파일이 저장되는 디렉토리 경로
    pub data_path: PathBuf,
    /// username → 비밀번호 해시를 담은 YAML 파일 경로
    pub credentials_path: PathBuf,
    /// 세션 토큰 서명/검증에 사용하는 비밀키
    pub session_secret: String,
    /// 세션 쿠키 유효 시간 (시간 단위)
    pub session_ttl_hours: i64,
    /// `/image/upload` 라우트를 등록할지 여부
    pub enable_image_uploads: bool,
    /// 업로드 요청 본문의 최대 바이트 수
    pub max_upload_bytes: usize,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// 모든 항목에 기본값이 있으므로 환경변수가 하나도 없어도 동작합니다.
    /// 숫자/불리언 값의 파싱에 실패하면 기본값을 사용합니다.
    pub fn from_env() -> Self {
        let run_mode = RunMode::parse(&env::var("APP_ENV").unwrap_or_default());

        Self {
            run_mode,
            data_path: env::var("DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| run_mode.default_data_path()),
            credentials_path: env::var("CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| run_mode.default_credentials_path()),
            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| DEFAULT_SESSION_SECRET.to_string()),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .map(|v| parse_ttl_hours(&v))
                .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
            enable_image_uploads: env::var("ENABLE_IMAGE_UPLOADS")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        }
    }

    /// 주어진 디렉토리 아래에 데이터와 자격증명을 두는 테스트용 설정
    pub fn for_test(root: &std::path::Path) -> Self {
        Self {
            run_mode: RunMode::Test,
            data_path: root.join("data"),
            credentials_path: root.join("users.yml"),
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            enable_image_uploads: true,
            max_upload_bytes: 10 * 1024 * 1024,
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }
}

fn parse_ttl_hours(value: &str) -> i64 {
    match value.trim().parse::<i64>() {
        Ok(hours) if hours > 0 => hours.min(MAX_SESSION_TTL_HOURS),
        _ => DEFAULT_SESSION_TTL_HOURS,
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_mode_selects_test_paths() {
        let mode = RunMode::parse("TEST");
        assert_eq!(mode, RunMode::Test);
        assert_eq!(mode.default_data_path(), PathBuf::from("test/data"));
        assert_eq!(mode.default_credentials_path(), PathBuf::from("test/users.yml"));

        let mode = RunMode::parse("");
        assert_eq!(mode, RunMode::Development);
        assert_eq!(mode.default_data_path(), PathBuf::from("data"));
    }

    #[test]
    fn flags_default_to_enabled() {
        assert!(parse_flag("yes"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("off"));
        assert!(!parse_flag("False"));
    }

    #[test]
    fn session_ttl_is_clamped() {
        assert_eq!(parse_ttl_hours("48"), 48);
        assert_eq!(parse_ttl_hours("0"), DEFAULT_SESSION_TTL_HOURS);
        assert_eq!(parse_ttl_hours("soon"), DEFAULT_SESSION_TTL_HOURS);
        assert_eq!(parse_ttl_hours(&i64::MAX.to_string()), MAX_SESSION_TTL_HOURS);
    }
}

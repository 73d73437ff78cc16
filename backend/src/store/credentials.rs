//! # 자격증명 저장소
//!
//! 사용자 이름과 Argon2 비밀번호 해시를 YAML 파일 하나(`users.yml`)에 저장합니다.
//!
//! 파일 형식은 `username: <PHC 해시>` 매핑입니다.
//! 파일이 없거나 비어 있으면 사용자가 없는 것으로 봅니다.
//! 평문 비밀번호는 저장하지 않고, 검증할 때만 해시와 비교합니다.

use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// username → Argon2 PHC 해시 문자열
pub type Credentials = BTreeMap<String, String>;

/// YAML 파일 하나에 사용자 자격증명을 저장합니다.
///
/// 호출할 때마다 파일 전체를 읽습니다 (캐시 없음). 변경은 하나의 뮤텍스 아래에서
/// 읽기-수정-쓰기로 처리하고, 임시 파일에 쓴 뒤 rename으로 교체합니다.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 파일이 없거나 비어 있으면 빈 목록입니다.
    pub async fn load(&self) -> Result<Credentials, AppError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Credentials::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Credentials::new());
        }
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// 비밀번호가 저장된 해시와 일치하는지 확인합니다. 없는 사용자는 false입니다.
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool, AppError> {
        let users = self.load().await?;
        let Some(stored) = users.get(username) else {
            return Ok(false);
        };

        let parsed_hash = PasswordHash::new(stored)
            .map_err(|e| AppError::PasswordHash(format!("stored hash for {}: {}", username, e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.load().await?.contains_key(username))
    }

    /// 비밀번호를 해싱해 항목을 추가하거나 덮어쓰고 파일 전체를 다시 씁니다.
    pub async fn store(&self, username: &str, password: &str) -> Result<(), AppError> {
        let hash = hash_password(password)?;

        let _guard = self.write_lock.lock().await;
        let mut users = self.load().await?;
        users.insert(username.to_string(), hash);
        self.save(&users).await
    }

    /// 회원가입: 입력을 검증하고, 사용자 이름이 비어 있지 않고 아직 없을 때만 저장합니다.
    /// 중복 확인과 저장이 같은 잠금 안에서 일어나므로 동시 가입이 서로를 지우지 않습니다.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AppError> {
        if username.is_empty() {
            return Err(AppError::Validation("A username is required.".to_string()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("A password is required.".to_string()));
        }
        let hash = hash_password(password)?;

        let _guard = self.write_lock.lock().await;
        let mut users = self.load().await?;
        if users.contains_key(username) {
            return Err(AppError::AlreadyExists(format!(
                "{} is already taken.",
                username
            )));
        }
        users.insert(username.to_string(), hash);
        self.save(&users).await?;

        tracing::info!("Registered user {}", username);
        Ok(())
    }

    async fn save(&self, users: &Credentials) -> Result<(), AppError> {
        let yaml = serde_yaml::to_string(users)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("yml.tmp");
        fs::write(&tmp, yaml).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Argon2id + 랜덤 솔트로 PHC 문자열을 만듭니다.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(format!("Password hashing failed: {}", e)))
}

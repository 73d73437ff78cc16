//! # 문서 저장소
//!
//! 데이터 디렉토리 하나에 평평하게(flat) 저장된 문서 파일을 다룹니다.
//! 문서는 파일 이름으로 식별되며, 하위 디렉토리는 사용하지 않습니다.
//!
//! 모든 작업은 매번 실제 파일 시스템을 직접 읽고 씁니다.
//! 쓰기 작업(create/write/delete)은 파일 이름별 잠금으로 직렬화됩니다.
//! 쓰기 도중 실패(디스크 부족 등)하면 일부만 쓰인 파일이 남을 수 있습니다.

use crate::error::AppError;
use crate::models::{extension_of, DocumentKind, DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS};
use crate::store::KeyedLocks;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// 복제 이름 후보를 찾을 때 시도하는 최대 횟수
const MAX_COPY_ATTEMPTS: usize = 1000;

#[derive(Debug)]
pub struct DocumentStore {
    root: PathBuf,
    locks: KeyedLocks,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: KeyedLocks::new(),
        }
    }

    /// 문서 저장 루트 디렉토리
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 루트 디렉토리가 없으면 생성합니다 (mkdir -p).
    pub async fn ensure_root(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// 파일 이름을 루트 기준의 실제 경로로 바꿉니다.
    ///
    /// 디렉토리 구분자, `..`, NUL, 점으로 시작하는 이름은 거부하므로
    /// 어떤 작업도 루트 디렉토리 밖을 건드릴 수 없습니다.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, AppError> {
        if name.is_empty() {
            return Err(AppError::Validation("A name is required.".to_string()));
        }
        if !is_safe_name(name) {
            return Err(AppError::Validation("Invalid filename.".to_string()));
        }
        Ok(self.root.join(name))
    }

    /// 데이터 디렉토리의 모든 파일 이름을 디렉토리 열거 순서대로 반환합니다.
    /// 정렬하지 않습니다. 디렉토리가 아직 없으면 빈 목록입니다.
    pub async fn list(&self) -> Result<Vec<String>, AppError> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!("Skipping non UTF-8 file name: {:?}", raw),
            }
        }
        Ok(names)
    }

    /// 이름에 해당하는 일반 파일이 있는지 확인합니다. 잘못된 이름은 false입니다.
    pub async fn exists(&self, name: &str) -> bool {
        match self.resolve(name) {
            Ok(path) => fs::metadata(&path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// 문서 내용을 바이트로 읽습니다.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(name)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(AppError::NotFound(name.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        }
        fs::read(&path).await.map_err(|e| not_found_or_io(e, name))
    }

    /// 새 문서를 만듭니다. 같은 이름이 이미 있으면 기존 내용을 건드리지 않고
    /// `AlreadyExists`를 반환합니다.
    ///
    /// 존재 확인과 생성은 `create_new` 한 번으로 처리되어 다른 생성 요청과 섞이지 않습니다.
    pub async fn create(&self, name: &str, content: &[u8]) -> Result<(), AppError> {
        let path = self.resolve(name)?;
        let _guard = self.locks.lock(name).await;

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::AlreadyExists(format!("{} already exists.", name)))
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(content).await?;
        file.flush().await?;

        tracing::debug!("Created {} ({} bytes)", path.display(), content.len());
        Ok(())
    }

    /// 내용을 무조건 덮어씁니다. 파일이 없으면 새로 만듭니다.
    pub async fn write(&self, name: &str, content: &[u8]) -> Result<(), AppError> {
        let path = self.resolve(name)?;
        let _guard = self.locks.lock(name).await;
        fs::write(&path, content).await?;

        tracing::debug!("Wrote {} ({} bytes)", path.display(), content.len());
        Ok(())
    }

    /// 문서를 삭제합니다. 없는 파일이면 `NotFound`입니다.
    pub async fn delete(&self, name: &str) -> Result<(), AppError> {
        let path = self.resolve(name)?;
        let _guard = self.locks.lock(name).await;
        fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(e, name))?;

        tracing::debug!("Deleted {}", path.display());
        Ok(())
    }

    /// 확장자로 문서 종류를 판별합니다.
    pub fn classify(name: &str) -> DocumentKind {
        DocumentKind::from_name(name)
    }

    /// 확장자가 있고 문서 허용 목록(.txt, .md)에 들어 있으면 true
    pub fn validate_extension(name: &str) -> bool {
        has_extension_in(name, DOCUMENT_EXTENSIONS)
    }

    /// 업로드용 이미지 확장자 검사
    pub fn validate_image_extension(name: &str) -> bool {
        has_extension_in(name, IMAGE_EXTENSIONS)
    }

    /// 새 문서 폼의 파일 이름 검증. 사용자에게 그대로 보여줄 메시지를 담아 반환합니다.
    pub fn validate_new_name(name: &str) -> Result<(), AppError> {
        if name.is_empty() {
            return Err(AppError::Validation("A name is required.".to_string()));
        }
        if !is_safe_name(name) {
            return Err(AppError::Validation("Invalid filename.".to_string()));
        }
        if extension_of(name).is_none() {
            return Err(AppError::Validation(
                "A file extension is required (.txt or .md).".to_string(),
            ));
        }
        if !Self::validate_extension(name) {
            return Err(AppError::Validation(
                "Unsupported file extension. Use .txt or .md.".to_string(),
            ));
        }
        Ok(())
    }

    /// 복제용으로 아직 쓰이지 않은 이름을 고릅니다.
    ///
    /// `notes.md` → `notes_copy.md`, `notes_copy2.md`, `notes_copy3.md`, ...
    pub async fn suggest_copy_name(&self, name: &str) -> Result<String, AppError> {
        self.resolve(name)?;
        let path = Path::new(name);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name);
        let ext = extension_of(name);

        for attempt in 1..=MAX_COPY_ATTEMPTS {
            let suffix = if attempt == 1 {
                "_copy".to_string()
            } else {
                format!("_copy{}", attempt)
            };
            let candidate = match ext {
                Some(ext) => format!("{}{}.{}", stem, suffix, ext),
                None => format!("{}{}", stem, suffix),
            };
            if !self.exists(&candidate).await {
                return Ok(candidate);
            }
        }

        Err(AppError::Internal(format!(
            "no free copy name for {} after {} attempts",
            name, MAX_COPY_ATTEMPTS
        )))
    }
}

fn has_extension_in(name: &str, allowed: &[&str]) -> bool {
    extension_of(name)
        .map(|ext| allowed.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// 루트 디렉토리 바로 아래의 파일만 가리키는 이름인지
fn is_safe_name(name: &str) -> bool {
    !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
        && name.trim() == name
}

fn not_found_or_io(e: std::io::Error, name: &str) -> AppError {
    if e.kind() == ErrorKind::NotFound {
        AppError::NotFound(name.to_string())
    } else {
        AppError::Io(e)
    }
}

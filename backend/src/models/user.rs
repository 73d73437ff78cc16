use serde::Deserialize;

/// 로그인 폼과 회원가입 폼은 같은 필드를 사용합니다.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsForm {
    /// 앞뒤 공백을 제거한 사용자 이름
    pub fn username(&self) -> &str {
        self.username.trim()
    }
}

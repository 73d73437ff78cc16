//! # 세션 모델 정의
//!
//! 요청마다 쿠키에서 읽어 핸들러에 넘기고, 핸들러가 갱신한 값을 다시 쿠키로
//! 돌려보내는 세션 값입니다. 전역 상태 없이 값 자체를 주고받습니다.
//!
//! ## 상태
//! ```text
//! Anonymous --sign_in(user)--> SignedIn(user) --sign_out()--> Anonymous
//! ```
//!
//! 플래시 메시지는 다음에 렌더링되는 페이지에 한 번만 표시되고 사라집니다.

use serde::{Deserialize, Serialize};

/// 보호된 작업을 로그인 없이 시도했을 때 남기는 플래시 메시지
pub const SIGN_IN_REQUIRED: &str = "You must be signed in to do that.";

/// 세션 하나의 상태
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// 로그인한 사용자 이름. None이면 익명 세션.
    pub username: Option<String>,
    /// 다음 페이지에 한 번 표시될 메시지
    pub flash: Option<String>,
}

/// 인증 상태 머신의 두 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState<'a> {
    Anonymous,
    SignedIn(&'a str),
}

impl Session {
    pub fn state(&self) -> AuthState<'_> {
        match self.username.as_deref() {
            Some(user) => AuthState::SignedIn(user),
            None => AuthState::Anonymous,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.username.is_some()
    }

    /// 자격증명 검증이 끝난 뒤에만 호출됩니다.
    pub fn sign_in(self, username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..self
        }
    }

    pub fn sign_out(self) -> Self {
        Self {
            username: None,
            ..self
        }
    }

    /// 기존 플래시 메시지를 덮어씁니다.
    pub fn with_flash(self, message: impl Into<String>) -> Self {
        Self {
            flash: Some(message.into()),
            ..self
        }
    }

    /// 플래시 메시지를 꺼내고, 메시지가 비워진 세션을 함께 반환합니다.
    pub fn take_flash(self) -> (Self, Option<String>) {
        let flash = self.flash;
        (
            Self {
                flash: None,
                username: self.username,
            },
            flash,
        )
    }

    /// 로그인 상태이면 사용자 이름을 돌려주고,
    /// 익명이면 안내 플래시 메시지가 설정된 세션을 Err로 돌려줍니다.
    /// 호출자는 Err를 받으면 작업 대신 `/`로 리다이렉트해야 합니다.
    pub fn require_signed_in(&self) -> Result<&str, Session> {
        match self.state() {
            AuthState::SignedIn(user) => Ok(user),
            AuthState::Anonymous => Err(self.clone().with_flash(SIGN_IN_REQUIRED)),
        }
    }
}

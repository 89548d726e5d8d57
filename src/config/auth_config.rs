//! # Authentication Configuration Module
//!
//! 아이덴티티 프로바이더 연결 정보, 비밀번호 정책, 계정 삭제 정책을 관리합니다.
//!
//! ## 지원하는 로그인 방식
//!
//! 1. **이메일/비밀번호**: 프로바이더 태그 `password`
//! 2. **Google**: 프로바이더 태그 `google.com`
//! 3. **GitHub**: 프로바이더 태그 `github.com`
//!
//! ## 필수 환경 변수 설정
//!
//! ```bash
//! export IDENTITY_API_KEY="your-web-api-key"
//! ```
//!
//! ## 선택 환경 변수
//!
//! ```bash
//! export IDENTITY_TOOLKIT_ENDPOINT="https://identitytoolkit.googleapis.com/v1"
//! export IDENTITY_IDP_REQUEST_URI="http://localhost:3000"
//! export PASSWORD_MIN_LENGTH="6"
//! export DELETION_VERIFY_AFTER_DELETE="true"
//! ```

use std::env;

use serde::{Deserialize, Serialize};

use crate::core::errors::{AppError, AppResult};

/// 아이덴티티 프로바이더(Identity Toolkit REST API) 연결 설정
pub struct IdentityProviderConfig;

impl IdentityProviderConfig {
    pub fn api_key() -> AppResult<String> {
        env::var("IDENTITY_API_KEY")
            .map_err(|_| AppError::InternalError("IDENTITY_API_KEY must be set".to_string()))
    }

    pub fn endpoint() -> String {
        env::var("IDENTITY_TOOLKIT_ENDPOINT")
            .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com/v1".to_string())
    }

    /// `signInWithIdp` 호출 시 전달하는 요청 URI
    pub fn idp_request_uri() -> String {
        env::var("IDENTITY_IDP_REQUEST_URI").unwrap_or_else(|_| "http://localhost:3000".to_string())
    }

    pub fn request_timeout_secs() -> u64 {
        env::var("IDENTITY_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .unwrap_or(15)
    }
}

/// 비밀번호 정책
pub struct PasswordPolicy;

impl PasswordPolicy {
    pub const DEFAULT_MIN_LENGTH: u64 = 6;

    pub fn min_length() -> u64 {
        env::var("PASSWORD_MIN_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|len| *len >= Self::DEFAULT_MIN_LENGTH)
            .unwrap_or(Self::DEFAULT_MIN_LENGTH)
    }
}

/// 계정 삭제 정책
pub struct AccountDeletionConfig;

impl AccountDeletionConfig {
    /// 삭제 확인을 위해 사용자가 직접 입력해야 하는 문구
    pub const CONFIRMATION_PHRASE: &'static str = "DELETE";

    /// 감사 로그에 기록하는 삭제 사유
    pub const DELETION_REASON: &'static str = "user_requested";

    /// 삭제 후 검증 패스 실행 여부 (기본값: true)
    pub fn verify_after_delete() -> bool {
        env::var("DELETION_VERIFY_AFTER_DELETE")
            .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true)
    }
}

/// 계정에 연결된 로그인 프로바이더 태그
///
/// 아이덴티티 프로바이더가 내려주는 `providerId` 문자열과 1:1로 대응합니다.
/// 알 수 없는 태그는 버리지 않고 `Other`로 보존합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderTag {
    Password,
    Google,
    GitHub,
    Other(String),
}

impl ProviderTag {
    pub fn from_str(s: &str) -> Self {
        match s {
            "password" => ProviderTag::Password,
            "google.com" => ProviderTag::Google,
            "github.com" => ProviderTag::GitHub,
            other => ProviderTag::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProviderTag::Password => "password",
            ProviderTag::Google => "google.com",
            ProviderTag::GitHub => "github.com",
            ProviderTag::Other(tag) => tag,
        }
    }
}

impl From<String> for ProviderTag {
    fn from(value: String) -> Self {
        ProviderTag::from_str(&value)
    }
}

impl From<ProviderTag> for String {
    fn from(value: ProviderTag) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

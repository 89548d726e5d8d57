//! # Identity Provider Interface
//!
//! 관리형 아이덴티티 서비스가 제공하는 기능을 trait으로 정의합니다.
//! 사용자 레코드와 로그인 세션은 프로바이더가 소유하며, 이 라이브러리는
//! 아래 기능만 호출합니다.
//!
//! 프로바이더 에러는 [`ProviderError`]로 정규화됩니다. 원시 코드는
//! `message`에 보존되어 로그에만 남고, 사용자 메시지는 상위 계층이 만듭니다.

pub mod identity_toolkit;

pub use identity_toolkit::IdentityToolkitClient;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::core::errors::AppError;
use crate::domain::entities::users::{FederatedProvider, UserIdentity};

/// 프로바이더 중립 에러 코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorCode {
    WrongPassword,
    UserMismatch,
    UserNotFound,
    InvalidCredential,
    PopupClosedByUser,
    PopupBlocked,
    CancelledPopupRequest,
    OperationNotAllowed,
    RequiresRecentLogin,
    EmailAlreadyInUse,
    WeakPassword,
    InvalidEmail,
    TooManyRequests,
    NetworkRequestFailed,
    TokenExpired,
    UserDisabled,
    NoCurrentUser,
    Other(String),
}

impl ProviderErrorCode {
    /// SDK 스타일(`auth/wrong-password`)과 REST 스타일(`INVALID_PASSWORD`)
    /// 코드를 모두 해석합니다.
    ///
    /// REST 응답은 `WEAK_PASSWORD : Password should be ...`처럼 설명이 붙어
    /// 오기도 하므로 첫 토큰만 사용합니다.
    pub fn from_code(raw: &str) -> Self {
        let code = raw
            .trim()
            .trim_start_matches("auth/")
            .split(|c: char| c == ' ' || c == ':')
            .next()
            .unwrap_or_default();

        match code {
            "wrong-password" | "INVALID_PASSWORD" => ProviderErrorCode::WrongPassword,
            "user-mismatch" | "USER_MISMATCH" => ProviderErrorCode::UserMismatch,
            "user-not-found" | "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => ProviderErrorCode::UserNotFound,
            "invalid-credential" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => {
                ProviderErrorCode::InvalidCredential
            }
            "popup-closed-by-user" => ProviderErrorCode::PopupClosedByUser,
            "popup-blocked" => ProviderErrorCode::PopupBlocked,
            "cancelled-popup-request" => ProviderErrorCode::CancelledPopupRequest,
            "operation-not-allowed" | "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => {
                ProviderErrorCode::OperationNotAllowed
            }
            "requires-recent-login" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => {
                ProviderErrorCode::RequiresRecentLogin
            }
            "email-already-in-use" | "EMAIL_EXISTS" => ProviderErrorCode::EmailAlreadyInUse,
            "weak-password" | "WEAK_PASSWORD" => ProviderErrorCode::WeakPassword,
            "invalid-email" | "INVALID_EMAIL" | "MISSING_EMAIL" => ProviderErrorCode::InvalidEmail,
            "too-many-requests" | "TOO_MANY_ATTEMPTS_TRY_LATER" => ProviderErrorCode::TooManyRequests,
            "network-request-failed" => ProviderErrorCode::NetworkRequestFailed,
            "user-token-expired" | "invalid-user-token" | "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" => {
                ProviderErrorCode::TokenExpired
            }
            "user-disabled" | "USER_DISABLED" => ProviderErrorCode::UserDisabled,
            "no-current-user" => ProviderErrorCode::NoCurrentUser,
            _ => ProviderErrorCode::Other(raw.trim().to_string()),
        }
    }
}

impl std::fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderErrorCode::Other(code) => write!(f, "other({})", code),
            known => write!(f, "{:?}", known),
        }
    }
}

/// 아이덴티티 프로바이더 호출 실패
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: ProviderErrorCode,
    /// 프로바이더가 내려준 원문 (로그 전용)
    pub message: String,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkRequestFailed, message)
    }

    pub fn no_current_user() -> Self {
        Self::new(ProviderErrorCode::NoCurrentUser, "no signed-in user")
    }
}

/// 재인증 외의 일반 작업(로그인, 가입, 정보 변경)에서 발생한 프로바이더 에러 변환
///
/// 재인증 게이트는 이 변환 대신 `ReauthService`의 분류를 사용합니다.
impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        let message = match &err.code {
            ProviderErrorCode::WrongPassword
            | ProviderErrorCode::UserNotFound
            | ProviderErrorCode::InvalidCredential => "이메일 또는 비밀번호가 올바르지 않습니다",
            ProviderErrorCode::InvalidEmail => "유효한 이메일 주소를 입력해 주세요",
            ProviderErrorCode::WeakPassword => "비밀번호가 너무 약합니다",
            ProviderErrorCode::TooManyRequests => "시도 횟수가 너무 많습니다. 잠시 후 다시 시도해 주세요",
            ProviderErrorCode::UserDisabled => "비활성화된 계정입니다",
            ProviderErrorCode::PopupClosedByUser | ProviderErrorCode::CancelledPopupRequest => {
                "로그인이 취소되었습니다"
            }
            ProviderErrorCode::PopupBlocked => "팝업이 차단되었습니다. 브라우저에서 팝업을 허용해 주세요",
            ProviderErrorCode::OperationNotAllowed => "지원하지 않는 로그인 방식입니다",
            ProviderErrorCode::EmailAlreadyInUse => {
                return AppError::ConflictError("이미 사용 중인 이메일입니다".to_string());
            }
            ProviderErrorCode::RequiresRecentLogin
            | ProviderErrorCode::TokenExpired
            | ProviderErrorCode::NoCurrentUser => {
                return AppError::Precondition(err.to_string());
            }
            ProviderErrorCode::UserMismatch
            | ProviderErrorCode::NetworkRequestFailed
            | ProviderErrorCode::Other(_) => {
                return AppError::ExternalServiceError(err.to_string());
            }
        };

        AppError::ValidationError(message.to_string())
    }
}

/// 비밀번호 재인증 자격 증명
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCredential {
    pub email: String,
    pub password: String,
}

impl PasswordCredential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// 외부 IdP 팝업이 돌려준 자격 증명
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdpCredential {
    pub provider: FederatedProvider,
    pub id_token: Option<String>,
    pub access_token: Option<String>,
}

/// 외부 로그인 팝업을 여는 호스트 UI 기능
///
/// 팝업 창 자체는 호스트가 담당하고, 완료되면 IdP 토큰을 돌려줍니다.
/// 사용자가 창을 닫거나 브라우저가 팝업을 막으면 해당 코드의 [`ProviderError`]를 반환합니다.
#[async_trait]
pub trait PopupAuthenticator: Send + Sync {
    async fn authorize(&self, provider: FederatedProvider) -> Result<IdpCredential, ProviderError>;
}

/// 아이덴티티 프로바이더 기능 인터페이스
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 현재 로그인한 사용자 (동기 조회)
    fn current_user(&self) -> Option<UserIdentity>;

    /// 로그인 상태 변경 구독
    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>>;

    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<UserIdentity, ProviderError>;

    async fn sign_up_with_password(&self, email: &str, password: &str)
    -> Result<UserIdentity, ProviderError>;

    async fn sign_in_with_popup(&self, provider: FederatedProvider) -> Result<UserIdentity, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;

    async fn update_profile(
        &self,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<UserIdentity, ProviderError>;

    async fn update_email(&self, new_email: &str) -> Result<UserIdentity, ProviderError>;

    async fn update_password(&self, new_password: &str) -> Result<(), ProviderError>;

    async fn reauthenticate_with_credential(&self, credential: &PasswordCredential) -> Result<(), ProviderError>;

    async fn reauthenticate_with_popup(&self, provider: FederatedProvider) -> Result<(), ProviderError>;

    /// 현재 사용자의 아이덴티티 레코드 삭제 (성공 시 로그아웃 상태가 됨)
    async fn delete_current_user(&self) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_understands_both_styles() {
        assert_eq!(ProviderErrorCode::from_code("auth/wrong-password"), ProviderErrorCode::WrongPassword);
        assert_eq!(ProviderErrorCode::from_code("INVALID_PASSWORD"), ProviderErrorCode::WrongPassword);
        assert_eq!(
            ProviderErrorCode::from_code("auth/requires-recent-login"),
            ProviderErrorCode::RequiresRecentLogin
        );
        assert_eq!(
            ProviderErrorCode::from_code("CREDENTIAL_TOO_OLD_LOGIN_AGAIN"),
            ProviderErrorCode::RequiresRecentLogin
        );
        assert_eq!(
            ProviderErrorCode::from_code("auth/popup-closed-by-user"),
            ProviderErrorCode::PopupClosedByUser
        );
    }

    #[test]
    fn test_from_code_strips_rest_description() {
        assert_eq!(
            ProviderErrorCode::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            ProviderErrorCode::WeakPassword
        );
        assert_eq!(
            ProviderErrorCode::from_code("TOO_MANY_ATTEMPTS_TRY_LATER"),
            ProviderErrorCode::TooManyRequests
        );
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        assert_eq!(
            ProviderErrorCode::from_code("auth/something-new"),
            ProviderErrorCode::Other("auth/something-new".to_string())
        );
    }

    #[test]
    fn test_general_provider_errors_convert_to_app_errors() {
        let err: AppError = ProviderError::new(ProviderErrorCode::EmailAlreadyInUse, "EMAIL_EXISTS").into();
        assert!(matches!(err, AppError::ConflictError(_)));

        let err: AppError = ProviderError::new(ProviderErrorCode::WrongPassword, "INVALID_PASSWORD").into();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(!err.user_message().contains("INVALID_PASSWORD"));

        let err: AppError = ProviderError::network("connection reset").into();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
    }
}

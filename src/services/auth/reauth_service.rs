//! # 재인증 서비스
//!
//! 계정 삭제, 이메일/비밀번호 변경처럼 민감한 작업 직전에
//! 현재 사용자가 본인임을 다시 확인합니다.
//!
//! ## 계정 종류별 재인증
//!
//! | AccountKind | 입력 | 프로바이더 호출 |
//! |-------------|------|-----------------|
//! | `Password` | 현재 비밀번호 (필수) | `reauthenticate_with_credential` |
//! | `Federated(p)` | 확인 코드 (선택) | 코드가 맞을 때만 `reauthenticate_with_popup(p)` |
//!
//! 확인 코드가 틀리면 프로바이더를 호출하지 않고 즉시 거부합니다.
//! 이 서비스는 자체 부작용이 없으므로 몇 번이든 재시도할 수 있습니다.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clients::identity::{IdentityProvider, PasswordCredential, ProviderError, ProviderErrorCode};
use crate::core::errors::ReauthError;
use crate::domain::dto::users::request::{DeleteAccountRequest, EmailChangeRequest};
use crate::domain::entities::users::{AccountKind, SessionUser};
use crate::utils::string_utils::deletion_confirmation_code;

/// 재인증 입력
///
/// 비밀번호 계정은 `password`, 외부 로그인 계정은 `confirmation_code`를 사용합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReauthInput {
    pub password: Option<String>,
    pub confirmation_code: Option<String>,
}

impl ReauthInput {
    pub fn password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            confirmation_code: None,
        }
    }

    pub fn confirmation_code(code: impl Into<String>) -> Self {
        Self {
            password: None,
            confirmation_code: Some(code.into()),
        }
    }
}

impl From<&DeleteAccountRequest> for ReauthInput {
    fn from(req: &DeleteAccountRequest) -> Self {
        Self {
            password: req.password.clone(),
            confirmation_code: req.confirmation_code.clone(),
        }
    }
}

impl From<&EmailChangeRequest> for ReauthInput {
    fn from(req: &EmailChangeRequest) -> Self {
        Self {
            password: req.current_password.clone(),
            confirmation_code: req.confirmation_code.clone(),
        }
    }
}

/// 프로바이더 에러를 재인증 실패 종류로 정규화합니다.
pub fn classify(err: &ProviderError) -> ReauthError {
    match &err.code {
        ProviderErrorCode::WrongPassword => ReauthError::WrongCredential,
        ProviderErrorCode::UserMismatch => ReauthError::IdentityMismatch,
        ProviderErrorCode::UserNotFound
        | ProviderErrorCode::UserDisabled
        | ProviderErrorCode::TokenExpired
        | ProviderErrorCode::NoCurrentUser => ReauthError::UserNotFound,
        ProviderErrorCode::InvalidCredential | ProviderErrorCode::InvalidEmail => ReauthError::InvalidCredential,
        ProviderErrorCode::PopupClosedByUser => ReauthError::PopupClosedByUser,
        ProviderErrorCode::PopupBlocked => ReauthError::PopupBlocked,
        ProviderErrorCode::CancelledPopupRequest => ReauthError::PopupRequestSuperseded,
        ProviderErrorCode::OperationNotAllowed => ReauthError::UnsupportedProvider,
        ProviderErrorCode::TooManyRequests => ReauthError::TooManyAttempts,
        _ => ReauthError::Unavailable,
    }
}

pub struct ReauthService {
    identity: Arc<dyn IdentityProvider>,
}

impl ReauthService {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    /// 계정 종류에 맞는 방식으로 재인증합니다.
    pub async fn reauthenticate(&self, user: &SessionUser, input: &ReauthInput) -> Result<(), ReauthError> {
        let account = user.account.ok_or_else(|| {
            log::error!("계정 종류를 결정할 수 없음: providers={:?}", user.identity.providers);
            let linked: Vec<String> = user.identity.providers.iter().map(|p| p.to_string()).collect();
            ReauthError::Configuration(format!("no supported provider among [{}]", linked.join(", ")))
        })?;

        let outcome = match account {
            AccountKind::Password => self.with_password(user, input).await,
            AccountKind::Federated(provider) => {
                if let Some(code) = &input.confirmation_code {
                    if *code != deletion_confirmation_code(user.uid()) {
                        log::warn!("확인 코드 불일치로 재인증 거부");
                        return Err(ReauthError::ConfirmationCodeMismatch);
                    }
                }
                self.identity
                    .reauthenticate_with_popup(provider)
                    .await
                    .map_err(|e| Self::normalize(&e))
            }
        };

        if outcome.is_ok() {
            log::info!("재인증 성공 ({:?})", account);
        }
        outcome
    }

    async fn with_password(&self, user: &SessionUser, input: &ReauthInput) -> Result<(), ReauthError> {
        let password = input
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(ReauthError::PasswordRequired)?;

        let email = user.email().ok_or_else(|| {
            ReauthError::Configuration("password account without an email address".to_string())
        })?;

        self.identity
            .reauthenticate_with_credential(&PasswordCredential::new(email, password))
            .await
            .map_err(|e| Self::normalize(&e))
    }

    fn normalize(err: &ProviderError) -> ReauthError {
        let kind = classify(err);
        log::warn!("재인증 실패: {:?} (provider: {})", kind, err);
        kind
    }
}

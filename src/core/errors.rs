//! # Application Error Handling System
//!
//! 계정 라이브러리 전역에서 사용하는 통합 에러 처리 시스템입니다.
//! 모든 계층(스토어 어댑터, 리포지토리, 서비스, 세션)이 동일한 [`AppError`]를
//! 반환하며, UI 계층은 [`AppError::user_message`]로 사용자에게 보여줄
//! 단 하나의 메시지를 얻습니다.
//!
//! ## 에러 분류
//!
//! | AppError | 발생 지점 | 사용자 노출 |
//! |----------|-----------|-------------|
//! | `Precondition` | 로그인 세션 없이 호출 | O |
//! | `Reauthentication` | 재인증 게이트 | O (세부 종류별 메시지) |
//! | `DataDeletionFailed` | 연쇄 삭제 배치 | O (아무것도 삭제되지 않음) |
//! | `PartialDeletion` | 데이터 삭제 후 계정 삭제 실패 | O (재로그인 후 재시도 안내) |
//! | `ValidationError` | 요청 DTO 검증 | O |
//! | `NotFound` / `ConflictError` | 리포지토리, 세션 | O |
//! | `DatabaseError` / `ExternalServiceError` / `InternalError` | 인프라 | 일반화된 메시지 |
//!
//! 감사 로그 기록 실패와 삭제 검증 불일치는 에러로 전파되지 않고 로그로만 남습니다.
//!
//! ## 사용 패턴
//!
//! ```rust,ignore
//! use crate::core::errors::{AppError, AppResult};
//!
//! async fn load_profile(&self, uid: &str) -> AppResult<UserProfile> {
//!     self.profiles
//!         .get(uid)
//!         .await?
//!         .ok_or_else(|| AppError::NotFound("프로필을 찾을 수 없습니다".to_string()))
//! }
//! ```

use thiserror::Error;

use crate::clients::identity::{ProviderError, ProviderErrorCode};

/// 애플리케이션 전역 에러 타입
///
/// `thiserror`로 `Error` trait을 구현합니다. `Display` 출력은 로그용이며
/// 원본 원인을 포함할 수 있으므로, 사용자에게는 반드시 [`AppError::user_message`]를
/// 보여줘야 합니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 문서 스토어 관련 에러
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 입력값 검증 에러
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 리소스 찾을 수 없음 에러
    #[error("Not found: {0}")]
    NotFound(String),

    /// 충돌/중복 에러 (진행 중인 삭제 요청 등)
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// 인증된 세션이 필요한 작업을 세션 없이 호출한 경우
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// 민감한 작업 직전 재인증 실패
    #[error("Reauthentication failed: {0}")]
    Reauthentication(#[from] ReauthError),

    /// 연쇄 삭제 배치 실패
    ///
    /// 배치는 원자적으로 커밋되므로 이 에러가 반환되면 어떤 문서도 삭제되지 않았습니다.
    #[error("User data deletion failed: {0}")]
    DataDeletionFailed(String),

    /// 사용자 데이터는 삭제되었지만 계정(아이덴티티) 삭제에 실패한 상태
    ///
    /// 두 시스템을 묶는 트랜잭션이 없으므로 보상 처리 없이 그대로 보고합니다.
    /// 재로그인 후 재시도하면 빈 데이터에 대한 연쇄 삭제가 다시 수행된 뒤
    /// 계정 삭제가 진행됩니다.
    #[error("Identity deletion failed after user data was removed: {0}")]
    PartialDeletion(ProviderError),

    /// 외부 서비스 에러 (아이덴티티 프로바이더 등)
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 내부 에러
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 사용자에게 보여줄 메시지를 반환합니다.
    ///
    /// 실패 경로마다 정확히 하나의 사람이 읽을 수 있는 메시지를 제공하며,
    /// 프로바이더의 원시 에러 코드는 포함하지 않습니다.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Precondition(_) => "로그인이 필요합니다. 다시 로그인해 주세요".to_string(),
            AppError::Reauthentication(kind) => kind.user_message().to_string(),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::ConflictError(msg) => msg.clone(),
            AppError::DataDeletionFailed(_) => {
                "데이터 삭제에 실패했습니다. 삭제된 데이터는 없으니 잠시 후 다시 시도해 주세요".to_string()
            }
            AppError::PartialDeletion(cause) if cause.code == ProviderErrorCode::RequiresRecentLogin => {
                "보안을 위해 최근 로그인이 필요합니다. 다시 로그인한 후 계정 삭제를 재시도해 주세요. \
                 사용자 데이터는 이미 삭제되었습니다"
                    .to_string()
            }
            AppError::PartialDeletion(_) => {
                "사용자 데이터는 삭제되었지만 계정 삭제를 완료하지 못했습니다. \
                 다시 로그인한 후 계정 삭제를 재시도해 주세요"
                    .to_string()
            }
            AppError::DatabaseError(_) => "데이터 처리 중 오류가 발생했습니다".to_string(),
            AppError::ExternalServiceError(_) => {
                "인증 서비스와 통신하지 못했습니다. 잠시 후 다시 시도해 주세요".to_string()
            }
            AppError::InternalError(_) => "알 수 없는 오류가 발생했습니다".to_string(),
        }
    }

    /// 재로그인 후 재시도로 해결되는 에러인지 여부
    pub fn requires_sign_in_again(&self) -> bool {
        matches!(self, AppError::PartialDeletion(_) | AppError::Precondition(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // 필드 이름 순으로 정렬한 뒤 첫 번째 메시지만 사용자에게 보여준다
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .into_iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "입력값이 올바르지 않습니다".to_string());

        AppError::ValidationError(message)
    }
}

/// 재인증 실패 종류
///
/// 프로바이더별 에러 코드를 프로바이더 중립적인 분류로 정규화한 결과입니다.
/// 모든 종류는 올바른 자격 증명으로 재시도하거나 팝업 과정을 다시 진행하면
/// 복구할 수 있습니다.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReauthError {
    #[error("wrong credential")]
    WrongCredential,

    #[error("signed-in identity does not match the reauthenticated identity")]
    IdentityMismatch,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid credential")]
    InvalidCredential,

    #[error("popup closed by user")]
    PopupClosedByUser,

    #[error("popup blocked")]
    PopupBlocked,

    #[error("popup request superseded by a newer one")]
    PopupRequestSuperseded,

    #[error("provider not supported")]
    UnsupportedProvider,

    #[error("confirmation code mismatch")]
    ConfirmationCodeMismatch,

    #[error("password required")]
    PasswordRequired,

    #[error("too many attempts")]
    TooManyAttempts,

    /// 계정의 프로바이더 분류를 결정할 수 없는 설정 오류
    #[error("account provider configuration error: {0}")]
    Configuration(String),

    /// 분류되지 않은 프로바이더 장애 (원인은 로그에만 남김)
    #[error("identity provider unavailable")]
    Unavailable,
}

impl ReauthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ReauthError::WrongCredential => "비밀번호가 올바르지 않습니다",
            ReauthError::IdentityMismatch => "현재 로그인한 계정과 다른 계정으로 인증되었습니다",
            ReauthError::UserNotFound => "계정을 찾을 수 없습니다. 다시 로그인해 주세요",
            ReauthError::InvalidCredential => "인증 정보가 유효하지 않습니다. 다시 시도해 주세요",
            ReauthError::PopupClosedByUser => "인증 창이 닫혔습니다. 다시 시도해 주세요",
            ReauthError::PopupBlocked => "팝업이 차단되었습니다. 브라우저에서 팝업을 허용해 주세요",
            ReauthError::PopupRequestSuperseded => "다른 인증 요청이 진행 중입니다. 잠시 후 다시 시도해 주세요",
            ReauthError::UnsupportedProvider => "지원하지 않는 로그인 방식입니다",
            ReauthError::ConfirmationCodeMismatch => "확인 코드가 일치하지 않습니다",
            ReauthError::PasswordRequired => "현재 비밀번호를 입력해 주세요",
            ReauthError::TooManyAttempts => "시도 횟수가 너무 많습니다. 잠시 후 다시 시도해 주세요",
            ReauthError::Configuration(_) => "계정의 로그인 방식을 확인할 수 없습니다. 관리자에게 문의해 주세요",
            ReauthError::Unavailable => "인증 서비스와 통신하지 못했습니다. 잠시 후 다시 시도해 주세요",
        }
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}

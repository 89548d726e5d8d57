//! 계정 삭제 요청 DTO
//!
//! 삭제는 되돌릴 수 없으므로 확인 문구(`DELETE`)와 세 가지 동의 항목을
//! 모두 만족해야 합니다. 재인증 입력(비밀번호 또는 확인 코드)은
//! 계정 종류에 따라 재인증 서비스가 검사합니다.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::validate_accepted;
use crate::config::AccountDeletionConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DeleteAccountRequest {
    /// 비밀번호 계정의 현재 비밀번호
    pub password: Option<String>,

    /// 외부 로그인 계정에 표시된 확인 코드
    pub confirmation_code: Option<String>,

    #[validate(custom(function = "validate_confirmation_phrase"))]
    pub confirm_text: String,

    /// 모든 데이터가 완전히 삭제됨을 이해함
    #[validate(custom(function = "validate_accepted"))]
    pub understand: bool,

    /// 삭제가 영구적임을 이해함
    #[validate(custom(function = "validate_accepted"))]
    pub permanent: bool,

    /// 복구 방법이 없음을 이해함
    #[validate(custom(function = "validate_accepted"))]
    pub no_recover: bool,
}

fn validate_confirmation_phrase(text: &str) -> Result<(), ValidationError> {
    if text != AccountDeletionConfig::CONFIRMATION_PHRASE {
        return Err(ValidationError::new("confirmation_phrase")
            .with_message("확인을 위해 「DELETE」를 입력해 주세요".into()));
    }
    Ok(())
}

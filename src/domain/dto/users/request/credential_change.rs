//! 자격 증명 변경 요청 DTO
//!
//! 이메일/비밀번호 변경은 아이덴티티 프로바이더가 최근 로그인을 요구하므로
//! 항상 재인증 입력을 함께 받습니다.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::validate_password_policy;

/// 비밀번호 변경 요청
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_new_passwords_match"))]
pub struct PasswordChangeRequest {
    #[validate(length(min = 1, message = "현재 비밀번호를 입력해 주세요"))]
    pub current_password: String,

    #[validate(custom(function = "validate_password_policy"))]
    pub new_password: String,

    pub new_password_confirm: String,
}

fn validate_new_passwords_match(req: &PasswordChangeRequest) -> Result<(), ValidationError> {
    if req.new_password != req.new_password_confirm {
        return Err(ValidationError::new("passwords_mismatch")
            .with_message("새 비밀번호가 일치하지 않습니다".into()));
    }
    Ok(())
}

/// 이메일 변경 요청
///
/// 비밀번호 계정은 `current_password`, 외부 로그인 계정은 `confirmation_code`와
/// 팝업 재인증을 사용합니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailChangeRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해 주세요"))]
    pub new_email: String,

    pub current_password: Option<String>,

    pub confirmation_code: Option<String>,
}

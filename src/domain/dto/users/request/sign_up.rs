//! 회원가입 요청 DTO
//!
//! 이메일/비밀번호 회원가입 입력을 검증합니다.
//! 개인정보 처리방침 동의가 없으면 계정을 만들 수 없습니다.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{validate_accepted, validate_password_policy};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_passwords_match"))]
pub struct SignUpRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해 주세요"))]
    pub email: String,

    #[validate(custom(function = "validate_password_policy"))]
    pub password: String,

    pub password_confirm: String,

    #[validate(length(max = 50, message = "표시 이름은 50자 이하여야 합니다"))]
    pub display_name: Option<String>,

    #[validate(custom(
        function = "validate_accepted",
        message = "계정을 만들려면 개인정보 처리방침에 동의해야 합니다"
    ))]
    pub privacy_policy_accepted: bool,
}

fn validate_passwords_match(req: &SignUpRequest) -> Result<(), ValidationError> {
    if req.password != req.password_confirm {
        return Err(ValidationError::new("passwords_mismatch")
            .with_message("비밀번호가 일치하지 않습니다".into()));
    }
    Ok(())
}

//! # 사용자 관련 요청 DTO 모듈
//!
//! UI 이벤트 핸들러가 세션 컨텍스트에 넘기는 요청 데이터를 정의합니다.
//! 모든 요청은 `validator` 크레이트로 검증하며, 검증 실패 메시지는
//! 그대로 사용자에게 보여줄 수 있는 문장으로 작성합니다.
//!
//! ## 요청 목록
//!
//! - [`SignUpRequest`] - 이메일 회원가입 (개인정보 처리방침 동의 포함)
//! - [`PasswordChangeRequest`] / [`EmailChangeRequest`] - 재인증이 필요한 자격 증명 변경
//! - [`DeleteAccountRequest`] - 계정 삭제 (확인 문구, 동의 항목, 재인증 입력)
//! - [`ProfileUpdateRequest`] - 프로필 부분 수정

pub mod sign_up;
pub mod credential_change;
pub mod delete_account;
pub mod update_profile;

pub use sign_up::SignUpRequest;
pub use credential_change::{EmailChangeRequest, PasswordChangeRequest};
pub use delete_account::DeleteAccountRequest;
pub use update_profile::ProfileUpdateRequest;

use validator::ValidationError;

use crate::config::PasswordPolicy;

/// 비밀번호 최소 길이 정책 검증
pub(crate) fn validate_password_policy(password: &str) -> Result<(), ValidationError> {
    let min = PasswordPolicy::min_length() as usize;

    if password.chars().count() < min {
        return Err(ValidationError::new("password_too_short")
            .with_message(format!("비밀번호는 {}자 이상으로 입력해 주세요", min).into()));
    }

    Ok(())
}

/// 필수 동의 항목 검증
pub(crate) fn validate_accepted(value: &bool) -> Result<(), ValidationError> {
    if !*value {
        return Err(ValidationError::new("not_accepted")
            .with_message("필수 항목에 모두 동의해 주세요".into()));
    }
    Ok(())
}

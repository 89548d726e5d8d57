//! # 문자열 유틸리티
//!
//! 입력 정리와 계정 삭제 흐름에서 쓰는 식별자 변환 함수들입니다.

use crate::core::errors::AppError;

/// 감사 로그에 남기는 uid 앞부분 길이
const MASK_VISIBLE_CHARS: usize = 8;

/// 외부 로그인 계정의 삭제 확인 코드 길이
const CONFIRMATION_CODE_CHARS: usize = 6;

/// 필수 문자열 필드 검증 및 정리
///
/// 공백만 있는 값은 `ValidationError`, 나머지는 앞뒤 공백을 제거해 반환합니다.
///
/// ```rust,ignore
/// assert_eq!(validate_required_string("  a@b.c ", "이메일").unwrap(), "a@b.c");
/// assert!(validate_required_string("   ", "이메일").is_err());
/// ```
pub fn validate_required_string(value: &str, field_name: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!(
            "{}은(는) 필수입니다",
            field_name
        )));
    }
    Ok(trimmed.to_string())
}

/// 선택적 문자열 필드 정리
///
/// 값이 없거나 공백뿐이면 `None`입니다.
pub fn clean_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn trim_string(value: &str) -> String {
    value.trim().to_string()
}

/// 감사 로그용 uid 마스킹
///
/// 앞 8자만 남기고 `****`를 붙입니다. 8자 이하인 uid는 앞 절반만 남겨서
/// 원본 uid가 그대로 기록되지 않게 합니다.
///
/// ```rust,ignore
/// assert_eq!(mask_user_id("u123abcdefgh"), "u123abcd****");
/// assert_eq!(mask_user_id("short"), "sh****");
/// ```
pub fn mask_user_id(uid: &str) -> String {
    let len = uid.chars().count();
    let keep = if len > MASK_VISIBLE_CHARS { MASK_VISIBLE_CHARS } else { len / 2 };

    let visible: String = uid.chars().take(keep).collect();
    format!("{}****", visible)
}

/// 외부 로그인 계정이 삭제 시 입력해야 하는 확인 코드
///
/// uid 앞 6자를 대문자로 바꾼 값입니다.
pub fn deletion_confirmation_code(uid: &str) -> String {
    uid.chars()
        .take(CONFIRMATION_CODE_CHARS)
        .collect::<String>()
        .to_uppercase()
}

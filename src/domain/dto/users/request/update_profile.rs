//! 프로필 수정 요청 DTO
//!
//! 빈 문자열은 해당 필드를 비우는 의미로 허용합니다.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateUrl, ValidationError};

use crate::domain::entities::users::ProfileUpdate;
use crate::utils::string_utils::trim_string;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1, max = 50, message = "표시 이름은 1-50자 사이여야 합니다"))]
    pub display_name: Option<String>,

    #[validate(custom(function = "validate_optional_url"))]
    pub photo_url: Option<String>,

    #[validate(length(max = 500, message = "자기소개는 500자 이하여야 합니다"))]
    pub bio: Option<String>,

    #[validate(length(max = 100, message = "위치는 100자 이하여야 합니다"))]
    pub location: Option<String>,

    #[validate(custom(function = "validate_optional_url"))]
    pub website: Option<String>,

    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: Option<String>,
}

impl ProfileUpdateRequest {
    /// 공백을 정리한 프로필 수정 입력으로 변환합니다.
    pub fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            email: None,
            display_name: self.display_name.as_deref().map(trim_string),
            photo_url: self.photo_url.as_deref().map(trim_string),
            bio: self.bio.as_deref().map(trim_string),
            location: self.location.as_deref().map(trim_string),
            website: self.website.as_deref().map(trim_string),
            phone_number: self.phone_number.as_deref().map(trim_string),
        }
    }
}

fn validate_optional_url(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) || !trimmed.to_string().validate_url() {
        return Err(ValidationError::new("invalid_url")
            .with_message("http:// 또는 https://로 시작하는 올바른 URL을 입력해 주세요".into()));
    }
    Ok(())
}

fn validate_phone_number(value: &str) -> Result<(), ValidationError> {
    let valid = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));

    if !valid || value.chars().filter(|c| c.is_ascii_digit()).count() > 15 {
        return Err(ValidationError::new("invalid_phone_number")
            .with_message("전화번호 형식이 올바르지 않습니다".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_empty_website_to_clear_it() {
        let req = ProfileUpdateRequest {
            website: Some(String::new()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let req = ProfileUpdateRequest {
            website: Some("ftp://example.com".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_rejects_letters_in_phone_number() {
        let req = ProfileUpdateRequest {
            phone_number: Some("010-ABCD".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_into_update_trims_values() {
        let update = ProfileUpdateRequest {
            bio: Some("  hello  ".to_string()),
            website: Some(" https://example.com ".to_string()),
            ..Default::default()
        }
        .into_update();

        assert_eq!(update.bio.as_deref(), Some("hello"));
        assert_eq!(update.website.as_deref(), Some("https://example.com"));
        assert!(update.display_name.is_none());
    }
}

//! User Profile Entity
//!
//! `users/{uid}` 문서에 저장되는 사용자 프로필입니다.
//! 신원 정보(email, displayName, photoURL)의 비정규화 사본과
//! 애플리케이션 고유 필드를 함께 보관합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::UserIdentity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "photoURL", default)]
    pub photo_url: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub privacy_policy_accepted: bool,
    #[serde(default)]
    pub privacy_policy_accepted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 프로필 생성 입력
///
/// `uid`와 타임스탬프는 리포지토리가 채웁니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub email: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub phone_number: String,
    pub provider: String,
    pub privacy_policy_accepted: bool,
}

impl NewProfile {
    /// 신원 정보로부터 초기 프로필을 만듭니다.
    pub fn from_identity(identity: &UserIdentity) -> Self {
        Self {
            email: identity.email.clone().unwrap_or_default(),
            display_name: identity.display_name.clone().unwrap_or_default(),
            photo_url: identity.photo_url.clone().unwrap_or_default(),
            provider: identity
                .primary_provider()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    pub fn with_privacy_consent(mut self, accepted: bool) -> Self {
        self.privacy_policy_accepted = accepted;
        self
    }
}

/// 프로필 부분 수정 입력
///
/// `Some`인 필드만 병합됩니다. `updatedAt`은 리포지토리가 항상 갱신합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderTag;
    use serde_json::json;

    #[test]
    fn test_profile_deserializes_partial_document() {
        let profile: UserProfile = serde_json::from_value(json!({
            "uid": "u1",
            "email": "a@example.com",
            "photoURL": "https://example.com/a.png",
            "createdAt": "2024-05-01T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(profile.uid, "u1");
        assert_eq!(profile.photo_url, "https://example.com/a.png");
        assert_eq!(profile.bio, "");
        assert!(profile.created_at.is_some());
        assert!(profile.updated_at.is_none());
    }

    #[test]
    fn test_new_profile_from_identity() {
        let identity = UserIdentity {
            uid: "u1".to_string(),
            email: Some("a@example.com".to_string()),
            display_name: Some("Alice".to_string()),
            photo_url: None,
            providers: vec![ProviderTag::GitHub],
        };

        let profile = NewProfile::from_identity(&identity).with_privacy_consent(true);
        assert_eq!(profile.provider, "github.com");
        assert_eq!(profile.display_name, "Alice");
        assert!(profile.privacy_policy_accepted);
    }

    #[test]
    fn test_profile_update_serializes_only_supplied_fields() {
        let update = ProfileUpdate {
            bio: Some("hello".to_string()),
            photo_url: Some("p.png".to_string()),
            ..Default::default()
        };

        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, json!({ "bio": "hello", "photoURL": "p.png" }));
        assert!(ProfileUpdate::default().is_empty());
    }
}

//! # 프로필 리포지토리 구현
//!
//! `users/{uid}` 문서의 생성, 조회, 부분 수정, 삭제를 담당합니다.
//!
//! ## 타임스탬프 규칙
//!
//! - 생성 시 `createdAt`, `updatedAt`을 서버 타임스탬프로 채움
//! - 개인정보 처리방침 동의가 있으면 `privacyPolicyAcceptedAt`도 함께 채움
//! - 수정 시 `updatedAt`은 항상 갱신

use std::sync::Arc;

use log::debug;
use serde_json::json;

use crate::clients::store::DocumentStore;
use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::users::{NewProfile, ProfileUpdate, UserProfile};
use crate::domain::models::{DocumentRef, FieldValue, Fields, PROFILE_COLLECTION, from_document, to_fields};

#[derive(Clone)]
pub struct ProfileRepository {
    store: Arc<dyn DocumentStore>,
}

impl ProfileRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// 삭제 배치에 프로필을 스테이징할 때 쓰는 문서 참조
    pub fn document_ref(&self, uid: &str) -> DocumentRef {
        DocumentRef::new(PROFILE_COLLECTION, uid)
    }

    /// 프로필 생성
    ///
    /// 같은 uid의 문서가 이미 있으면 덮어씁니다 (마지막 쓰기 우선).
    pub async fn create(&self, uid: &str, profile: NewProfile) -> AppResult<()> {
        let mut fields = to_fields(&profile)?;
        fields.insert("uid".to_string(), json!(uid).into());
        fields.insert("createdAt".to_string(), FieldValue::ServerTimestamp);
        fields.insert("updatedAt".to_string(), FieldValue::ServerTimestamp);

        if profile.privacy_policy_accepted {
            fields.insert("privacyPolicyAcceptedAt".to_string(), FieldValue::ServerTimestamp);
        }

        self.store.set(&self.document_ref(uid), fields).await?;
        debug!("프로필 생성: {}", uid);
        Ok(())
    }

    /// 프로필 조회
    pub async fn get(&self, uid: &str) -> AppResult<Option<UserProfile>> {
        self.store
            .get(&self.document_ref(uid))
            .await?
            .map(from_document)
            .transpose()
    }

    /// 프로필 문서 존재 여부
    pub async fn exists(&self, uid: &str) -> AppResult<bool> {
        Ok(self.store.get(&self.document_ref(uid)).await?.is_some())
    }

    /// 주어진 필드만 병합하고 `updatedAt`을 갱신합니다.
    ///
    /// 프로필이 없으면 `NotFound`를 반환합니다.
    pub async fn update(&self, uid: &str, update: ProfileUpdate) -> AppResult<()> {
        let mut fields = to_fields(&update)?;
        fields.insert("updatedAt".to_string(), FieldValue::ServerTimestamp);

        self.store
            .update(&self.document_ref(uid), fields)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound("프로필을 찾을 수 없습니다".to_string()),
                other => other,
            })
    }

    /// 개인정보 처리방침 동의를 기록합니다.
    ///
    /// 동의 없이 먼저 만들어진 프로필에 가입 시점의 동의를 반영할 때 씁니다.
    pub async fn record_privacy_consent(&self, uid: &str) -> AppResult<()> {
        let mut fields = Fields::new();
        fields.insert("privacyPolicyAccepted".to_string(), json!(true).into());
        fields.insert("privacyPolicyAcceptedAt".to_string(), FieldValue::ServerTimestamp);
        fields.insert("updatedAt".to_string(), FieldValue::ServerTimestamp);

        self.store.update(&self.document_ref(uid), fields).await
    }

    /// 프로필 단독 삭제
    ///
    /// 계정 삭제 흐름은 이 메서드 대신 연쇄 삭제 배치에 프로필을 포함시킵니다.
    pub async fn delete(&self, uid: &str) -> AppResult<()> {
        self.store.delete(&self.document_ref(uid)).await
    }
}

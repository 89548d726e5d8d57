//! # 계정 삭제 서비스 구현
//!
//! 사용자 계정과 그 사용자에게 속한 모든 데이터를 영구 삭제합니다.
//!
//! ## 삭제 파이프라인
//!
//! ```text
//! ┌──────────────────────┐
//! │ 1. 재인증 (필수)       │── 실패 ──► Reauthentication (스토어/계정 호출 없음)
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ 2. 연쇄 삭제           │── 실패 ──► DataDeletionFailed (아무것도 삭제되지 않음)
//! │  • 9개 카테고리 동시 조회 │
//! │  • 프로필 + 매칭 문서를   │
//! │    하나의 배치로 커밋     │
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ 3. 감사 로그 (best-effort)│── 실패 ──► error 로그만 남기고 계속
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ 4. 아이덴티티 삭제       │── 실패 ──► PartialDeletion (데이터는 이미 삭제됨)
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ 5. 삭제 검증 (선택)     │── 잔여/실패 ──► warn 로그만 남김
//! └──────────┬───────────┘
//!            ▼
//!     DeletionResult
//! ```
//!
//! ## 불일치 구간
//!
//! 2단계 커밋과 4단계 사이에는 데이터는 없고 계정은 남아 있는 구간이 존재합니다.
//! 4단계가 실패해도 보상 처리는 하지 않습니다. 사용자가 다시 로그인해 재시도하면
//! 빈 데이터에 대한 연쇄 삭제(모든 카운트 0)가 수행된 뒤 계정 삭제가 진행됩니다.
//!
//! 같은 uid에 대한 동시 호출은 지원하지 않으며, 세션 컨텍스트가 진행 중 플래그로 막습니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::{try_join, try_join_all};
use serde_json::{Value, json};

use crate::clients::identity::IdentityProvider;
use crate::clients::store::DocumentStore;
use crate::config::AccountDeletionConfig;
use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::audit::DeletionLog;
use crate::domain::entities::users::SessionUser;
use crate::domain::models::{
    DataCategory, DeletionResult, DocumentRef, OWNER_FIELD, PROFILE_CATEGORY, PROFILE_COLLECTION,
    VerificationReport,
};
use crate::repositories::audit::DeletionLogRepository;
use crate::repositories::profiles::ProfileRepository;
use crate::services::auth::{ReauthInput, ReauthService};
use crate::utils::string_utils::mask_user_id;

pub struct AccountDeletionService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    reauth: Arc<ReauthService>,
    profiles: ProfileRepository,
    deletion_logs: DeletionLogRepository,
    verify_after_delete: bool,
}

impl AccountDeletionService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        reauth: Arc<ReauthService>,
    ) -> Self {
        Self {
            profiles: ProfileRepository::new(store.clone()),
            deletion_logs: DeletionLogRepository::new(store.clone()),
            store,
            identity,
            reauth,
            verify_after_delete: AccountDeletionConfig::verify_after_delete(),
        }
    }

    /// 삭제 후 검증 패스 사용 여부를 지정합니다.
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify_after_delete = enabled;
        self
    }

    /// 계정 삭제
    ///
    /// 비밀번호 계정은 `input.password`, 외부 로그인 계정은 `input.confirmation_code`를
    /// 재인증에 사용합니다. 재인증은 어떤 경우에도 생략되지 않습니다.
    ///
    /// # 반환값
    ///
    /// * `Ok(DeletionResult)` - 데이터와 계정이 모두 삭제됨
    /// * `Err(AppError::Reauthentication)` - 아무것도 변경되지 않음
    /// * `Err(AppError::DataDeletionFailed)` - 아무것도 삭제되지 않음
    /// * `Err(AppError::PartialDeletion)` - 데이터는 삭제되었고 계정은 남아 있음
    pub async fn delete_account(&self, user: &SessionUser, input: &ReauthInput) -> AppResult<DeletionResult> {
        let uid = user.uid();
        let masked = mask_user_id(uid);

        self.reauth.reauthenticate(user, input).await?;
        log::info!("🗑️ 계정 삭제 시작: {}", masked);

        let result = self.cascade_delete(uid).await?;

        if result.total() == 0 {
            // 이전 시도에서 데이터가 이미 삭제되어 감사 로그도 기록됨
            log::debug!("삭제할 데이터 없음, 감사 로그 생략 ({})", masked);
        } else {
            let audit = DeletionLog::for_user_request(uid, &result);
            if let Err(e) = self.deletion_logs.append(&audit).await {
                log::error!("❌ 삭제 감사 로그 기록 실패 ({}): {}", masked, e);
            }
        }

        self.identity.delete_current_user().await.map_err(|e| {
            log::error!("❌ 데이터 삭제 후 계정 삭제 실패 ({}): {}", masked, e);
            AppError::PartialDeletion(e)
        })?;

        if self.verify_after_delete {
            match self.verify_deletion(uid).await {
                Ok(report) if report.is_completely_deleted() => {
                    log::debug!("삭제 검증 완료: 잔여 데이터 없음 ({})", masked);
                }
                Ok(report) => {
                    for (collection, count) in report.leftovers() {
                        log::warn!("⚠️ 삭제 후 잔여 데이터 ({}): {} {}건", masked, collection, count);
                    }
                }
                Err(e) => log::warn!("⚠️ 삭제 검증 실패 ({}): {}", masked, e),
            }
        }

        log::info!("✅ 계정 삭제 완료: {} (총 {}건)", masked, result.total());
        Ok(result)
    }

    /// 사용자 범위 데이터와 프로필을 하나의 원자적 배치로 삭제합니다.
    ///
    /// 프로필은 존재했을 때만 1로 집계되므로, 이미 비어 있는 사용자에 대해
    /// 다시 실행하면 모든 카운트가 0인 결과를 돌려줍니다.
    pub async fn cascade_delete(&self, uid: &str) -> AppResult<DeletionResult> {
        let owner = json!(uid);

        let (matches, profile_exists) = try_join(self.find_owned(&owner), self.profiles.exists(uid))
            .await
            .map_err(|e| self.deletion_failed(uid, e))?;

        let mut deleted_records = BTreeMap::new();
        let mut batch = self.store.batch();

        for (category, refs) in matches {
            deleted_records.insert(category.name().to_string(), refs.len());
            for doc in refs {
                batch.stage_delete(doc);
            }
        }

        if profile_exists {
            batch.stage_delete(self.profiles.document_ref(uid));
        }
        deleted_records.insert(PROFILE_CATEGORY.to_string(), usize::from(profile_exists));

        log::debug!("삭제 배치 커밋: {}건", batch.len());
        batch.commit().await.map_err(|e| self.deletion_failed(uid, e))?;

        Ok(DeletionResult::new(deleted_records))
    }

    /// 프로필과 9개 카테고리를 다시 읽어 남은 문서 수를 집계합니다.
    pub async fn verify_deletion(&self, uid: &str) -> AppResult<VerificationReport> {
        let owner = json!(uid);
        let (matches, profile_exists) = try_join(self.find_owned(&owner), self.profiles.exists(uid)).await?;

        let mut remaining: BTreeMap<String, usize> = matches
            .into_iter()
            .map(|(category, refs)| (category.collection().to_string(), refs.len()))
            .collect();
        remaining.insert(PROFILE_COLLECTION.to_string(), usize::from(profile_exists));

        Ok(VerificationReport::new(remaining))
    }

    /// 9개 카테고리의 `userId == uid` 쿼리를 동시에 실행합니다.
    async fn find_owned(&self, owner: &Value) -> AppResult<Vec<(DataCategory, Vec<DocumentRef>)>> {
        let queries = DataCategory::ALL.iter().map(|category| async move {
            let refs = self
                .store
                .query_eq(category.collection(), OWNER_FIELD, owner)
                .await?;
            Ok::<_, AppError>((*category, refs))
        });

        try_join_all(queries).await
    }

    fn deletion_failed(&self, uid: &str, cause: AppError) -> AppError {
        log::error!("❌ 사용자 데이터 삭제 실패 ({}): {}", mask_user_id(uid), cause);
        AppError::DataDeletionFailed(cause.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::identity::ProviderErrorCode;
    use crate::core::errors::ReauthError;
    use crate::repositories::audit::deletion_log_repo::DELETION_LOG_COLLECTION;
    use crate::test_support::{FakeIdentityProvider, FaultyStore, identity};

    const UID: &str = "u123abcdefgh";

    struct Fixture {
        store: Arc<FaultyStore>,
        provider: Arc<FakeIdentityProvider>,
        service: AccountDeletionService,
        user: SessionUser,
    }

    fn fixture(provider_tag: &str) -> Fixture {
        let user = SessionUser::new(identity(UID, "user@example.com", &[provider_tag]));
        let provider = Arc::new(if provider_tag == "password" {
            FakeIdentityProvider::signed_in_with_password(user.identity.clone(), "secret1")
        } else {
            FakeIdentityProvider::signed_in_federated(user.identity.clone())
        });
        let store = Arc::new(FaultyStore::new());
        let reauth = Arc::new(ReauthService::new(provider.clone()));
        let service = AccountDeletionService::new(store.clone(), provider.clone(), reauth).with_verification(true);

        Fixture {
            store,
            provider,
            service,
            user,
        }
    }

    fn seed_user_data(store: &FaultyStore) {
        store.seed("users", UID, json!({ "uid": UID, "email": "user@example.com" }));
        store.seed("sessions", "s1", json!({ "userId": UID }));
        store.seed("sessions", "s2", json!({ "userId": UID }));
        store.seed("userSettings", "st1", json!({ "userId": UID, "theme": "dark" }));
    }

    #[tokio::test]
    async fn test_federated_deletion_scenario() {
        let f = fixture("google.com");
        seed_user_data(&f.store);

        let result = f
            .service
            .delete_account(&f.user, &ReauthInput::confirmation_code("U123AB"))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.count("sessions"), 2);
        assert_eq!(result.count("settings"), 1);
        assert_eq!(result.count("profile"), 1);
        for category in ["logs", "notifications", "activities", "files", "devices", "preferences", "cache"] {
            assert_eq!(result.deleted_records.get(category), Some(&0));
        }
        assert_eq!(result.deleted_records.len(), 10);

        let logs = f.store.inner.documents(DELETION_LOG_COLLECTION);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0]["totalRecordsDeleted"], json!(4));
        assert_eq!(logs[0]["deletedUserId"], json!("u123abcd****"));

        assert_eq!(f.provider.delete_count(), 1);
        assert_eq!(f.store.inner.count("sessions"), 0);
        assert_eq!(f.store.inner.count("users"), 0);
    }

    #[tokio::test]
    async fn test_wrong_code_touches_nothing() {
        let f = fixture("google.com");
        seed_user_data(&f.store);

        let err = f
            .service
            .delete_account(&f.user, &ReauthInput::confirmation_code("WRONG1"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Reauthentication(ReauthError::ConfirmationCodeMismatch)
        ));
        assert_eq!(f.store.calls(), 0);
        assert_eq!(f.provider.reauth_count(), 0);
        assert_eq!(f.provider.delete_count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_password_mutates_nothing() {
        let f = fixture("password");
        seed_user_data(&f.store);

        let err = f
            .service
            .delete_account(&f.user, &ReauthInput::password("wrong"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Reauthentication(ReauthError::WrongCredential)));
        assert_eq!(f.store.calls(), 0);
        assert_eq!(f.provider.delete_count(), 0);
        assert_eq!(f.store.inner.count("sessions"), 2);
    }

    #[tokio::test]
    async fn test_password_deletion_counts_match_seeded_documents() {
        let f = fixture("password");
        seed_user_data(&f.store);
        f.store.seed("notifications", "n1", json!({ "userId": UID }));
        f.store.seed("notifications", "n2", json!({ "userId": UID }));
        f.store.seed("notifications", "n3", json!({ "userId": UID }));
        f.store.seed("userDevices", "d1", json!({ "userId": UID }));
        f.store.seed("sessions", "other", json!({ "userId": "someone-else" }));

        let result = f
            .service
            .delete_account(&f.user, &ReauthInput::password("secret1"))
            .await
            .unwrap();

        assert_eq!(result.count("sessions"), 2);
        assert_eq!(result.count("notifications"), 3);
        assert_eq!(result.count("devices"), 1);
        assert_eq!(result.total(), 8);

        // 다른 사용자의 문서는 남아 있어야 함
        assert_eq!(f.store.inner.count("sessions"), 1);
    }

    #[tokio::test]
    async fn test_cascade_is_idempotent() {
        let f = fixture("password");
        seed_user_data(&f.store);

        let first = f.service.cascade_delete(UID).await.unwrap();
        assert_eq!(first.total(), 4);

        let second = f.service.cascade_delete(UID).await.unwrap();
        assert!(second.success);
        assert_eq!(second.total(), 0);
        assert_eq!(second.deleted_records.len(), 10);
        assert!(second.deleted_records.values().all(|count| *count == 0));
    }

    #[tokio::test]
    async fn test_failed_commit_deletes_nothing() {
        let f = fixture("password");
        seed_user_data(&f.store);
        f.store.fail_commit(true);

        let err = f
            .service
            .delete_account(&f.user, &ReauthInput::password("secret1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DataDeletionFailed(_)));
        assert_eq!(f.store.inner.count("sessions"), 2);
        assert_eq!(f.store.inner.count("userSettings"), 1);
        assert_eq!(f.store.inner.count("users"), 1);
        assert_eq!(f.store.inner.count(DELETION_LOG_COLLECTION), 0);
        assert_eq!(f.provider.delete_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_query_deletes_nothing() {
        let f = fixture("password");
        seed_user_data(&f.store);
        f.store.fail_queries(true);

        let err = f
            .service
            .delete_account(&f.user, &ReauthInput::password("secret1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DataDeletionFailed(_)));
        assert_eq!(f.store.inner.total_documents(), 4);
        assert_eq!(f.provider.delete_count(), 0);
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_abort_deletion() {
        let f = fixture("password");
        seed_user_data(&f.store);
        f.store.fail_add(true);

        let result = f
            .service
            .delete_account(&f.user, &ReauthInput::password("secret1"))
            .await
            .unwrap();

        assert_eq!(result.total(), 4);
        assert_eq!(f.provider.delete_count(), 1);
        assert_eq!(f.store.inner.count(DELETION_LOG_COLLECTION), 0);
    }

    #[tokio::test]
    async fn test_identity_failure_reports_partial_deletion() {
        let f = fixture("password");
        seed_user_data(&f.store);
        f.provider.fail_delete(ProviderErrorCode::RequiresRecentLogin);

        let err = f
            .service
            .delete_account(&f.user, &ReauthInput::password("secret1"))
            .await
            .unwrap_err();

        match &err {
            AppError::PartialDeletion(cause) => assert_eq!(cause.code, ProviderErrorCode::RequiresRecentLogin),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.user_message().contains("다시 로그인"));
        assert_eq!(f.store.inner.count("sessions"), 0);
        assert_eq!(f.store.inner.count(DELETION_LOG_COLLECTION), 1);

        // 재시도하면 빈 데이터에 대한 연쇄 삭제 후 계정 삭제가 진행됨
        f.provider.clear_delete_failure();
        let retry = f
            .service
            .delete_account(&f.user, &ReauthInput::password("secret1"))
            .await
            .unwrap();
        assert_eq!(retry.total(), 0);
        assert_eq!(f.provider.delete_count(), 2);
        assert!(f.provider.current_user().is_none());

        // 감사 로그는 데이터를 실제로 지운 첫 시도에서만 기록됨
        let logs = f.store.inner.documents(DELETION_LOG_COLLECTION);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0]["totalRecordsDeleted"], json!(4));
    }

    #[tokio::test]
    async fn test_verification_read_failure_keeps_success() {
        let f = fixture("password");
        seed_user_data(&f.store);
        f.store.fail_reads_after_commit(true);

        let result = f
            .service
            .delete_account(&f.user, &ReauthInput::password("secret1"))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.total(), 4);
        assert_eq!(result.count("sessions"), 2);
        assert_eq!(f.provider.delete_count(), 1);
        assert_eq!(f.store.inner.count(DELETION_LOG_COLLECTION), 1);
        assert!(f.service.verify_deletion(UID).await.is_err());
    }

    #[tokio::test]
    async fn test_verification_leftover_keeps_success() {
        let f = fixture("password");
        seed_user_data(&f.store);
        f.store.seed_after_commit("sessions", "late", json!({ "userId": UID }));

        let result = f
            .service
            .delete_account(&f.user, &ReauthInput::password("secret1"))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.total(), 4);
        assert!(f.provider.current_user().is_none());

        let report = f.service.verify_deletion(UID).await.unwrap();
        assert_eq!(report.leftovers().collect::<Vec<_>>(), vec![("sessions", 1)]);
    }

    #[tokio::test]
    async fn test_verify_deletion_reports_leftovers() {
        let f = fixture("password");
        seed_user_data(&f.store);

        let before = f.service.verify_deletion(UID).await.unwrap();
        assert_eq!(before.total_remaining, 4);
        assert_eq!(before.remaining.get("users"), Some(&1));
        assert_eq!(before.remaining.get("userSettings"), Some(&1));

        f.service.cascade_delete(UID).await.unwrap();
        let after = f.service.verify_deletion(UID).await.unwrap();
        assert!(after.is_completely_deleted());
        assert_eq!(after.remaining.len(), 10);
    }
}

//! 테스트 공용 가짜 구현
//!
//! - [`FakeIdentityProvider`] - 미리 정한 결과를 돌려주고 호출 횟수를 세는 프로바이더
//! - [`FaultyStore`] - 인메모리 스토어를 감싸 호출 횟수를 세고 실패를 주입하는 스토어

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use crate::clients::identity::{
    IdentityProvider, PasswordCredential, ProviderError, ProviderErrorCode,
};
use crate::clients::store::{DocumentStore, WriteBatch};
use crate::config::ProviderTag;
use crate::core::errors::{AppError, AppResult};
use crate::db::memory_store::InMemoryDocumentStore;
use crate::domain::entities::users::{FederatedProvider, UserIdentity};
use crate::domain::models::{Document, DocumentRef, Fields};

pub fn identity(uid: &str, email: &str, providers: &[&str]) -> UserIdentity {
    UserIdentity {
        uid: uid.to_string(),
        email: Some(email.to_string()),
        display_name: None,
        photo_url: None,
        providers: providers.iter().map(|p| ProviderTag::from_str(p)).collect(),
    }
}

/// 스크립트 기반 아이덴티티 프로바이더
pub struct FakeIdentityProvider {
    user_tx: watch::Sender<Option<UserIdentity>>,
    /// email → (신원, 비밀번호)
    accounts: Mutex<BTreeMap<String, (UserIdentity, String)>>,
    popup_identity: Mutex<Option<UserIdentity>>,
    popup_error: Mutex<Option<ProviderError>>,
    delete_error: Mutex<Option<ProviderError>>,
    pub reauth_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub mutation_calls: AtomicUsize,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        let (user_tx, _) = watch::channel(None);
        Self {
            user_tx,
            accounts: Mutex::new(BTreeMap::new()),
            popup_identity: Mutex::new(None),
            popup_error: Mutex::new(None),
            delete_error: Mutex::new(None),
            reauth_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            mutation_calls: AtomicUsize::new(0),
        }
    }

    /// 비밀번호 계정으로 로그인된 상태
    pub fn signed_in_with_password(user: UserIdentity, password: &str) -> Self {
        let fake = Self::new();
        fake.register(user.clone(), password);
        fake.user_tx.send_replace(Some(user));
        fake
    }

    /// 외부 로그인 계정으로 로그인된 상태 (팝업은 같은 계정으로 성공)
    pub fn signed_in_federated(user: UserIdentity) -> Self {
        let fake = Self::new();
        fake.set_popup_identity(user.clone());
        fake.user_tx.send_replace(Some(user));
        fake
    }

    pub fn register(&self, user: UserIdentity, password: &str) {
        let email = user.email.clone().unwrap_or_default();
        self.accounts
            .lock()
            .unwrap()
            .insert(email, (user, password.to_string()));
    }

    pub fn set_popup_identity(&self, user: UserIdentity) {
        *self.popup_identity.lock().unwrap() = Some(user);
    }

    pub fn fail_popup(&self, code: ProviderErrorCode) {
        *self.popup_error.lock().unwrap() = Some(ProviderError::new(code, "popup failed"));
    }

    pub fn fail_delete(&self, code: ProviderErrorCode) {
        *self.delete_error.lock().unwrap() = Some(ProviderError::new(code, "delete failed"));
    }

    pub fn clear_delete_failure(&self) {
        *self.delete_error.lock().unwrap() = None;
    }

    pub fn reauth_count(&self) -> usize {
        self.reauth_calls.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn popup(&self) -> Result<UserIdentity, ProviderError> {
        if let Some(err) = self.popup_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.popup_identity
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProviderError::new(ProviderErrorCode::OperationNotAllowed, "no popup account"))
    }

    fn check_password(&self, email: &str, password: &str) -> Result<UserIdentity, ProviderError> {
        let accounts = self.accounts.lock().unwrap();
        let (user, expected) = accounts
            .get(email)
            .ok_or_else(|| ProviderError::new(ProviderErrorCode::UserNotFound, "EMAIL_NOT_FOUND"))?;

        if expected != password {
            return Err(ProviderError::new(ProviderErrorCode::WrongPassword, "INVALID_PASSWORD"));
        }
        Ok(user.clone())
    }

    fn ensure_same_user(&self, other: &UserIdentity) -> Result<(), ProviderError> {
        match self.current_user() {
            Some(current) if current.uid == other.uid => Ok(()),
            Some(_) => Err(ProviderError::new(ProviderErrorCode::UserMismatch, "USER_MISMATCH")),
            None => Err(ProviderError::no_current_user()),
        }
    }

    fn modify_current(&self, f: impl FnOnce(&mut UserIdentity)) -> Result<UserIdentity, ProviderError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        let mut user = self.current_user().ok_or_else(ProviderError::no_current_user)?;
        f(&mut user);
        self.user_tx.send_replace(Some(user.clone()));
        Ok(user)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user_tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.user_tx.subscribe()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<UserIdentity, ProviderError> {
        let user = self.check_password(email, password)?;
        self.user_tx.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up_with_password(&self, email: &str, password: &str) -> Result<UserIdentity, ProviderError> {
        if self.accounts.lock().unwrap().contains_key(email) {
            return Err(ProviderError::new(ProviderErrorCode::EmailAlreadyInUse, "EMAIL_EXISTS"));
        }
        let user = identity(&format!("new{}", email.len()), email, &["password"]);
        self.register(user.clone(), password);
        self.user_tx.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_with_popup(&self, _provider: FederatedProvider) -> Result<UserIdentity, ProviderError> {
        let user = self.popup()?;
        self.user_tx.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.user_tx.send_replace(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        if self.accounts.lock().unwrap().contains_key(email) {
            Ok(())
        } else {
            Err(ProviderError::new(ProviderErrorCode::UserNotFound, "EMAIL_NOT_FOUND"))
        }
    }

    async fn update_profile(
        &self,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<UserIdentity, ProviderError> {
        // 네트워크 왕복처럼 다른 태스크에 실행을 양보
        tokio::task::yield_now().await;
        self.modify_current(|user| {
            if let Some(name) = display_name {
                user.display_name = Some(name.to_string());
            }
            if let Some(url) = photo_url {
                user.photo_url = Some(url.to_string());
            }
        })
    }

    async fn update_email(&self, new_email: &str) -> Result<UserIdentity, ProviderError> {
        self.modify_current(|user| user.email = Some(new_email.to_string()))
    }

    async fn update_password(&self, new_password: &str) -> Result<(), ProviderError> {
        let user = self.modify_current(|_| {})?;
        self.register(user, new_password);
        Ok(())
    }

    async fn reauthenticate_with_credential(&self, credential: &PasswordCredential) -> Result<(), ProviderError> {
        self.reauth_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let user = self.check_password(&credential.email, &credential.password)?;
        self.ensure_same_user(&user)
    }

    async fn reauthenticate_with_popup(&self, _provider: FederatedProvider) -> Result<(), ProviderError> {
        self.reauth_calls.fetch_add(1, Ordering::SeqCst);
        let user = self.popup()?;
        self.ensure_same_user(&user)
    }

    async fn delete_current_user(&self) -> Result<(), ProviderError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.delete_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.user_tx.send_replace(None);
        Ok(())
    }
}

/// 호출을 세고 실패를 주입하는 스토어
#[derive(Default)]
pub struct FaultyStore {
    pub inner: InMemoryDocumentStore,
    calls: AtomicUsize,
    fail_commit: Arc<AtomicBool>,
    fail_add: AtomicBool,
    fail_queries: Arc<AtomicBool>,
    fail_reads_after_commit: Arc<AtomicBool>,
    seed_after_commit: Arc<Mutex<Vec<(String, String, Value)>>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, collection: &str, id: &str, value: Value) {
        self.inner.insert(collection, id, value).unwrap();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_commit(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    pub fn fail_add(&self, fail: bool) {
        self.fail_add.store(fail, Ordering::SeqCst);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// 배치 커밋이 성공한 뒤부터 읽기와 쿼리를 실패시킵니다.
    pub fn fail_reads_after_commit(&self, fail: bool) {
        self.fail_reads_after_commit.store(fail, Ordering::SeqCst);
    }

    /// 배치 커밋 직후 문서를 써 넣습니다 (커밋과 경합하는 늦은 쓰기).
    pub fn seed_after_commit(&self, collection: &str, id: &str, value: Value) {
        self.seed_after_commit
            .lock()
            .unwrap()
            .push((collection.to_string(), id.to_string(), value));
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn get(&self, doc: &DocumentRef) -> AppResult<Option<Document>> {
        self.touch();
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("injected read failure".to_string()));
        }
        self.inner.get(doc).await
    }

    async fn set(&self, doc: &DocumentRef, fields: Fields) -> AppResult<()> {
        self.touch();
        self.inner.set(doc, fields).await
    }

    async fn update(&self, doc: &DocumentRef, fields: Fields) -> AppResult<()> {
        self.touch();
        self.inner.update(doc, fields).await
    }

    async fn delete(&self, doc: &DocumentRef) -> AppResult<()> {
        self.touch();
        self.inner.delete(doc).await
    }

    async fn add(&self, collection: &str, fields: Fields) -> AppResult<DocumentRef> {
        self.touch();
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("injected add failure".to_string()));
        }
        self.inner.add(collection, fields).await
    }

    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> AppResult<Vec<DocumentRef>> {
        self.touch();
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("injected query failure".to_string()));
        }
        self.inner.query_eq(collection, field, value).await
    }

    fn batch(&self) -> Box<dyn WriteBatch> {
        self.touch();
        Box::new(FaultyBatch {
            inner: self.inner.batch(),
            store: self.inner.clone(),
            fail: Arc::clone(&self.fail_commit),
            fail_queries: Arc::clone(&self.fail_queries),
            fail_reads_after_commit: Arc::clone(&self.fail_reads_after_commit),
            seed_after_commit: Arc::clone(&self.seed_after_commit),
        })
    }
}

struct FaultyBatch {
    inner: Box<dyn WriteBatch>,
    store: InMemoryDocumentStore,
    fail: Arc<AtomicBool>,
    fail_queries: Arc<AtomicBool>,
    fail_reads_after_commit: Arc<AtomicBool>,
    seed_after_commit: Arc<Mutex<Vec<(String, String, Value)>>>,
}

#[async_trait]
impl WriteBatch for FaultyBatch {
    fn stage_delete(&mut self, doc: DocumentRef) {
        self.inner.stage_delete(doc);
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("injected commit failure".to_string()));
        }
        self.inner.commit().await?;

        if self.fail_reads_after_commit.load(Ordering::SeqCst) {
            self.fail_queries.store(true, Ordering::SeqCst);
        }
        for (collection, id, value) in self.seed_after_commit.lock().unwrap().drain(..) {
            self.store.insert(&collection, &id, value)?;
        }
        Ok(())
    }
}

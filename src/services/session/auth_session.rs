//! # 인증 세션 컨텍스트
//!
//! 현재 로그인한 사용자, 프로필, 진행 상태를 보관하고 UI 이벤트 핸들러가 호출하는
//! 계정 작업(로그인, 가입, 프로필/자격 증명 변경, 계정 삭제)을 제공합니다.
//!
//! 전역 싱글톤이 아니라 생성자로 협력 객체를 받는 일반 값이며,
//! 상태 변화는 [`watch`] 채널로 발행됩니다.
//!
//! ```rust,ignore
//! let session = Arc::new(AuthSession::new(identity, profiles, reauth, deletion));
//! session.load().await?;
//! let _listener = session.spawn_identity_listener();
//!
//! let mut state = session.subscribe();
//! while state.changed().await.is_ok() {
//!     render(&state.borrow());
//! }
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use validator::Validate;

use crate::clients::identity::IdentityProvider;
use crate::core::errors::{AppError, AppResult};
use crate::domain::dto::users::request::{
    DeleteAccountRequest, EmailChangeRequest, PasswordChangeRequest, ProfileUpdateRequest, SignUpRequest,
};
use crate::domain::entities::users::{
    AccountKind, FederatedProvider, NewProfile, ProfileUpdate, SessionUser, UserIdentity, UserProfile,
};
use crate::domain::models::DeletionResult;
use crate::repositories::profiles::ProfileRepository;
use crate::services::auth::{ReauthInput, ReauthService};
use crate::services::users::AccountDeletionService;
use crate::utils::string_utils::{clean_optional_string, deletion_confirmation_code, validate_required_string};

/// 구독자에게 발행되는 세션 상태
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<SessionUser>,
    pub profile: Option<UserProfile>,
    /// 최초 로드가 끝나기 전까지 `true`
    pub loading: bool,
    /// 계정 삭제 진행 중
    pub deleting: bool,
    /// 마지막으로 완료된 계정 삭제 결과
    pub last_deletion: Option<DeletionResult>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            profile: None,
            loading: true,
            deleting: false,
            last_deletion: None,
        }
    }
}

/// 삭제 진행 중 플래그와 발행된 `deleting` 상태를 함께 해제하는 가드
///
/// 삭제 future가 중간에 취소되어도 상태가 `deleting = true`로 남지 않습니다.
struct DeletionInFlight<'a>(&'a AuthSession);

impl Drop for DeletionInFlight<'_> {
    fn drop(&mut self) {
        self.0.deleting.store(false, Ordering::SeqCst);
        self.0
            .state_tx
            .send_if_modified(|state| std::mem::replace(&mut state.deleting, false));
    }
}

/// 세션 자신이 일으킨 프로바이더 로그인 상태 변화 구간
struct OwnChange<'a>(&'a AtomicUsize);

impl<'a> OwnChange<'a> {
    fn begin(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for OwnChange<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct AuthSession {
    identity: Arc<dyn IdentityProvider>,
    profiles: ProfileRepository,
    reauth: Arc<ReauthService>,
    deletion: Arc<AccountDeletionService>,
    state_tx: watch::Sender<SessionState>,
    deleting: AtomicBool,
    /// 진행 중인 자체 로그인/가입/로그아웃/삭제 수
    own_changes: AtomicUsize,
    /// `establish` 직렬화
    establishing: Mutex<()>,
}

impl AuthSession {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: ProfileRepository,
        reauth: Arc<ReauthService>,
        deletion: Arc<AccountDeletionService>,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::default());
        Self {
            identity,
            profiles,
            reauth,
            deletion,
            state_tx,
            deleting: AtomicBool::new(false),
            own_changes: AtomicUsize::new(0),
            establishing: Mutex::new(()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// 외부 로그인 계정이 삭제 시 입력해야 하는 확인 코드
    pub fn confirmation_code(&self) -> Option<String> {
        self.state_tx
            .borrow()
            .user
            .as_ref()
            .map(|user| deletion_confirmation_code(user.uid()))
    }

    /// 프로바이더의 현재 사용자로 세션을 초기화합니다.
    pub async fn load(&self) -> AppResult<()> {
        match self.identity.current_user() {
            Some(identity) => {
                self.establish(identity, None).await?;
            }
            None => self.publish_signed_out(None),
        }
        Ok(())
    }

    /// 프로바이더 쪽 로그인 상태 변화(토큰 만료, 다른 탭의 로그아웃 등)를 따라갑니다.
    ///
    /// 세션 자신의 작업이 일으킨 변화는 그 작업이 직접 반영하므로 건너뜁니다.
    /// 세션이 해제되면 리스너도 종료됩니다.
    pub fn spawn_identity_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let session: Weak<Self> = Arc::downgrade(self);
        let mut changes = self.identity.subscribe();

        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let current = changes.borrow_and_update().clone();
                let Some(session) = session.upgrade() else {
                    break;
                };
                if session.own_changes.load(Ordering::SeqCst) > 0 {
                    continue;
                }

                let known_uid = session.state_tx.borrow().user.as_ref().map(|u| u.uid().to_string());
                let new_uid = current.as_ref().map(|u| u.uid.clone());
                if known_uid == new_uid {
                    continue;
                }

                match current {
                    Some(identity) => {
                        if let Err(e) = session.establish(identity, None).await {
                            log::warn!("세션 동기화 실패: {}", e);
                        }
                    }
                    None => session.publish_signed_out(None),
                }
            }
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SessionUser> {
        let email = validate_required_string(email, "이메일")?;
        if password.is_empty() {
            return Err(AppError::ValidationError("비밀번호를 입력해 주세요".to_string()));
        }

        let _own = OwnChange::begin(&self.own_changes);
        let identity = self.identity.sign_in_with_password(&email, password).await?;
        self.establish(identity, None).await
    }

    /// 이메일 회원가입
    ///
    /// 가입 직후 개인정보 처리방침 동의 여부와 시각이 기록된 프로필을 만듭니다.
    pub async fn sign_up(&self, request: SignUpRequest) -> AppResult<SessionUser> {
        request.validate()?;

        let _own = OwnChange::begin(&self.own_changes);
        let email = request.email.trim();
        let mut identity = self.identity.sign_up_with_password(email, &request.password).await?;

        if let Some(name) = clean_optional_string(request.display_name.clone()) {
            // 계정은 이미 만들어졌으므로 표시 이름 설정 실패로 가입을 중단하지 않음
            match self.identity.update_profile(Some(&name), None).await {
                Ok(updated) => identity = updated,
                Err(e) => log::warn!("가입 후 표시 이름 설정 실패 ({}): {}", identity.uid, e),
            }
        }

        log::info!("회원가입 완료: {}", identity.uid);
        self.establish(identity, Some(request.privacy_policy_accepted)).await
    }

    pub async fn sign_in_with_google(&self) -> AppResult<SessionUser> {
        self.sign_in_with_popup(FederatedProvider::Google).await
    }

    pub async fn sign_in_with_github(&self) -> AppResult<SessionUser> {
        self.sign_in_with_popup(FederatedProvider::GitHub).await
    }

    async fn sign_in_with_popup(&self, provider: FederatedProvider) -> AppResult<SessionUser> {
        let _own = OwnChange::begin(&self.own_changes);
        let identity = self.identity.sign_in_with_popup(provider).await?;
        log::info!("{} 로그인: {}", provider.display_name(), identity.uid);
        self.establish(identity, None).await
    }

    pub async fn sign_out(&self) -> AppResult<()> {
        let _own = OwnChange::begin(&self.own_changes);
        self.identity.sign_out().await?;
        self.publish_signed_out(None);
        Ok(())
    }

    pub async fn reset_password(&self, email: &str) -> AppResult<()> {
        let email = validate_required_string(email, "이메일")?;
        self.identity.send_password_reset(&email).await?;
        Ok(())
    }

    /// 프로필 수정
    ///
    /// 표시 이름과 사진은 아이덴티티 레코드에도 반영합니다.
    pub async fn update_user_profile(&self, request: ProfileUpdateRequest) -> AppResult<UserProfile> {
        let user = self.require_user()?;
        request.validate()?;

        let update = request.into_update();
        let mut identity = user.identity.clone();

        if update.display_name.is_some() || update.photo_url.is_some() {
            identity = self
                .identity
                .update_profile(update.display_name.as_deref(), update.photo_url.as_deref())
                .await?;
        }

        if !update.is_empty() {
            self.profiles.update(user.uid(), update).await?;
        }

        self.refresh(identity).await
    }

    /// 이메일 변경 (재인증 후)
    pub async fn update_user_email(&self, request: EmailChangeRequest) -> AppResult<UserProfile> {
        let user = self.require_user()?;
        request.validate()?;

        self.reauth.reauthenticate(&user, &ReauthInput::from(&request)).await?;

        let new_email = request.new_email.trim();
        let identity = self.identity.update_email(new_email).await?;
        self.profiles
            .update(
                user.uid(),
                ProfileUpdate {
                    email: Some(new_email.to_string()),
                    ..Default::default()
                },
            )
            .await?;

        log::info!("이메일 변경 완료: {}", user.uid());
        self.refresh(identity).await
    }

    /// 비밀번호 변경 (재인증 후)
    ///
    /// 비밀번호 로그인 계정에서만 사용할 수 있습니다.
    pub async fn update_user_password(&self, request: PasswordChangeRequest) -> AppResult<()> {
        let user = self.require_user()?;
        if user.account != Some(AccountKind::Password) {
            return Err(AppError::ValidationError(
                "이메일/비밀번호로 가입한 계정만 비밀번호를 변경할 수 있습니다".to_string(),
            ));
        }
        request.validate()?;

        self.reauth
            .reauthenticate(&user, &ReauthInput::password(request.current_password.as_str()))
            .await?;
        self.identity.update_password(&request.new_password).await?;

        log::info!("비밀번호 변경 완료: {}", user.uid());
        Ok(())
    }

    /// 계정 삭제
    ///
    /// 확인 문구와 동의 항목을 검증한 뒤 삭제 서비스에 위임합니다.
    /// 이미 삭제가 진행 중이면 `ConflictError`로 거부합니다.
    pub async fn delete_user_account(&self, request: DeleteAccountRequest) -> AppResult<DeletionResult> {
        let user = self.require_user()?;
        request.validate()?;

        if self
            .deleting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::ConflictError("계정 삭제가 이미 진행 중입니다".to_string()));
        }
        let _in_flight = DeletionInFlight(self);
        let _own = OwnChange::begin(&self.own_changes);

        self.state_tx.send_modify(|state| state.deleting = true);

        let result = self.deletion.delete_account(&user, &ReauthInput::from(&request)).await?;
        self.publish_signed_out(Some(result.clone()));
        Ok(result)
    }

    fn require_user(&self) -> AppResult<SessionUser> {
        self.state_tx
            .borrow()
            .user
            .clone()
            .ok_or_else(|| AppError::Precondition("로그인된 사용자가 없습니다".to_string()))
    }

    /// 신원 정보로 세션을 수립하고, 프로필이 없으면 만듭니다.
    ///
    /// `privacy_consent`는 회원가입 직후에만 전달됩니다.
    async fn establish(&self, identity: UserIdentity, privacy_consent: Option<bool>) -> AppResult<SessionUser> {
        let _establishing = self.establishing.lock().await;
        let user = SessionUser::new(identity);

        let profile = match self.load_or_create_profile(&user, privacy_consent).await {
            Ok(profile) => profile,
            Err(e) => {
                self.state_tx.send_modify(|state| state.loading = false);
                return Err(e);
            }
        };

        self.state_tx.send_modify(|state| {
            state.user = Some(user.clone());
            state.profile = profile;
            state.loading = false;
        });
        Ok(user)
    }

    async fn load_or_create_profile(
        &self,
        user: &SessionUser,
        privacy_consent: Option<bool>,
    ) -> AppResult<Option<UserProfile>> {
        if let Some(profile) = self.profiles.get(user.uid()).await? {
            return match privacy_consent {
                Some(accepted) => self.merge_sign_up(user, profile, accepted).await,
                None => Ok(Some(profile)),
            };
        }

        let new_profile =
            NewProfile::from_identity(&user.identity).with_privacy_consent(privacy_consent.unwrap_or(false));
        self.profiles.create(user.uid(), new_profile).await?;
        log::info!("프로필 생성: {}", user.uid());

        self.profiles.get(user.uid()).await
    }

    /// 가입 직후인데 프로필이 이미 있으면 가입 정보(동의, 표시 이름)를 병합합니다.
    async fn merge_sign_up(
        &self,
        user: &SessionUser,
        profile: UserProfile,
        accepted: bool,
    ) -> AppResult<Option<UserProfile>> {
        let mut changed = false;

        if accepted && !profile.privacy_policy_accepted {
            self.profiles.record_privacy_consent(user.uid()).await?;
            changed = true;
        }

        if profile.display_name.is_empty() {
            if let Some(name) = user.identity.display_name.clone().filter(|n| !n.is_empty()) {
                let update = ProfileUpdate {
                    display_name: Some(name),
                    ..Default::default()
                };
                self.profiles.update(user.uid(), update).await?;
                changed = true;
            }
        }

        if changed {
            log::info!("가입 정보 병합: {}", user.uid());
            self.profiles.get(user.uid()).await
        } else {
            Ok(Some(profile))
        }
    }

    /// 변경된 신원 정보와 최신 프로필로 상태를 갱신합니다.
    async fn refresh(&self, identity: UserIdentity) -> AppResult<UserProfile> {
        let user = SessionUser::new(identity);
        let profile = self
            .profiles
            .get(user.uid())
            .await?
            .ok_or_else(|| AppError::NotFound("프로필을 찾을 수 없습니다".to_string()))?;

        self.state_tx.send_modify(|state| {
            state.user = Some(user);
            state.profile = Some(profile.clone());
        });
        Ok(profile)
    }

    fn publish_signed_out(&self, last_deletion: Option<DeletionResult>) {
        self.state_tx.send_modify(|state| {
            state.user = None;
            state.profile = None;
            state.loading = false;
            state.deleting = false;
            if last_deletion.is_some() {
                state.last_deletion = last_deletion;
            }
        });
    }
}

//! # Identity Toolkit REST Adapter
//!
//! 관리형 아이덴티티 서비스의 REST API(`accounts:*`)를 `reqwest`로 호출하는
//! [`IdentityProvider`] 구현입니다.
//!
//! ## 호출하는 엔드포인트
//!
//! | 기능 | 엔드포인트 |
//! |------|-----------|
//! | 이메일 가입 | `POST /accounts:signUp` |
//! | 이메일 로그인, 비밀번호 재인증 | `POST /accounts:signInWithPassword` |
//! | Google/GitHub 로그인, 팝업 재인증 | `POST /accounts:signInWithIdp` |
//! | 비밀번호 재설정 메일 | `POST /accounts:sendOobCode` |
//! | 프로필/이메일/비밀번호 변경 | `POST /accounts:update` |
//! | 계정 삭제 | `POST /accounts:delete` |
//! | 사용자 정보 조회 | `POST /accounts:lookup` |
//!
//! 에러 응답 `{"error":{"message":"CODE"}}`의 코드는
//! [`ProviderErrorCode::from_code`]로 정규화됩니다.
//!
//! ## 세션 관리
//!
//! 로그인에 성공하면 ID 토큰을 보관하고 [`watch`] 채널로 사용자 변경을 알립니다.
//! 재인증은 같은 자격 증명으로 다시 로그인해 토큰을 새로 받는 방식이며,
//! 다른 계정으로 인증되면 `UserMismatch`로 거부하고 기존 세션을 유지합니다.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tokio::sync::{Mutex, watch};

use super::{
    IdentityProvider, IdpCredential, PasswordCredential, PopupAuthenticator, ProviderError, ProviderErrorCode,
};
use crate::config::{IdentityProviderConfig, ProviderTag};
use crate::core::errors::{AppResult, ErrorContext};
use crate::domain::entities::users::{FederatedProvider, UserIdentity};

/// 로그인 응답 (`signUp`, `signInWithPassword`, `signInWithIdp` 공통)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    local_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    #[serde(default)]
    provider_user_info: Vec<ProviderUserInfo>,
    /// 비밀번호가 설정된 계정에만 존재
    password_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderUserInfo {
    provider_id: String,
}

impl AccountInfo {
    fn into_identity(self) -> UserIdentity {
        let mut providers: Vec<ProviderTag> = self
            .provider_user_info
            .iter()
            .map(|info| ProviderTag::from_str(&info.provider_id))
            .collect();

        if self.password_hash.is_some() && !providers.contains(&ProviderTag::Password) {
            providers.push(ProviderTag::Password);
        }

        UserIdentity {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name,
            photo_url: self.photo_url,
            providers,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// 에러 응답 본문을 [`ProviderError`]로 변환합니다.
fn parse_error_body(status: reqwest::StatusCode, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ProviderError::new(
            ProviderErrorCode::from_code(&envelope.error.message),
            envelope.error.message,
        ),
        Err(_) => ProviderError::new(
            ProviderErrorCode::Other(status.as_str().to_string()),
            format!("HTTP {}: {}", status, body),
        ),
    }
}

/// `signInWithIdp`의 `postBody` 생성
fn idp_post_body(credential: &IdpCredential) -> String {
    let mut parts = Vec::new();
    if let Some(token) = &credential.id_token {
        parts.push(format!("id_token={}", urlencoding::encode(token)));
    }
    if let Some(token) = &credential.access_token {
        parts.push(format!("access_token={}", urlencoding::encode(token)));
    }
    parts.push(format!(
        "providerId={}",
        urlencoding::encode(credential.provider.tag().as_str())
    ));
    parts.join("&")
}

/// Identity Toolkit REST 클라이언트
pub struct IdentityToolkitClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    idp_request_uri: String,
    popup: Arc<dyn PopupAuthenticator>,
    id_token: Mutex<Option<String>>,
    user_tx: watch::Sender<Option<UserIdentity>>,
}

impl IdentityToolkitClient {
    /// 환경 변수 설정으로 클라이언트를 만듭니다.
    ///
    /// `IDENTITY_API_KEY`가 없으면 실패합니다.
    pub fn from_env(popup: Arc<dyn PopupAuthenticator>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(IdentityProviderConfig::request_timeout_secs()))
            .build()
            .context("HTTP 클라이언트 생성 실패")?;

        Ok(Self::new(
            http,
            IdentityProviderConfig::endpoint(),
            IdentityProviderConfig::api_key()?,
            IdentityProviderConfig::idp_request_uri(),
            popup,
        ))
    }

    pub fn new(
        http: reqwest::Client,
        endpoint: String,
        api_key: String,
        idp_request_uri: String,
        popup: Arc<dyn PopupAuthenticator>,
    ) -> Self {
        let (user_tx, _) = watch::channel(None);
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            idp_request_uri,
            popup,
            id_token: Mutex::new(None),
            user_tx,
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, ProviderError> {
        let url = format!("{}/accounts:{}?key={}", self.endpoint, method, self.api_key);
        debug!("Identity Toolkit 호출: accounts:{}", method);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("accounts:{} 요청 실패: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = parse_error_body(status, &text);
            warn!("Identity Toolkit accounts:{} 실패: {}", method, err);
            return Err(err);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::network(format!("accounts:{} 응답 파싱 실패: {}", method, e)))
    }

    async fn lookup(&self, id_token: &str) -> Result<UserIdentity, ProviderError> {
        let response: LookupResponse = self.call("lookup", json!({ "idToken": id_token })).await?;

        response
            .users
            .into_iter()
            .next()
            .map(AccountInfo::into_identity)
            .ok_or_else(|| ProviderError::new(ProviderErrorCode::UserNotFound, "lookup returned no users"))
    }

    /// 로그인 응답으로 세션을 교체하고 구독자에게 알립니다.
    async fn establish(&self, signed_in: SignInResponse) -> Result<UserIdentity, ProviderError> {
        let identity = self.lookup(&signed_in.id_token).await?;
        *self.id_token.lock().await = Some(signed_in.id_token);
        self.user_tx.send_replace(Some(identity.clone()));
        info!("로그인 세션 수립: uid={}", identity.uid);
        Ok(identity)
    }

    async fn clear_session(&self) {
        *self.id_token.lock().await = None;
        self.user_tx.send_replace(None);
    }

    async fn current_token(&self) -> Result<String, ProviderError> {
        self.id_token
            .lock()
            .await
            .clone()
            .ok_or_else(ProviderError::no_current_user)
    }

    async fn sign_in_with_idp(&self, credential: &IdpCredential) -> Result<SignInResponse, ProviderError> {
        self.call(
            "signInWithIdp",
            json!({
                "postBody": idp_post_body(credential),
                "requestUri": self.idp_request_uri,
                "returnSecureToken": true,
                "returnIdpCredential": true,
            }),
        )
        .await
    }

    /// 재인증 결과가 현재 사용자와 같은지 확인한 뒤 새 토큰으로 교체합니다.
    async fn accept_reauthentication(&self, signed_in: SignInResponse) -> Result<(), ProviderError> {
        let current_uid = self
            .current_user()
            .map(|user| user.uid)
            .ok_or_else(ProviderError::no_current_user)?;

        if signed_in.local_id != current_uid {
            return Err(ProviderError::new(
                ProviderErrorCode::UserMismatch,
                "reauthenticated identity differs from the signed-in user",
            ));
        }

        *self.id_token.lock().await = Some(signed_in.id_token);
        Ok(())
    }

    async fn apply_update(&self, mut body: Value) -> Result<UserIdentity, ProviderError> {
        let token = self.current_token().await?;
        body["idToken"] = json!(token);
        body["returnSecureToken"] = json!(true);

        let updated: UpdateResponse = self.call("update", body).await?;
        let token = match updated.id_token {
            Some(fresh) => {
                *self.id_token.lock().await = Some(fresh.clone());
                fresh
            }
            None => token,
        };

        let identity = self.lookup(&token).await?;
        self.user_tx.send_replace(Some(identity.clone()));
        Ok(identity)
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user_tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.user_tx.subscribe()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<UserIdentity, ProviderError> {
        let signed_in = self
            .call(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        self.establish(signed_in).await
    }

    async fn sign_up_with_password(&self, email: &str, password: &str) -> Result<UserIdentity, ProviderError> {
        let signed_up = self
            .call(
                "signUp",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        self.establish(signed_up).await
    }

    async fn sign_in_with_popup(&self, provider: FederatedProvider) -> Result<UserIdentity, ProviderError> {
        let credential = self.popup.authorize(provider).await?;
        let signed_in = self.sign_in_with_idp(&credential).await?;
        self.establish(signed_in).await
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.clear_session().await;
        info!("로그아웃 완료");
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let _: Value = self
            .call("sendOobCode", json!({ "requestType": "PASSWORD_RESET", "email": email }))
            .await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<UserIdentity, ProviderError> {
        let mut body = json!({});
        if let Some(name) = display_name {
            body["displayName"] = json!(name);
        }
        if let Some(url) = photo_url {
            body["photoUrl"] = json!(url);
        }
        self.apply_update(body).await
    }

    async fn update_email(&self, new_email: &str) -> Result<UserIdentity, ProviderError> {
        self.apply_update(json!({ "email": new_email })).await
    }

    async fn update_password(&self, new_password: &str) -> Result<(), ProviderError> {
        self.apply_update(json!({ "password": new_password })).await?;
        Ok(())
    }

    async fn reauthenticate_with_credential(&self, credential: &PasswordCredential) -> Result<(), ProviderError> {
        let signed_in = self
            .call(
                "signInWithPassword",
                json!({
                    "email": credential.email,
                    "password": credential.password,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        self.accept_reauthentication(signed_in).await
    }

    async fn reauthenticate_with_popup(&self, provider: FederatedProvider) -> Result<(), ProviderError> {
        let credential = self.popup.authorize(provider).await?;
        let signed_in = self.sign_in_with_idp(&credential).await?;
        self.accept_reauthentication(signed_in).await
    }

    async fn delete_current_user(&self) -> Result<(), ProviderError> {
        let token = self.current_token().await?;
        let _: Value = self.call("delete", json!({ "idToken": token })).await?;
        self.clear_session().await;
        Ok(())
    }
}

//! # 초기화 및 조립
//!
//! 환경 변수 로드, 로깅 초기화, 세션 컨텍스트 조립을 담당합니다.
//!
//! ```rust,ignore
//! use auth_account_service::bootstrap;
//!
//! bootstrap::load_env_file();
//! bootstrap::init_logging();
//!
//! let session = bootstrap::build_session(popup).await?;
//! ```

use std::sync::Arc;

use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};

use crate::clients::identity::{IdentityProvider, IdentityToolkitClient, PopupAuthenticator};
use crate::clients::store::DocumentStore;
use crate::config::Environment;
use crate::core::errors::AppResult;
use crate::db::Database;
use crate::db::mongo_store::MongoDocumentStore;
use crate::repositories::profiles::ProfileRepository;
use crate::services::auth::ReauthService;
use crate::services::session::AuthSession;
use crate::services::users::AccountDeletionService;

/// `PROFILE`에 맞는 .env 파일을 로드합니다.
///
/// * `PROFILE=dev` - .env.dev
/// * `PROFILE=prod` - .env.prod
/// * 기타 - .env
///
/// `PROFILE`이 없으면 `ENVIRONMENT`로 정해지는 기본 프로필을 사용합니다.
pub fn load_env_file() {
    let profile = std::env::var("PROFILE")
        .unwrap_or_else(|_| Environment::current().default_profile().to_string());

    let file = match profile.as_str() {
        "prod" => ".env.prod",
        "dev" => ".env.dev",
        _ => {
            dotenv().ok();
            info!("기본 .env 파일 로드");
            return;
        }
    };

    match dotenv::from_filename(file) {
        Ok(_) => info!("{} 파일 로드 됨 (profile: {})", file, profile),
        Err(e) => error!("{} 파일 로드 실패: {}", file, e),
    }
}

/// `RUST_LOG` 기반 로깅 초기화 (기본값: info)
///
/// 이미 초기화된 경우 아무 일도 하지 않습니다.
pub fn init_logging() {
    let _ = env_logger::try_init_from_env(Env::default().default_filter_or("info"));
}

/// 스토어와 아이덴티티 프로바이더로 세션 컨텍스트를 조립합니다.
pub fn assemble(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> AuthSession {
    let reauth = Arc::new(ReauthService::new(identity.clone()));
    let deletion = Arc::new(AccountDeletionService::new(
        store.clone(),
        identity.clone(),
        reauth.clone(),
    ));

    AuthSession::new(identity, ProfileRepository::new(store), reauth, deletion)
}

/// 운영 구성(MongoDB + Identity Toolkit)으로 세션을 만들고 현재 사용자를 로드합니다.
///
/// `popup`은 호스트 UI가 제공하는 외부 로그인 팝업 구현입니다.
pub async fn build_session(popup: Arc<dyn PopupAuthenticator>) -> AppResult<Arc<AuthSession>> {
    info!("계정 세션 초기화 (environment: {:?})", Environment::current());

    let database = Database::connect().await?;
    let store: Arc<dyn DocumentStore> = Arc::new(MongoDocumentStore::new(database));
    let identity: Arc<dyn IdentityProvider> = Arc::new(IdentityToolkitClient::from_env(popup)?);

    let session = Arc::new(assemble(store, identity));
    session.load().await?;
    session.spawn_identity_listener();

    Ok(session)
}

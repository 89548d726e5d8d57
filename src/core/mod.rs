//! # Core Module
//!
//! 계정 라이브러리 전반에서 공유하는 핵심 타입을 제공합니다.
//!
//! ## 모듈 구성
//!
//! ### [`errors`] - 통합 에러 처리
//! - **AppError**: 라이브러리 전역 에러 타입
//! - **ReauthError**: 프로바이더 중립적인 재인증 실패 분류
//! - **사용자 메시지**: 실패 경로마다 하나의 사람이 읽을 수 있는 메시지
//! - **자동 변환**: thiserror 기반 에러 체인 관리
//!
//! ## 의존성 구성 방식
//!
//! 전역 서비스 로케이터 대신 모든 컴포넌트를 생성자에서 명시적으로 주입합니다.
//! 세션 컨텍스트는 프로세스당 하나를 만들어 UI 계층에 넘겨주고,
//! 테스트에서는 같은 생성자에 가짜 프로바이더와 인메모리 스토어를 넣습니다.
//!
//! ```rust,ignore
//! let store: Arc<dyn DocumentStore> = Arc::new(MongoDocumentStore::new(database));
//! let identity: Arc<dyn IdentityProvider> = Arc::new(IdentityToolkitClient::from_env(popup)?);
//!
//! let reauth = Arc::new(ReauthService::new(identity.clone()));
//! let deletion = Arc::new(AccountDeletionService::new(
//!     store.clone(),
//!     identity.clone(),
//!     reauth.clone(),
//! ));
//!
//! let session = AuthSession::new(identity, ProfileRepository::new(store), reauth, deletion);
//! ```

pub mod errors;

pub use errors::*;

//! 인증 서비스 모듈
//!
//! 민감한 작업 직전의 재인증 게이트를 제공합니다.
//!
//! ```rust,ignore
//! use crate::services::auth::{ReauthInput, ReauthService};
//!
//! let reauth = ReauthService::new(identity.clone());
//! reauth.reauthenticate(&user, &ReauthInput::password("secret1")).await?;
//! ```

pub mod reauth_service;

pub use reauth_service::{ReauthInput, ReauthService};

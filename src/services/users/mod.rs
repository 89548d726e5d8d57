//! 사용자 계정 서비스 모듈
//!
//! 계정 삭제 파이프라인(재인증 → 연쇄 삭제 → 감사 로그 → 계정 삭제 → 검증)을 제공합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::users::AccountDeletionService;
//!
//! let deletion = AccountDeletionService::new(store.clone(), identity.clone(), reauth.clone());
//! let result = deletion
//!     .delete_account(&user, &ReauthInput::confirmation_code("U123AB"))
//!     .await?;
//! println!("삭제된 레코드: {}", result.total());
//! ```

pub mod account_deletion_service;

pub use account_deletion_service::AccountDeletionService;

//! 사용자 관련 엔티티 모듈
//!
//! - [`identity`] - 아이덴티티 프로바이더의 사용자 레코드와 계정 종류
//! - [`profile`] - `users/{uid}` 프로필 문서

pub mod identity;
pub mod profile;

pub use identity::*;
pub use profile::*;

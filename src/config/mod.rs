//! # Configuration Module
//!
//! 계정 라이브러리의 설정 관리를 담당하는 모듈입니다.
//! 환경 변수 기반의 설정값들을 단위 구조체의 연관 함수로 노출합니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 문서 스토어 연결, 실행 환경 설정
//! - [`auth_config`] - 아이덴티티 프로바이더, 비밀번호 정책, 계정 삭제 정책
//!
//! 환경 변수 파일(`.env.dev`, `.env.prod`, `.env`)의 로딩은
//! [`crate::bootstrap::load_env_file`]에서 `PROFILE` 값에 따라 수행합니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::{DatabaseConfig, IdentityProviderConfig, PasswordPolicy};
//!
//! let uri = DatabaseConfig::uri();
//! let api_key = IdentityProviderConfig::api_key()?;
//! let min_len = PasswordPolicy::min_length();
//! ```

pub mod data_config;
pub mod auth_config;

pub use data_config::*;
pub use auth_config::*;

//! 데이터 액세스 계층을 담당하는 리포지토리 모듈
//!
//! 리포지토리는 [`DocumentStore`](crate::clients::store::DocumentStore) trait 객체를
//! 생성자로 받아 도메인 타입과 문서 표현 사이의 변환을 담당합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::repositories::profiles::ProfileRepository;
//!
//! let profiles = ProfileRepository::new(store.clone());
//! let profile = profiles.get("u123abcdefgh").await?;
//! ```

pub mod audit;
pub mod profiles;

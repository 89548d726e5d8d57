//! 계정 관리 라이브러리
//!
//! 이메일/비밀번호와 Google/GitHub 로그인을 지원하는 웹 애플리케이션의
//! 계정 계층입니다. 관리형 아이덴티티 서비스와 문서 스토어를 사용하며,
//! 핵심 기능은 되돌릴 수 없는 계정 삭제 파이프라인입니다.
//!
//! # Features
//!
//! - **세션 컨텍스트**: 로그인/가입/로그아웃, 프로필 지연 생성, 상태 구독
//! - **재인증 게이트**: 비밀번호 또는 확인 코드 + 팝업 재인증
//! - **연쇄 삭제**: 9개 사용자 데이터 카테고리와 프로필을 하나의 원자적 배치로 삭제
//! - **감사 로그**: 익명화된 삭제 기록 (`deletionLogs`)
//! - **삭제 검증**: 삭제 후 잔여 데이터 재확인
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   AuthSession   │ ← UI 이벤트 핸들러가 호출, watch 채널로 상태 발행
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← 재인증, 계정 삭제
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← 프로필, 감사 로그
//! └─────────────────┘
//!          │
//!          ▼
//! ┌──────────────────────────────────────┐
//! │ DocumentStore      IdentityProvider  │ ← MongoDB / Identity Toolkit REST
//! └──────────────────────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use auth_account_service::bootstrap;
//! use auth_account_service::domain::dto::users::request::DeleteAccountRequest;
//!
//! bootstrap::load_env_file();
//! bootstrap::init_logging();
//!
//! let session = bootstrap::build_session(popup).await?;
//! let code = session.confirmation_code();
//!
//! let result = session.delete_user_account(request).await?;
//! println!("삭제된 레코드: {}", result.total());
//! ```

pub mod bootstrap;
pub mod clients;
pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

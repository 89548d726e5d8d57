//! 인증 세션 컨텍스트 모듈
//!
//! UI 계층은 [`AuthSession`]을 하나 만들어 공유하고,
//! [`AuthSession::subscribe`]로 로그인 상태 변화를 구독합니다.

pub mod auth_session;

pub use auth_session::{AuthSession, SessionState};

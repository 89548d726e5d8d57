//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 모든 서비스는 생성자에서 협력 객체를 주입받습니다.
//!
//! - [`auth`] - 민감한 작업 직전의 재인증
//! - [`users`] - 계정 삭제 파이프라인
//! - [`session`] - UI 계층이 구독하는 인증 세션 컨텍스트

pub mod auth;
pub mod session;
pub mod users;

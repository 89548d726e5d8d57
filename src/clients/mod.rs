//! # External Client Interfaces
//!
//! 이 라이브러리가 소비하는 두 관리형 서비스의 기능 인터페이스입니다.
//!
//! - [`identity`] - 아이덴티티 프로바이더 (로그인, 재인증, 계정 삭제)
//! - [`store`] - 문서 스토어 (문서 CRUD, 동등 조건 쿼리, 원자적 쓰기 배치)
//!
//! 서비스 계층은 구체 타입이 아닌 trait 객체(`Arc<dyn ...>`)에만 의존하므로
//! 테스트에서는 가짜 구현을, 운영에서는 REST/MongoDB 어댑터를 주입합니다.

pub mod identity;
pub mod store;

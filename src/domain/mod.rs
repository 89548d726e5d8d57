//! # Domain Layer Module
//!
//! 계정 도메인의 타입들을 담당하는 모듈입니다.
//!
//! ## 아키텍처 개요
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── Entities  - 사용자 신원, 프로필, 감사 로그
//! ├── Models    - 문서 표현, 삭제 결과 같은 값 객체
//! └── DTOs      - UI 이벤트 핸들러가 넘기는 요청 데이터 (validator 검증)
//!      │
//!      ▼
//! Services (재인증, 계정 삭제, 세션)
//!      │
//!      ▼
//! Repositories → DocumentStore / IdentityProvider
//! ```

pub mod entities;
pub mod models;
pub mod dto;

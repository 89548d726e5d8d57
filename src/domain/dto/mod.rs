//! # Data Transfer Objects (DTO) Module
//!
//! UI 이벤트 핸들러와 세션 컨텍스트 사이의 요청 데이터를 정의합니다.
//!
//! ## 설계 원칙
//!
//! - **검증 내장**: `validator` 크레이트로 형식과 비즈니스 규칙을 검증
//! - **사용자 친화적 메시지**: 검증 실패 메시지를 그대로 화면에 표시 가능
//! - **도메인 분리**: 요청 DTO는 리포지토리 입력 타입(`ProfileUpdate` 등)으로 변환 후 사용

pub mod users;

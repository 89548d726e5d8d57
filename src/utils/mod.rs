//! 공통 유틸리티 함수 모듈
//!
//! - [`string_utils`] - 입력 문자열 정리, uid 마스킹, 삭제 확인 코드 생성

pub mod string_utils;

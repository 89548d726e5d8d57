//! # Domain Models Module
//!
//! 영속 엔티티가 아닌 값 객체와 스토어 표현 모델을 정의합니다.
//!
//! - [`document`] - 문서 참조, 쓰기 필드, 서버 타임스탬프 토큰
//! - [`deletion`] - 삭제 카테고리, 삭제 결과, 삭제 후 검증 결과

pub mod document;
pub mod deletion;

pub use document::*;
pub use deletion::*;

//! 감사 로그 엔티티 모듈

pub mod deletion_log;

pub use deletion_log::*;

//! 계정 삭제 감사 로그 리포지토리 모듈

pub mod deletion_log_repo;

pub use deletion_log_repo::DeletionLogRepository;

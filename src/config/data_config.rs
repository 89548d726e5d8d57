//! 데이터 저장소 및 실행 환경 설정 관리 모듈
//!
//! 문서 스토어 연결 정보와 실행 환경을 관리합니다.

use std::env;

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    pub fn current() -> Self {
        Self::from_str(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        )
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// `PROFILE`이 없을 때 로드할 .env 프로필
    ///
    /// 스테이징은 기본 .env 파일을 사용합니다.
    pub fn default_profile(&self) -> &'static str {
        match self {
            Environment::Production => "prod",
            Environment::Staging => "default",
            Environment::Development | Environment::Test => "dev",
        }
    }
}

/// MongoDB 문서 스토어 연결 설정
///
/// ## 환경 변수
/// - `MONGODB_URI`: 연결 URI (기본값: "mongodb://localhost:27017")
/// - `DATABASE_NAME`: 데이터베이스 이름 (기본값: "auth_account_dev")
///
/// 연쇄 삭제 배치는 멀티 도큐먼트 트랜잭션으로 커밋되므로
/// 레플리카 셋 또는 샤드 클러스터가 필요합니다.
pub struct DatabaseConfig;

impl DatabaseConfig {
    pub fn uri() -> String {
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
    }

    pub fn database_name() -> String {
        env::var("DATABASE_NAME").unwrap_or_else(|_| "auth_account_dev".to_string())
    }

    pub fn app_name() -> String {
        env::var("MONGODB_APP_NAME").unwrap_or_else(|_| "auth_account".to_string())
    }
}

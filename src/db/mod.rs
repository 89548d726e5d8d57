//! Document Store Adapters
//!
//! [`DocumentStore`](crate::clients::store::DocumentStore) 구현체들과
//! MongoDB 연결 관리를 담당합니다.
//!
//! - [`Database`] - MongoDB 클라이언트와 데이터베이스 이름 래퍼
//! - [`mongo_store::MongoDocumentStore`] - 운영용 어댑터 (트랜잭션 기반 배치)
//! - [`memory_store::InMemoryDocumentStore`] - 로컬 개발/테스트용 어댑터
//!
//! # 기본 사용법
//!
//! ```rust,ignore
//! use crate::db::{Database, mongo_store::MongoDocumentStore};
//!
//! let database = Database::connect().await?;
//! let store = Arc::new(MongoDocumentStore::new(database));
//! ```

pub mod memory_store;
pub mod mongo_store;

use log::info;
use mongodb::{Client, options::ClientOptions};

use crate::config::DatabaseConfig;
use crate::core::errors::{AppError, AppResult};

/// MongoDB 데이터베이스 연결 래퍼
#[derive(Clone)]
pub struct Database {
    client: Client,
    database_name: String,
}

impl Database {
    /// 환경 설정으로 연결하고 `ping`으로 연결 상태를 확인합니다.
    ///
    /// ## 환경 변수
    /// - `MONGODB_URI` (기본값: "mongodb://localhost:27017")
    /// - `DATABASE_NAME` (기본값: "auth_account_dev")
    pub async fn connect() -> AppResult<Self> {
        Self::connect_with(&DatabaseConfig::uri(), DatabaseConfig::database_name()).await
    }

    pub async fn connect_with(uri: &str, database_name: String) -> AppResult<Self> {
        let mut client_options = ClientOptions::parse(uri)
            .await
            .map_err(|e| AppError::DatabaseError(format!("MongoDB URI 파싱 실패: {}", e)))?;

        client_options.app_name = Some(DatabaseConfig::app_name());

        let client = Client::with_options(client_options)
            .map_err(|e| AppError::DatabaseError(format!("MongoDB 클라이언트 생성 실패: {}", e)))?;

        client
            .database(&database_name)
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::DatabaseError(format!("MongoDB 연결 실패: {}", e)))?;

        info!("✅ MongoDB 연결 성공: {}", database_name);

        Ok(Self {
            client,
            database_name,
        })
    }

    pub fn get_database(&self) -> mongodb::Database {
        self.client.database(&self.database_name)
    }

    /// 세션/트랜잭션을 시작할 때 사용합니다.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }
}

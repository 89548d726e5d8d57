//! # 삭제 감사 로그 리포지토리
//!
//! `deletionLogs` 컬렉션에 자동 ID로 추가만 합니다. 수정/삭제 기능은 없습니다.

use std::sync::Arc;

use crate::clients::store::DocumentStore;
use crate::core::errors::AppResult;
use crate::domain::entities::audit::DeletionLog;
use crate::domain::models::{DocumentRef, FieldValue, to_fields};

pub const DELETION_LOG_COLLECTION: &str = "deletionLogs";

#[derive(Clone)]
pub struct DeletionLogRepository {
    store: Arc<dyn DocumentStore>,
}

impl DeletionLogRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// 감사 로그 1건 추가 (`deletionTimestamp`는 서버 타임스탬프)
    pub async fn append(&self, log: &DeletionLog) -> AppResult<DocumentRef> {
        let mut fields = to_fields(log)?;
        fields.insert("deletionTimestamp".to_string(), FieldValue::ServerTimestamp);

        self.store.add(DELETION_LOG_COLLECTION, fields).await
    }
}

//! # Document Store Interface
//!
//! 관리형 문서 스토어가 제공하는 기능을 trait으로 정의합니다.
//!
//! - 문서 단건 읽기/쓰기/병합/삭제
//! - 자동 ID 문서 추가
//! - 단일 필드 동등 조건 쿼리
//! - 여러 삭제를 한 번에 커밋하는 원자적 [`WriteBatch`]
//!
//! 쓰기 필드에 [`FieldValue::ServerTimestamp`](crate::domain::models::FieldValue)를 넣으면
//! 스토어가 쓰기 시점의 시각으로 채웁니다.

use async_trait::async_trait;
use serde_json::Value;

use crate::core::errors::AppResult;
use crate::domain::models::{Document, DocumentRef, Fields};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 문서를 읽습니다. 없으면 `None`.
    async fn get(&self, doc: &DocumentRef) -> AppResult<Option<Document>>;

    /// 문서 전체를 덮어씁니다. 없으면 새로 만듭니다.
    async fn set(&self, doc: &DocumentRef, fields: Fields) -> AppResult<()>;

    /// 주어진 필드만 병합합니다. 문서가 없으면 `NotFound`.
    async fn update(&self, doc: &DocumentRef, fields: Fields) -> AppResult<()>;

    /// 문서를 삭제합니다. 없는 문서 삭제는 성공으로 처리합니다.
    async fn delete(&self, doc: &DocumentRef) -> AppResult<()>;

    /// 자동 생성 ID로 문서를 추가하고 참조를 반환합니다.
    async fn add(&self, collection: &str, fields: Fields) -> AppResult<DocumentRef>;

    /// `field == value`인 문서 참조 목록
    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> AppResult<Vec<DocumentRef>>;

    /// 새 쓰기 배치를 시작합니다.
    fn batch(&self) -> Box<dyn WriteBatch>;
}

/// 원자적 삭제 배치
///
/// 커밋은 전부 적용되거나 전혀 적용되지 않습니다.
#[async_trait]
pub trait WriteBatch: Send {
    fn stage_delete(&mut self, doc: DocumentRef);

    /// 스테이징된 작업 수
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn commit(self: Box<Self>) -> AppResult<()>;
}

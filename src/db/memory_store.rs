//! # In-Memory Document Store
//!
//! 프로세스 메모리에 문서를 보관하는 [`DocumentStore`] 구현입니다.
//! 로컬 개발과 테스트에서 사용합니다.
//!
//! 모든 작업은 하나의 뮤텍스 아래에서 수행되며, 배치 커밋도 한 번의 잠금 안에서
//! 전부 적용되므로 다른 작업이 중간 상태를 관찰할 수 없습니다.
//! 서버 타임스탬프는 쓰기 시점의 로컬 시각으로 채웁니다.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::clients::store::{DocumentStore, WriteBatch};
use crate::core::errors::{AppError, AppResult};
use crate::domain::models::{Document, DocumentRef, Fields, resolve_fields};

type Collections = BTreeMap<String, BTreeMap<String, Document>>;

#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<Mutex<Collections>>,
}

fn lock(collections: &Mutex<Collections>) -> AppResult<MutexGuard<'_, Collections>> {
    collections
        .lock()
        .map_err(|_| AppError::DatabaseError("인메모리 스토어 잠금 실패".to_string()))
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 문서를 그대로 넣습니다. 값이 객체가 아니면 무시합니다.
    pub fn insert(&self, collection: &str, id: &str, value: Value) -> AppResult<()> {
        if let Value::Object(doc) = value {
            lock(&self.collections)?
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), doc);
        }
        Ok(())
    }

    /// 컬렉션의 문서 수
    pub fn count(&self, collection: &str) -> usize {
        lock(&self.collections)
            .map(|c| c.get(collection).map(BTreeMap::len).unwrap_or(0))
            .unwrap_or(0)
    }

    /// 컬렉션의 모든 문서
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        lock(&self.collections)
            .map(|c| {
                c.get(collection)
                    .map(|docs| docs.values().cloned().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// 저장된 전체 문서 수
    pub fn total_documents(&self) -> usize {
        lock(&self.collections)
            .map(|c| c.values().map(BTreeMap::len).sum())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, doc: &DocumentRef) -> AppResult<Option<Document>> {
        let collections = lock(&self.collections)?;
        Ok(collections
            .get(&doc.collection)
            .and_then(|docs| docs.get(&doc.id))
            .cloned())
    }

    async fn set(&self, doc: &DocumentRef, fields: Fields) -> AppResult<()> {
        let body = resolve_fields(fields, Utc::now());
        lock(&self.collections)?
            .entry(doc.collection.clone())
            .or_default()
            .insert(doc.id.clone(), body);
        Ok(())
    }

    async fn update(&self, doc: &DocumentRef, fields: Fields) -> AppResult<()> {
        let mut collections = lock(&self.collections)?;
        let existing = collections
            .get_mut(&doc.collection)
            .and_then(|docs| docs.get_mut(&doc.id))
            .ok_or_else(|| AppError::NotFound(format!("문서를 찾을 수 없습니다: {}", doc)))?;

        existing.extend(resolve_fields(fields, Utc::now()));
        Ok(())
    }

    async fn delete(&self, doc: &DocumentRef) -> AppResult<()> {
        if let Some(docs) = lock(&self.collections)?.get_mut(&doc.collection) {
            docs.remove(&doc.id);
        }
        Ok(())
    }

    async fn add(&self, collection: &str, fields: Fields) -> AppResult<DocumentRef> {
        let doc = DocumentRef::new(collection, Uuid::new_v4().simple().to_string());
        self.set(&doc, fields).await?;
        Ok(doc)
    }

    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> AppResult<Vec<DocumentRef>> {
        let collections = lock(&self.collections)?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, body)| body.get(field) == Some(value))
                    .map(|(id, _)| DocumentRef::new(collection, id.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn batch(&self) -> Box<dyn WriteBatch> {
        Box::new(InMemoryWriteBatch {
            collections: Arc::clone(&self.collections),
            deletes: Vec::new(),
        })
    }
}

pub struct InMemoryWriteBatch {
    collections: Arc<Mutex<Collections>>,
    deletes: Vec<DocumentRef>,
}

#[async_trait]
impl WriteBatch for InMemoryWriteBatch {
    fn stage_delete(&mut self, doc: DocumentRef) {
        self.deletes.push(doc);
    }

    fn len(&self) -> usize {
        self.deletes.len()
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut collections = lock(&self.collections)?;
        for doc in &self.deletes {
            if let Some(docs) = collections.get_mut(&doc.collection) {
                docs.remove(&doc.id);
            }
        }
        Ok(())
    }
}

//! # MongoDB Document Store Adapter
//!
//! 문서 `{collection}/{id}`는 MongoDB 컬렉션 `collection`의 `_id == id` 문서에 대응합니다.
//!
//! ## 서버 타임스탬프
//!
//! 쓰기는 모두 파이프라인 업데이트로 수행합니다. 일반 값은 `$literal`로 감싸 연산자로
//! 해석되지 않게 하고, [`FieldValue::ServerTimestamp`] 필드는 `$$NOW`로 채워
//! 데이터베이스 서버의 시각이 기록되게 합니다.
//!
//! ## 원자적 배치
//!
//! [`WriteBatch::commit`]은 멀티 도큐먼트 트랜잭션 안에서 컬렉션별 `delete_many`를
//! 실행합니다. 하나라도 실패하면 트랜잭션을 중단하므로 아무 문서도 삭제되지 않습니다.
//! 트랜잭션은 레플리카 셋 또는 샤드 클러스터에서만 동작합니다.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use log::{debug, error};
use mongodb::bson::{Bson, Document as BsonDocument, doc, oid::ObjectId};
use mongodb::{Client, Collection};
use serde_json::Value;
use uuid::Uuid;

use super::Database;
use crate::clients::store::{DocumentStore, WriteBatch};
use crate::core::errors::{AppError, AppResult};
use crate::domain::models::document::timestamp_value;
use crate::domain::models::{Document, DocumentRef, FieldValue, Fields};

fn db_error(context: &str, e: impl std::fmt::Display) -> AppError {
    AppError::DatabaseError(format!("{}: {}", context, e))
}

/// `_id` 조건
///
/// 외부에서 만든 문서는 `_id`가 ObjectId일 수 있으므로 두 형태를 모두 허용합니다.
fn id_candidates(id: &str) -> Vec<Bson> {
    let mut candidates = vec![Bson::String(id.to_string())];
    if let Ok(oid) = ObjectId::parse_str(id) {
        candidates.push(Bson::ObjectId(oid));
    }
    candidates
}

fn id_filter(id: &str) -> BsonDocument {
    doc! { "_id": { "$in": id_candidates(id) } }
}

fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::String(s) => s.clone(),
        Bson::ObjectId(oid) => oid.to_hex(),
        other => other.to_string(),
    }
}

fn json_to_bson(value: &Value) -> AppResult<Bson> {
    mongodb::bson::to_bson(value).map_err(|e| db_error("BSON 변환 실패", e))
}

/// BSON 값을 JSON으로 변환합니다. 날짜는 RFC 3339 문자열이 됩니다.
fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::DateTime(at) => DateTime::<Utc>::from_timestamp_millis(at.timestamp_millis())
            .map(timestamp_value)
            .unwrap_or(Value::Null),
        Bson::Document(inner) => Value::Object(document_to_json(inner)),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        other => other.into_relaxed_extjson(),
    }
}

fn document_to_json(doc: BsonDocument) -> Document {
    doc.into_iter()
        .filter(|(key, _)| key != "_id")
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

/// 필드 묶음을 `$set` 스테이지 본문으로 변환합니다.
fn set_stage(fields: &Fields) -> AppResult<BsonDocument> {
    let mut stage = BsonDocument::new();
    for (key, value) in fields {
        let resolved = match value {
            FieldValue::Value(v) => Bson::Document(doc! { "$literal": json_to_bson(v)? }),
            FieldValue::ServerTimestamp => Bson::String("$$NOW".to_string()),
        };
        stage.insert(key.clone(), resolved);
    }
    Ok(stage)
}

/// MongoDB 기반 문서 스토어
#[derive(Clone)]
pub struct MongoDocumentStore {
    database: Database,
}

impl MongoDocumentStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.database.get_database().collection::<BsonDocument>(name)
    }

    /// 문서 전체를 교체하는 upsert (문자열 `_id` 기준)
    async fn replace(&self, doc_ref: &DocumentRef, fields: Fields) -> AppResult<()> {
        let pipeline = vec![
            doc! { "$replaceWith": { "$literal": { "_id": doc_ref.id.as_str() } } },
            doc! { "$set": set_stage(&fields)? },
        ];

        self.collection(&doc_ref.collection)
            .update_one(doc! { "_id": doc_ref.id.as_str() }, pipeline)
            .upsert(true)
            .await
            .map_err(|e| db_error("문서 저장 실패", e))?;

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn get(&self, doc_ref: &DocumentRef) -> AppResult<Option<Document>> {
        let found = self
            .collection(&doc_ref.collection)
            .find_one(id_filter(&doc_ref.id))
            .await
            .map_err(|e| db_error("문서 조회 실패", e))?;

        Ok(found.map(document_to_json))
    }

    async fn set(&self, doc_ref: &DocumentRef, fields: Fields) -> AppResult<()> {
        self.replace(doc_ref, fields).await
    }

    async fn update(&self, doc_ref: &DocumentRef, fields: Fields) -> AppResult<()> {
        let result = self
            .collection(&doc_ref.collection)
            .update_one(id_filter(&doc_ref.id), vec![doc! { "$set": set_stage(&fields)? }])
            .await
            .map_err(|e| db_error("문서 수정 실패", e))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("문서를 찾을 수 없습니다: {}", doc_ref)));
        }
        Ok(())
    }

    async fn delete(&self, doc_ref: &DocumentRef) -> AppResult<()> {
        self.collection(&doc_ref.collection)
            .delete_one(id_filter(&doc_ref.id))
            .await
            .map_err(|e| db_error("문서 삭제 실패", e))?;
        Ok(())
    }

    async fn add(&self, collection: &str, fields: Fields) -> AppResult<DocumentRef> {
        let doc_ref = DocumentRef::new(collection, Uuid::new_v4().simple().to_string());
        self.replace(&doc_ref, fields).await?;
        Ok(doc_ref)
    }

    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> AppResult<Vec<DocumentRef>> {
        let mut filter = BsonDocument::new();
        filter.insert(field, json_to_bson(value)?);

        let cursor = self
            .collection(collection)
            .find(filter)
            .projection(doc! { "_id": 1 })
            .await
            .map_err(|e| db_error("쿼리 실행 실패", e))?;

        let docs: Vec<BsonDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| db_error("쿼리 결과 수집 실패", e))?;

        Ok(docs
            .iter()
            .filter_map(|d| d.get("_id"))
            .map(|id| DocumentRef::new(collection, id_to_string(id)))
            .collect())
    }

    fn batch(&self) -> Box<dyn WriteBatch> {
        Box::new(MongoWriteBatch {
            client: self.database.client().clone(),
            database: self.database.get_database(),
            deletes: Vec::new(),
        })
    }
}

/// 트랜잭션 기반 삭제 배치
pub struct MongoWriteBatch {
    client: Client,
    database: mongodb::Database,
    deletes: Vec<DocumentRef>,
}

impl MongoWriteBatch {
    /// 컬렉션별 `_id` 후보 목록
    fn grouped(&self) -> BTreeMap<&str, Vec<Bson>> {
        let mut groups: BTreeMap<&str, Vec<Bson>> = BTreeMap::new();
        for doc_ref in &self.deletes {
            groups
                .entry(doc_ref.collection.as_str())
                .or_default()
                .extend(id_candidates(&doc_ref.id));
        }
        groups
    }
}

#[async_trait]
impl WriteBatch for MongoWriteBatch {
    fn stage_delete(&mut self, doc: DocumentRef) {
        self.deletes.push(doc);
    }

    fn len(&self) -> usize {
        self.deletes.len()
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        if self.deletes.is_empty() {
            return Ok(());
        }

        let mut session = self
            .client
            .start_session()
            .await
            .map_err(|e| db_error("세션 시작 실패", e))?;

        session
            .start_transaction()
            .await
            .map_err(|e| db_error("트랜잭션 시작 실패", e))?;

        for (collection, ids) in self.grouped() {
            let outcome = self
                .database
                .collection::<BsonDocument>(collection)
                .delete_many(doc! { "_id": { "$in": ids } })
                .session(&mut session)
                .await;

            match outcome {
                Ok(result) => debug!("{}: {}건 삭제 스테이징", collection, result.deleted_count),
                Err(e) => {
                    if let Err(abort_err) = session.abort_transaction().await {
                        error!("트랜잭션 중단 실패: {}", abort_err);
                    }
                    return Err(db_error("배치 삭제 실패", e));
                }
            }
        }

        session
            .commit_transaction()
            .await
            .map_err(|e| db_error("트랜잭션 커밋 실패", e))
    }
}

//! 문서 스토어 데이터 모델
//!
//! 스토어 어댑터와 리포지토리 사이에서 주고받는 문서 표현입니다.
//! 문서 본문은 JSON 객체로 다루고, 쓰기 시점에만 서버 타임스탬프 토큰을
//! 실제 시각으로 치환합니다.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::core::errors::{AppError, AppResult};

/// 스토어에서 읽어 온 문서 본문
pub type Document = serde_json::Map<String, Value>;

/// 쓰기 요청의 필드 묶음
pub type Fields = BTreeMap<String, FieldValue>;

/// 컬렉션 이름과 문서 ID로 식별되는 문서 참조
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef {
    pub collection: String,
    pub id: String,
}

impl DocumentRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// 쓰기 필드 값
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    /// 스토어가 쓰기 시점에 채우는 서버 타임스탬프
    ServerTimestamp,
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

/// 직렬화 가능한 구조체를 쓰기 필드 묶음으로 변환합니다.
///
/// 최상위가 JSON 객체가 아니면 `InternalError`를 반환합니다.
pub fn to_fields<T: Serialize>(value: &T) -> AppResult<Fields> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, FieldValue::Value(v)))
            .collect()),
        Ok(other) => Err(AppError::InternalError(format!(
            "문서 필드는 객체여야 합니다: {}",
            other
        ))),
        Err(e) => Err(AppError::InternalError(format!("문서 직렬화 실패: {}", e))),
    }
}

/// 서버 타임스탬프 토큰을 주어진 시각으로 치환해 문서 본문을 만듭니다.
pub fn resolve_fields(fields: Fields, now: DateTime<Utc>) -> Document {
    let stamp = timestamp_value(now);

    fields
        .into_iter()
        .map(|(k, v)| match v {
            FieldValue::Value(value) => (k, value),
            FieldValue::ServerTimestamp => (k, stamp.clone()),
        })
        .collect()
}

/// 타임스탬프의 저장 표현 (RFC 3339, 밀리초, UTC)
pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// 문서 본문을 도메인 타입으로 역직렬화합니다.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> AppResult<T> {
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| AppError::DatabaseError(format!("문서 역직렬화 실패: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        user_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    }

    #[test]
    fn test_to_fields_skips_absent_values() {
        let fields = to_fields(&Sample {
            user_id: "u1".to_string(),
            note: None,
        })
        .unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("userId"), Some(&FieldValue::Value(json!("u1"))));
    }

    #[test]
    fn test_to_fields_rejects_non_objects() {
        assert!(to_fields(&vec![1, 2, 3]).is_err());
    }

    #[test]
    fn test_resolve_fields_stamps_server_timestamp() {
        let now = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let mut fields = Fields::new();
        fields.insert("name".to_string(), json!("a").into());
        fields.insert("updatedAt".to_string(), FieldValue::ServerTimestamp);

        let doc = resolve_fields(fields, now);
        assert_eq!(doc["name"], json!("a"));
        assert_eq!(doc["updatedAt"], json!("2024-05-01T10:00:00.000Z"));
    }

    #[test]
    fn test_document_ref_path() {
        let r = DocumentRef::new("users", "abc");
        assert_eq!(r.path(), "users/abc");
        assert_eq!(r.to_string(), "users/abc");
    }
}

//! 계정 삭제 도메인 모델
//!
//! 연쇄 삭제 대상 카테고리, 삭제 결과, 삭제 후 검증 결과를 정의합니다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 프로필 문서 컬렉션
pub const PROFILE_COLLECTION: &str = "users";

/// 삭제 결과/감사 로그에서 프로필을 가리키는 이름
pub const PROFILE_CATEGORY: &str = "profile";

/// 사용자 범위 레코드의 소유자 필드
pub const OWNER_FIELD: &str = "userId";

/// 연쇄 삭제 대상 카테고리
///
/// 각 카테고리는 `userId` 필드로 사용자를 가리키는 문서들의 컬렉션이며,
/// 하위 문서를 갖지 않는 말단 데이터입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataCategory {
    Sessions,
    Settings,
    Logs,
    Notifications,
    Activities,
    Files,
    Devices,
    Preferences,
    Cache,
}

impl DataCategory {
    pub const ALL: [DataCategory; 9] = [
        DataCategory::Sessions,
        DataCategory::Settings,
        DataCategory::Logs,
        DataCategory::Notifications,
        DataCategory::Activities,
        DataCategory::Files,
        DataCategory::Devices,
        DataCategory::Preferences,
        DataCategory::Cache,
    ];

    /// 결과 보고와 감사 로그에 쓰는 이름
    pub fn name(&self) -> &'static str {
        match self {
            DataCategory::Sessions => "sessions",
            DataCategory::Settings => "settings",
            DataCategory::Logs => "logs",
            DataCategory::Notifications => "notifications",
            DataCategory::Activities => "activities",
            DataCategory::Files => "files",
            DataCategory::Devices => "devices",
            DataCategory::Preferences => "preferences",
            DataCategory::Cache => "cache",
        }
    }

    /// 문서 스토어의 컬렉션 이름
    pub fn collection(&self) -> &'static str {
        match self {
            DataCategory::Sessions => "sessions",
            DataCategory::Settings => "userSettings",
            DataCategory::Logs => "userLogs",
            DataCategory::Notifications => "notifications",
            DataCategory::Activities => "activities",
            DataCategory::Files => "userFiles",
            DataCategory::Devices => "userDevices",
            DataCategory::Preferences => "userPreferences",
            DataCategory::Cache => "userCache",
        }
    }

    /// 감사 로그의 `dataTypesDeleted`에 기록하는 전체 목록 (프로필 포함)
    pub fn all_data_types() -> Vec<String> {
        std::iter::once(PROFILE_CATEGORY)
            .chain(Self::ALL.iter().map(|c| c.name()))
            .map(str::to_string)
            .collect()
    }
}

/// 계정 삭제 결과
///
/// 호출자에게 반환되는 일시적인 값이며 저장되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionResult {
    pub success: bool,
    /// 카테고리 이름(`profile` 포함) → 삭제한 문서 수
    pub deleted_records: BTreeMap<String, usize>,
}

impl DeletionResult {
    pub fn new(deleted_records: BTreeMap<String, usize>) -> Self {
        Self {
            success: true,
            deleted_records,
        }
    }

    pub fn count(&self, category: &str) -> usize {
        self.deleted_records.get(category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.deleted_records.values().sum()
    }
}

/// 삭제 후 검증 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    /// 컬렉션 이름 → 남아 있는 문서 수
    pub remaining: BTreeMap<String, usize>,
    pub total_remaining: usize,
}

impl VerificationReport {
    pub fn new(remaining: BTreeMap<String, usize>) -> Self {
        let total_remaining = remaining.values().sum();
        Self {
            remaining,
            total_remaining,
        }
    }

    pub fn is_completely_deleted(&self) -> bool {
        self.total_remaining == 0
    }

    /// 문서가 남아 있는 컬렉션만
    pub fn leftovers(&self) -> impl Iterator<Item = (&str, usize)> {
        self.remaining
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(name, count)| (name.as_str(), *count))
    }
}

//! Deletion Log Entity
//!
//! 계정 삭제 1회당 정확히 한 번 기록되는 감사 로그입니다.
//! 기록 후에는 수정하거나 삭제하지 않습니다.

use serde::{Deserialize, Serialize};

use crate::config::AccountDeletionConfig;
use crate::domain::models::deletion::{DataCategory, DeletionResult};
use crate::utils::string_utils::mask_user_id;

/// 익명화된 계정 삭제 감사 레코드
///
/// `deletionTimestamp`는 저장 시점에 서버 타임스탬프로 채워지므로
/// 이 구조체에는 포함하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionLog {
    /// 앞 8자 + 마스킹 접미사 (원본 uid는 절대 저장하지 않음)
    pub deleted_user_id: String,
    pub deletion_reason: String,
    pub data_types_deleted: Vec<String>,
    pub total_records_deleted: usize,
}

impl DeletionLog {
    pub fn for_user_request(uid: &str, result: &DeletionResult) -> Self {
        Self {
            deleted_user_id: mask_user_id(uid),
            deletion_reason: AccountDeletionConfig::DELETION_REASON.to_string(),
            data_types_deleted: DataCategory::all_data_types(),
            total_records_deleted: result.total(),
        }
    }
}

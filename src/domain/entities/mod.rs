//! # Domain Entities Module
//!
//! 계정 도메인의 핵심 엔티티들을 정의합니다.
//!
//! ## 구성
//!
//! ```text
//! entities/
//! ├── users/    ← 사용자 신원(UserIdentity), 계정 종류(AccountKind), 프로필(UserProfile)
//! └── audit/    ← 계정 삭제 감사 로그(DeletionLog)
//! ```
//!
//! ## 소유 관계
//!
//! - `UserIdentity`는 아이덴티티 프로바이더가 소유합니다. 이 라이브러리는 읽고 수정만 합니다.
//! - `UserProfile`은 `uid`를 키로 하는 문서 하나입니다. 스토어는 참조 무결성을 강제하지 않으므로
//!   신원과 프로필의 일관성은 애플리케이션 로직이 책임집니다.
//! - `DeletionLog`는 추가만 가능한 감사 기록입니다.

pub mod users;
pub mod audit;

//! 사용자 관련 DTO 모듈
//!
//! ```text
//! users/
//! └── request/
//!     ├── sign_up.rs            # 이메일 회원가입
//!     ├── credential_change.rs  # 이메일/비밀번호 변경
//!     ├── delete_account.rs     # 계정 삭제
//!     └── update_profile.rs     # 프로필 수정
//! ```

pub mod request;

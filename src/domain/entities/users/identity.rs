//! User Identity Implementation
//!
//! 아이덴티티 프로바이더가 소유하는 사용자 신원 정보와,
//! 세션 로드 시점에 한 번 결정되는 계정 종류([`AccountKind`])를 정의합니다.

use serde::{Deserialize, Serialize};

use crate::config::ProviderTag;

/// 아이덴티티 프로바이더의 사용자 레코드
///
/// 이 라이브러리는 프로바이더의 기능 인터페이스를 통해서만 읽고 수정하며,
/// 저장소를 직접 소유하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    /// 연결된 로그인 프로바이더 목록 (연결 순서 유지)
    pub providers: Vec<ProviderTag>,
}

impl UserIdentity {
    pub fn has_provider(&self, tag: &ProviderTag) -> bool {
        self.providers.iter().any(|p| p == tag)
    }

    /// 첫 번째로 연결된 프로바이더 태그
    pub fn primary_provider(&self) -> Option<&ProviderTag> {
        self.providers.first()
    }
}

/// 팝업 재인증을 지원하는 외부 로그인 프로바이더
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FederatedProvider {
    Google,
    GitHub,
}

impl FederatedProvider {
    pub fn from_tag(tag: &ProviderTag) -> Option<Self> {
        match tag {
            ProviderTag::Google => Some(FederatedProvider::Google),
            ProviderTag::GitHub => Some(FederatedProvider::GitHub),
            _ => None,
        }
    }

    pub fn tag(&self) -> ProviderTag {
        match self {
            FederatedProvider::Google => ProviderTag::Google,
            FederatedProvider::GitHub => ProviderTag::GitHub,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FederatedProvider::Google => "Google",
            FederatedProvider::GitHub => "GitHub",
        }
    }
}

/// 계정 종류
///
/// 재인증 방식과 삭제 확인 방식이 이 값 하나로 결정됩니다.
/// 흩어진 프로바이더 검사 대신 세션 로드 시점에 한 번 계산해서
/// 재인증 서비스와 삭제 서비스에 그대로 전달합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    /// 이메일/비밀번호 계정
    Password,
    /// Google/GitHub 계정
    Federated(FederatedProvider),
}

impl AccountKind {
    /// 연결된 프로바이더 목록에서 계정 종류를 결정합니다.
    ///
    /// `password` 프로바이더가 연결되어 있으면 비밀번호 계정으로 보고,
    /// 아니면 처음 발견되는 Google/GitHub 프로바이더를 사용합니다.
    /// 어느 쪽도 없으면 `None`입니다.
    pub fn resolve(identity: &UserIdentity) -> Option<Self> {
        if identity.has_provider(&ProviderTag::Password) {
            return Some(AccountKind::Password);
        }

        identity
            .providers
            .iter()
            .find_map(FederatedProvider::from_tag)
            .map(AccountKind::Federated)
    }

    pub fn is_password(&self) -> bool {
        matches!(self, AccountKind::Password)
    }

    pub fn is_federated(&self) -> bool {
        matches!(self, AccountKind::Federated(_))
    }
}

/// 세션에 로드된 사용자
///
/// 신원 정보와 함께 로드 시점에 결정된 계정 종류를 보관합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub identity: UserIdentity,
    pub account: Option<AccountKind>,
}

impl SessionUser {
    pub fn new(identity: UserIdentity) -> Self {
        let account = AccountKind::resolve(&identity);
        Self { identity, account }
    }

    pub fn uid(&self) -> &str {
        &self.identity.uid
    }

    pub fn email(&self) -> Option<&str> {
        self.identity.email.as_deref()
    }
}

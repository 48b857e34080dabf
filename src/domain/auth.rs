//! 인증 컨텍스트 모델
//!
//! 인증 가드가 검증을 마친 후 요청 확장(Request Extensions)에
//! 저장하는 호출자 정보입니다.

use crate::domain::dto::response::UserSummary;

/// 인증된 사용자 정보
///
/// 액세스 토큰 검증과 저장소 조회를 거쳐 구성되며, 비밀번호 해시와
/// 리프레시 토큰이 제거된 정제 투영만을 담습니다.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: UserSummary,
}

impl AuthenticatedUser {
    /// 사용자 ID
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

/// 인증 모드
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    /// 인증 필수: 토큰이 없거나 유효하지 않으면 401로 단락
    Required,
    /// 선택적 인증: 토큰이 유효하면 호출자 정보를 첨부하고,
    /// 없으면 익명으로 진행 (채널 조회 등)
    Optional,
}

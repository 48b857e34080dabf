//! 데이터 액세스 계층 모듈
//!
//! 자격 증명 저장소의 경계를 `UserStore` trait으로 정의합니다.
//! 운영 환경에서는 MongoDB 구현(`UserRepository`)이 사용되고,
//! 세션 수명주기 테스트에서는 인메모리 가짜 구현이 주입됩니다.

pub mod user_repo;

use async_trait::async_trait;

use crate::domain::dto::response::ChannelProfile;
use crate::domain::entities::user::User;
use crate::errors::errors::AppResult;

/// 프로필 부분 업데이트
///
/// `None` 필드는 변경하지 않습니다. 비밀번호와 리프레시 토큰은
/// 전용 연산으로만 변경되므로 여기에 포함되지 않습니다.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}

/// 자격 증명 저장소 경계
///
/// 사용자 레코드의 조회/생성/부분 업데이트와, 세션 수명주기 전용의
/// 리프레시 토큰 슬롯 연산을 제공합니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// ID로 사용자 조회
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;

    /// 사용자명 또는 이메일로 사용자 조회 (둘 중 하나라도 일치하면 반환)
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<Option<User>>;

    /// 새 사용자 생성 (ID가 채워진 엔티티 반환)
    async fn create(&self, user: User) -> AppResult<User>;

    /// 프로필 필드 부분 업데이트, 갱신된 레코드 반환
    async fn update_profile(&self, id: &str, update: ProfileUpdate)
    -> AppResult<Option<User>>;

    /// 비밀번호 해시 교체
    async fn set_password_hash(&self, id: &str, password_hash: &str) -> AppResult<()>;

    /// 리프레시 토큰 슬롯 덮어쓰기 (로그인 시점의 회전)
    async fn set_refresh_token(&self, id: &str, token: &str) -> AppResult<()>;

    /// 조건부 리프레시 토큰 회전
    ///
    /// 저장된 토큰이 `expected`와 일치하는 경우에만 `new_token`으로
    /// 교체합니다. 동시 갱신 경쟁에서 패자는 `false`를 받습니다.
    async fn rotate_refresh_token(
        &self,
        id: &str,
        expected: &str,
        new_token: &str,
    ) -> AppResult<bool>;

    /// 리프레시 토큰 슬롯 비우기 (로그아웃, 비밀번호 변경)
    async fn clear_refresh_token(&self, id: &str) -> AppResult<()>;

    /// 채널 프로필 집계 조회 (구독자 수, 구독 채널 수, 구독 여부)
    async fn channel_profile(
        &self,
        username: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Option<ChannelProfile>>;
}

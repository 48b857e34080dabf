//! User Entity Implementation
//!
//! 사용자 엔티티의 핵심 구현체입니다.
//! 로컬 인증(사용자명/이메일 + 비밀번호)과 미디어 프로필 필드,
//! 그리고 세션 수명주기가 관리하는 단일 리프레시 토큰 슬롯을 포함합니다.

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// 사용자 엔티티
///
/// 시스템의 모든 사용자를 표현하는 핵심 도메인 엔티티입니다.
///
/// 불변식: 사용자당 유효한 리프레시 토큰은 최대 한 개이며
/// (`refresh_token` 슬롯), 이 슬롯은 세션 수명주기(로그인, 갱신,
/// 로그아웃, 비밀번호 변경)에 의해서만 변경됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 사용자명 (unique, 소문자로 정규화되어 저장)
    pub username: String,
    /// 사용자 이메일 (unique)
    pub email: String,
    /// 표시 이름
    pub full_name: String,
    /// 프로필 아바타 이미지 URL (필수)
    pub avatar: String,
    /// 커버 이미지 URL (선택)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// 해시된 비밀번호 (평문은 절대 저장되지 않음)
    pub password_hash: String,
    /// 현재 유효한 리프레시 토큰 슬롯
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// 생성 시간
    pub created_at: DateTime,
    /// 수정 시간
    pub updated_at: DateTime,
}

impl User {
    /// 새 사용자 생성
    ///
    /// 리프레시 토큰 슬롯은 비어 있는 상태로 시작하며,
    /// 로그인/갱신 시점에 채워지고 로그아웃 시 비워집니다.
    pub fn new(
        username: String,
        email: String,
        full_name: String,
        avatar: String,
        cover_image: Option<String>,
        password_hash: String,
    ) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            username: username.to_lowercase(),
            email,
            full_name,
            avatar,
            cover_image,
            password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// ID 문자열로 변환
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_lowercases_username() {
        let user = User::new(
            "AliceChannel".to_string(),
            "alice@example.com".to_string(),
            "Alice".to_string(),
            "https://cdn.example.com/avatar.png".to_string(),
            None,
            "hash".to_string(),
        );

        assert_eq!(user.username, "alicechannel");
        assert!(user.refresh_token.is_none());
        assert!(user.id.is_none());
    }
}

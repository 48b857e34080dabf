//! 응답 DTO
//!
//! 모든 성공 응답은 표준 엔벨로프
//! `{statusCode, data, message, success: true}` 형태로 반환됩니다.
//! 민감 정보(비밀번호 해시, 리프레시 토큰)는 DTO 변환 시점에 제거됩니다.

use serde::{Deserialize, Serialize};

use crate::domain::entities::user::User;

/// 표준 성공 응답 엔벨로프
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    /// 성공 엔벨로프 생성
    pub fn success(status_code: u16, data: T, message: &str) -> Self {
        Self {
            status_code,
            data,
            message: message.to_string(),
            success: true,
        }
    }
}

/// 사용자 요약 (정제된 투영)
///
/// 클라이언트에게 반환되는 사용자 뷰입니다.
/// `password_hash`와 `refresh_token` 필드는 구조적으로 존재하지 않아
/// 실수로도 노출될 수 없습니다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id_string().unwrap_or_default(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar.clone(),
            cover_image: user.cover_image.clone(),
            created_at: user
                .created_at
                .try_to_rfc3339_string()
                .unwrap_or_default(),
            updated_at: user
                .updated_at
                .try_to_rfc3339_string()
                .unwrap_or_default(),
        }
    }
}

/// 로그인 응답: 사용자 요약 + 토큰 쌍
///
/// 토큰은 쿠키로도 전달되지만, 쿠키를 사용할 수 없는 클라이언트
/// (모바일 앱 등)를 위해 본문에도 포함됩니다.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserSummary,
    pub access_token: String,
    pub refresh_token: String,
}

/// 토큰 갱신 응답
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// 채널 프로필 조회 결과
///
/// `users` 컬렉션과 `subscriptions` 컬렉션에 대한 단일 집계의
/// 결과입니다. 집계 파이프라인의 `$project` 단계가 camelCase 키로
/// 투영하므로 역직렬화와 직렬화가 같은 이름을 사용합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cover_image: Option<String>,
    /// 이 채널을 구독 중인 사용자 수
    pub subscriber_count: i64,
    /// 이 사용자가 구독 중인 채널 수
    pub channels_subscribed_to_count: i64,
    /// 현재 호출자가 이 채널을 구독 중인지 여부 (미인증 시 false)
    pub is_subscribed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn sample_user() -> User {
        let mut user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "Alice".to_string(),
            "https://cdn.example.com/avatar.png".to_string(),
            None,
            "bcrypt-hash".to_string(),
        );
        user.id = Some(ObjectId::new());
        user.refresh_token = Some("live-refresh-token".to_string());
        user
    }

    #[test]
    fn test_user_summary_never_contains_sensitive_fields() {
        let user = sample_user();
        let summary = UserSummary::from(&user);
        let json = serde_json::to_string(&summary).unwrap();

        assert!(!json.contains("bcrypt-hash"));
        assert!(!json.contains("live-refresh-token"));
        assert!(!json.contains("password"));
        assert!(!json.contains("refreshToken"));
    }

    #[test]
    fn test_api_response_envelope_shape() {
        let envelope = ApiResponse::success(201, "payload", "created");
        let json: serde_json::Value =
            serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["data"], "payload");
        assert_eq!(json["message"], "created");
        assert_eq!(json["success"], true);
    }

    #[test]
    fn test_auth_response_uses_camel_case_token_fields() {
        let user = sample_user();
        let response = AuthResponse {
            user: UserSummary::from(&user),
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
        };
        let json: serde_json::Value = serde_json::to_value(&response).unwrap();

        assert_eq!(json["accessToken"], "at");
        assert_eq!(json["refreshToken"], "rt");
        assert_eq!(json["user"]["username"], "alice");
    }
}

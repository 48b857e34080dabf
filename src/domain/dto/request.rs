//! 요청 DTO
//!
//! 각 엔드포인트의 요청 본문을 명시적인 타입 스키마로 정의하고,
//! 세션 수명주기에 도달하기 전에 경계에서 검증합니다.

use std::path::PathBuf;

use serde::Deserialize;
use validator::Validate;

/// 로그인 요청 구조체
///
/// 사용자명 또는 이메일 중 최소 하나가 필요합니다.
/// (존재 여부 검증은 세션 수명주기에서 수행)
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub username: Option<String>,

    pub email: Option<String>,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

/// 리프레시 토큰 요청 구조체 (요청 본문 경로)
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// 비밀번호 변경 요청 구조체
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "기존 비밀번호를 입력해주세요"))]
    pub old_password: String,

    #[validate(length(min = 8, message = "새 비밀번호는 최소 8자 이상이어야 합니다"))]
    pub new_password: String,
}

/// 계정 정보 수정 요청 구조체
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, message = "표시 이름을 입력해주세요"))]
    pub full_name: String,

    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,
}

/// 회원가입 입력
///
/// multipart 요청에서 텍스트 필드와 임시 저장된 업로드 파일 경로를
/// 모아 세션 수명주기에 전달하는 내부 구조체입니다.
/// (multipart 파싱은 핸들러 경계에서 수행)
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    /// 아바타 이미지의 로컬 임시 경로 (필수)
    pub avatar_path: Option<PathBuf>,
    /// 커버 이미지의 로컬 임시 경로 (선택)
    pub cover_image_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_deserializes_partial_identifiers() {
        let json = r#"{"email": "alice@example.com", "password": "secret"}"#;
        let request: LoginRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.email.as_deref(), Some("alice@example.com"));
        assert!(request.username.is_none());
    }

    #[test]
    fn test_refresh_token_request_uses_camel_case_field() {
        let json = r#"{"refreshToken": "abc.def.ghi"}"#;
        let request: RefreshTokenRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.refresh_token, "abc.def.ghi");
    }

    #[test]
    fn test_change_password_request_validation() {
        let request = ChangePasswordRequest {
            old_password: "old-secret".to_string(),
            new_password: "short".to_string(),
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_account_request_rejects_bad_email() {
        let request = UpdateAccountRequest {
            full_name: "Alice".to_string(),
            email: "not-an-email".to_string(),
        };

        assert!(request.validate().is_err());
    }
}

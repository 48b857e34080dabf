//! JWT 토큰 관리 서비스 구현
//!
//! JSON Web Token 기반의 인증 시스템을 제공합니다.
//! 액세스 토큰과 리프레시 토큰의 생성과 검증을 담당합니다.
//!
//! 두 토큰은 서로 다른 비밀키와 만료 기간을 사용합니다. 액세스 토큰은
//! 데이터베이스 왕복 없이 어디서든 검증 가능하고, 리프레시 토큰은
//! 사용자 레코드의 저장값과 대조되어 실질적인 폐기 권한을 가집니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::config::JwtConfig;
use crate::domain::entities::user::User;
use crate::domain::token::{AccessTokenClaims, RefreshTokenClaims, TokenPair};
use crate::errors::errors::AppError;

/// JWT 토큰 관리 서비스
///
/// HMAC-SHA256 서명을 사용하여 토큰을 생성하고 검증합니다.
/// 설정은 생성 시점에 주입되며, 모든 연산은 부수 효과가 없습니다.
pub struct TokenService {
    config: JwtConfig,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// 사용자를 위한 JWT 액세스 토큰 생성
    ///
    /// 클레임 {sub, username, email} 과 짧은 만료 시간을 가지는
    /// 자체 포함형 토큰을 발급합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::InternalError` - 토큰 생성 실패 또는 사용자 ID 없음
    pub fn issue_access_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(self.config.access_expiry_hours);

        let claims = AccessTokenClaims {
            sub: user
                .id_string()
                .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?,
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        let encoding_key = EncodingKey::from_secret(self.config.access_secret.as_ref());

        encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| AppError::InternalError(format!("액세스 토큰 생성 실패: {}", e)))
    }

    /// 사용자를 위한 리프레시 토큰 생성
    ///
    /// 최소 클레임 {sub} 과 긴 만료 시간, 별도의 비밀키를 사용합니다.
    ///
    /// # Security
    ///
    /// 리프레시 토큰은 Secure HttpOnly Cookie에 저장되며,
    /// 발급 후 사용자 레코드의 슬롯에 영속화되어야 유효합니다.
    pub fn issue_refresh_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::days(self.config.refresh_expiry_days);

        let claims = RefreshTokenClaims {
            sub: user
                .id_string()
                .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        let encoding_key = EncodingKey::from_secret(self.config.refresh_secret.as_ref());

        encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| AppError::InternalError(format!("리프레시 토큰 생성 실패: {}", e)))
    }

    /// 토큰 쌍 생성 (액세스 + 리프레시)
    pub fn issue_token_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        let access_token = self.issue_access_token(user)?;
        let refresh_token = self.issue_refresh_token(user)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// 액세스 토큰 검증 및 클레임 추출
    ///
    /// # Errors
    ///
    /// * `AppError::AuthenticationError` - 토큰 만료, 잘못된 형식/서명
    /// * `AppError::InternalError` - 기타 시스템 오류
    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, AppError> {
        let decoding_key = DecodingKey::from_secret(self.config.access_secret.as_ref());

        decode::<AccessTokenClaims>(token, &decoding_key, &Validation::default())
            .map(|token_data| token_data.claims)
            .map_err(map_jwt_error)
    }

    /// 리프레시 토큰 검증 및 클레임 추출
    ///
    /// 서명 오류와 만료는 내부적으로 구분되지만(에러 메시지),
    /// 호출자는 두 경우를 동일한 인증 실패로 처리합니다.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, AppError> {
        let decoding_key = DecodingKey::from_secret(self.config.refresh_secret.as_ref());

        decode::<RefreshTokenClaims>(token, &decoding_key, &Validation::default())
            .map(|token_data| token_data.claims)
            .map_err(map_jwt_error)
    }

    /// Bearer 토큰에서 실제 토큰 부분 추출
    ///
    /// HTTP Authorization 헤더의 "Bearer {token}" 형식에서
    /// 토큰 부분만을 추출합니다.
    pub fn extract_bearer_token<'a>(&self, auth_header: &'a str) -> Result<&'a str, AppError> {
        match auth_header.strip_prefix("Bearer ") {
            Some(token) => Ok(token),
            None => Err(AppError::AuthenticationError(
                "유효하지 않은 인증 헤더 형식입니다".to_string(),
            )),
        }
    }
}

/// jsonwebtoken 에러를 AppError로 변환
fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AppError {
    match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::AuthenticationError("토큰이 만료되었습니다".to_string())
        }
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            AppError::AuthenticationError("유효하지 않은 토큰입니다".to_string())
        }
        _ => AppError::AuthenticationError(format!("토큰 검증 실패: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn test_config() -> JwtConfig {
        JwtConfig {
            access_secret: "test-access-secret".to_string(),
            access_expiry_hours: 1,
            refresh_secret: "test-refresh-secret".to_string(),
            refresh_expiry_days: 10,
        }
    }

    fn test_user() -> User {
        let mut user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "Alice".to_string(),
            "https://cdn.example.com/avatar.png".to_string(),
            None,
            "hash".to_string(),
        );
        user.id = Some(ObjectId::new());
        user
    }

    #[test]
    fn test_access_token_round_trip_preserves_subject() {
        let service = TokenService::new(test_config());
        let user = test_user();

        let token = service.issue_access_token(&user).unwrap();
        let claims = service.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, user.id_string().unwrap());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
    }

    #[test]
    fn test_refresh_token_round_trip_preserves_subject() {
        let service = TokenService::new(test_config());
        let user = test_user();

        let token = service.issue_refresh_token(&user).unwrap();
        let claims = service.verify_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, user.id_string().unwrap());
    }

    #[test]
    fn test_expired_access_token_fails_verification() {
        // 만료 시간이 이미 지난 토큰을 발급하기 위해 음수 만료 시간 사용
        let mut config = test_config();
        config.access_expiry_hours = -1;
        let service = TokenService::new(config);
        let user = test_user();

        let token = service.issue_access_token(&user).unwrap();
        let result = service.verify_access_token(&token);

        assert!(matches!(result, Err(AppError::AuthenticationError(_))));
    }

    #[test]
    fn test_access_token_rejected_as_refresh_token() {
        // 두 토큰은 서로 다른 비밀키로 서명되므로 교차 사용이 불가능하다
        let service = TokenService::new(test_config());
        let user = test_user();

        let access = service.issue_access_token(&user).unwrap();
        assert!(service.verify_refresh_token(&access).is_err());

        let refresh = service.issue_refresh_token(&user).unwrap();
        assert!(service.verify_access_token(&refresh).is_err());
    }

    #[test]
    fn test_token_without_id_fails() {
        let service = TokenService::new(test_config());
        let user = User::new(
            "bob".to_string(),
            "bob@example.com".to_string(),
            "Bob".to_string(),
            "https://cdn.example.com/b.png".to_string(),
            None,
            "hash".to_string(),
        );

        assert!(service.issue_access_token(&user).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        let service = TokenService::new(test_config());

        assert_eq!(
            service.extract_bearer_token("Bearer abc.def.ghi").unwrap(),
            "abc.def.ghi"
        );
        assert!(service.extract_bearer_token("Basic abc").is_err());
        assert!(service.extract_bearer_token("abc.def.ghi").is_err());
    }
}

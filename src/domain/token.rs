//! JWT 토큰 클레임 모델
//!
//! 액세스 토큰과 리프레시 토큰은 서로 다른 클레임 집합과 비밀키를
//! 사용합니다. 액세스 토큰은 자체 포함형(저장소 조회 없이 검증 가능),
//! 리프레시 토큰은 최소 클레임만 담고 사용자 레코드의 저장값과
//! 대조되어야 유효합니다.

use serde::{Deserialize, Serialize};

/// 액세스 토큰 클레임
///
/// 사용자 식별에 필요한 정보를 자체 포함하여, 검증 시 데이터베이스
/// 왕복 없이 신원을 확인할 수 있습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// 사용자 ID (MongoDB ObjectId의 16진수 문자열)
    pub sub: String,
    /// 사용자명
    pub username: String,
    /// 이메일
    pub email: String,
    /// 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// 만료 시간 (Unix timestamp)
    pub exp: i64,
}

/// 리프레시 토큰 클레임
///
/// 식별자만 담은 최소 클레임 집합입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// 사용자 ID
    pub sub: String,
    /// 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// 만료 시간 (Unix timestamp)
    pub exp: i64,
}

/// 발급된 토큰 쌍 (액세스 + 리프레시)
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

//! 도메인 계층 모듈
//!
//! 엔티티, 토큰 클레임, 인증 컨텍스트, 요청/응답 DTO를 제공합니다.

pub mod auth;
pub mod dto;
pub mod entities;
pub mod token;

pub use auth::{AuthMode, AuthenticatedUser};
pub use dto::{
    ApiResponse, AuthResponse, ChangePasswordRequest, ChannelProfile, LoginRequest,
    RefreshTokenRequest, RegisterInput, TokenPairResponse, UpdateAccountRequest, UserSummary,
};
pub use entities::User;
pub use token::{AccessTokenClaims, RefreshTokenClaims, TokenPair};

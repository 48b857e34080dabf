//! 요청/응답 DTO 모듈

pub mod request;
pub mod response;

pub use request::{
    ChangePasswordRequest, LoginRequest, RefreshTokenRequest, RegisterInput,
    UpdateAccountRequest,
};
pub use response::{
    ApiResponse, AuthResponse, ChannelProfile, TokenPairResponse, UserSummary,
};

//! 요청 파이프라인 미들웨어 모듈

pub mod auth_inner;
pub mod auth_middleware;

pub use auth_middleware::AuthMiddleware;

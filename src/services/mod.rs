//! 비즈니스 로직 서비스 모듈

pub mod media_service;
pub mod session_service;
pub mod token_service;

pub use media_service::{CloudinaryClient, MediaHost, UploadedMedia};
pub use session_service::SessionService;
pub use token_service::TokenService;

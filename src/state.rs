//! 애플리케이션 공유 상태
//!
//! 기동 시점에 한 번 구성되어 모든 핸들러와 미들웨어에 주입되는
//! 서비스 묶음입니다. 요청 처리 경로에서는 환경변수를 직접 읽지
//! 않고 이 상태를 통해서만 설정에 접근합니다.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::repositories::UserStore;
use crate::services::session_service::SessionService;
use crate::services::token_service::TokenService;

/// 요청 파이프라인 전역에서 공유되는 애플리케이션 상태
pub struct AppState {
    pub config: AppConfig,
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<TokenService>,
    pub sessions: Arc<SessionService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
        sessions: Arc<SessionService>,
    ) -> Self {
        Self {
            config,
            users,
            tokens,
            sessions,
        }
    }
}

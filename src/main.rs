//! 사용자 세션 서비스 메인 애플리케이션
//!
//! Actix-web 기반의 HTTP 서버를 구동하고 모든 서비스를 초기화합니다.
//! MongoDB 연결을 설정하고 JWT 인증 기반의 REST API를 제공합니다.

use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header;
use actix_web::{App, HttpServer, middleware, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};

use user_service_backend::config::AppConfig;
use user_service_backend::db::Database;
use user_service_backend::repositories::user_repo::UserRepository;
use user_service_backend::routes::configure_all_routes;
use user_service_backend::services::media_service::CloudinaryClient;
use user_service_backend::services::session_service::SessionService;
use user_service_backend::services::token_service::TokenService;
use user_service_backend::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 환경 설정 및 로깅 초기화
    load_env_file();
    init_logging();

    info!("🚀 사용자 세션 서비스 시작중...");

    // 설정은 시작 시점에 한 번 구성된다
    let config = AppConfig::from_env();

    // 데이터 스토어 초기화
    let database = initialize_database(&config).await;

    // 서비스 조립
    let state = build_app_state(config, database).await;

    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");

    // HTTP 서버 시작
    start_http_server(state).await
}

/// HTTP 서버를 구성하고 실행합니다
///
/// CORS, 로깅, 경로 정규화, Rate Limiting 미들웨어를 포함합니다.
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패 또는 서버 실행 오류
async fn start_http_server(state: web::Data<AppState>) -> std::io::Result<()> {
    let bind_address = state.config.server.bind_address();

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);
    info!("📍 API 엔드포인트: http://{}/api/v1/users", bind_address);

    // Rate Limiting 설정
    let rate_limit = &state.config.rate_limit;
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(rate_limit.per_second)
        .burst_size(rate_limit.burst_size)
        .use_headers()
        .finish()
        .expect("Rate Limiting 설정 구성 실패");

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        rate_limit.per_second, rate_limit.burst_size
    );

    HttpServer::new(move || {
        let cors = configure_cors();

        App::new()
            .app_data(state.clone())
            // Rate Limiting 미들웨어 (가장 먼저 적용)
            .wrap(Governor::new(&governor_conf))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_all_routes)
    })
    .bind(bind_address)?
    .workers(4)
    .run()
    .await
}

/// 환경별 설정 파일을 로드합니다
///
/// PROFILE 환경변수에 따라 적절한 .env 파일을 로드합니다.
///
/// # Environment Variables
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            dotenv().ok();
            info!("기본 .env 파일 로드");
        }
    }
}

/// 로깅 시스템을 초기화합니다
///
/// 환경변수 RUST_LOG를 기반으로 로깅 레벨을 설정합니다.
/// 기본값은 info 레벨이며, actix_web은 debug 레벨로 설정됩니다.
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

/// MongoDB 연결을 초기화합니다
///
/// # Panics
///
/// MongoDB 연결 실패 시 애플리케이션이 종료됩니다.
async fn initialize_database(config: &AppConfig) -> Database {
    info!("📡 데이터베이스 연결 중...");

    Database::connect(&config.database)
        .await
        .expect("데이터베이스 연결 실패")
}

/// 서비스들을 조립하여 공유 애플리케이션 상태를 구성합니다
///
/// 유니크 인덱스 생성도 이 시점에 수행됩니다. 사용자명/이메일
/// 중복은 애플리케이션 검사와 인덱스 양쪽에서 막습니다.
async fn build_app_state(config: AppConfig, database: Database) -> web::Data<AppState> {
    let repository = UserRepository::new(database);
    repository
        .create_indexes()
        .await
        .expect("인덱스 생성 실패");

    let users = Arc::new(repository);
    let tokens = Arc::new(TokenService::new(config.jwt.clone()));
    let media = Arc::new(CloudinaryClient::new(config.media.clone()));
    let sessions = Arc::new(SessionService::new(
        users.clone(),
        tokens.clone(),
        media,
        config.password.bcrypt_cost,
    ));

    web::Data::new(AppState::new(config, users, tokens, sessions))
}

/// CORS 설정을 구성합니다
///
/// 개발환경에서 로컬호스트 간 통신을 허용하며, 쿠키 기반 인증을
/// 위해 자격 증명을 지원합니다.
fn configure_cors() -> Cors {
    Cors::default()
        .allowed_origin("http://localhost:3000")
        .allowed_origin("http://127.0.0.1:3000")
        .allowed_origin("http://localhost:8000")
        .allowed_origin("http://127.0.0.1:8000")
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        // 쿠키 전송 지원
        .supports_credentials()
        .max_age(3600)
}

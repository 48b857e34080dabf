//! # Configuration Module
//!
//! 백엔드 서비스의 설정 관리를 담당하는 모듈입니다.
//! 환경 변수 기반의 설정값들을 프로세스 시작 시 한 번 읽어
//! 명시적인 설정 객체(`AppConfig`)로 구성합니다.
//!
//! 비즈니스 로직 내부에서 환경 변수를 직접 읽지 않고, 구성된 설정
//! 객체를 참조로 주입받습니다. 토큰 서비스와 미디어 호스트 어댑터를
//! 테스트에서 가짜 설정으로 쉽게 대체하기 위한 구조입니다.
//!
//! ## 환경 변수 설정 가이드
//!
//! ```bash
//! # 서버 설정
//! export HOST="127.0.0.1"
//! export PORT="8000"
//!
//! # MongoDB 설정
//! export MONGODB_URI="mongodb://localhost:27017"
//! export DATABASE_NAME="videotube"
//!
//! # JWT 설정 (액세스/리프레시 토큰은 서로 다른 비밀키 사용)
//! export ACCESS_TOKEN_SECRET="access-secret"
//! export ACCESS_TOKEN_EXPIRY_HOURS="1"
//! export REFRESH_TOKEN_SECRET="refresh-secret"
//! export REFRESH_TOKEN_EXPIRY_DAYS="10"
//!
//! # 비밀번호 해싱
//! export BCRYPT_COST="12"
//!
//! # 미디어 호스트 (Cloudinary)
//! export CLOUDINARY_CLOUD_NAME="my-cloud"
//! export CLOUDINARY_API_KEY="key"
//! export CLOUDINARY_API_SECRET="secret"
//! ```

use std::env;

/// HTTP 서버 설정
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 바인딩할 호스트 주소
    pub host: String,
    /// 리스닝 포트
    pub port: u16,
}

impl ServerConfig {
    /// 환경 변수에서 서버 설정을 로드합니다.
    ///
    /// 기본값: `127.0.0.1:8000`
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .unwrap_or_else(|e| {
                log::error!("PORT 파싱 실패: {}. 기본값 8000 사용", e);
                8000
            });

        Self { host, port }
    }

    /// `host:port` 형태의 바인딩 주소
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// MongoDB 연결 설정
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// MongoDB 연결 URI
    pub uri: String,
    /// 사용할 데이터베이스 이름
    pub database_name: String,
}

impl DatabaseConfig {
    /// 환경 변수에서 데이터베이스 설정을 로드합니다.
    pub fn from_env() -> Self {
        Self {
            uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database_name: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| "videotube".to_string()),
        }
    }
}

/// JWT 토큰 설정
///
/// 액세스 토큰과 리프레시 토큰은 서로 다른 비밀키와 만료 기간을
/// 사용합니다. 액세스 토큰은 저장소 조회 없이 어디서든 검증 가능하고,
/// 리프레시 토큰은 사용자 레코드와의 대조를 통해 실질적인 폐기
/// 권한을 가집니다.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// 액세스 토큰 서명 비밀키
    pub access_secret: String,
    /// 액세스 토큰 만료 시간 (시간 단위)
    pub access_expiry_hours: i64,
    /// 리프레시 토큰 서명 비밀키
    pub refresh_secret: String,
    /// 리프레시 토큰 만료 시간 (일 단위)
    pub refresh_expiry_days: i64,
}

impl JwtConfig {
    /// 환경 변수에서 JWT 설정을 로드합니다.
    ///
    /// # Panics
    ///
    /// `ACCESS_TOKEN_SECRET` 또는 `REFRESH_TOKEN_SECRET` 환경 변수가
    /// 설정되지 않은 경우 패닉이 발생합니다. 비밀키 없이 구동되는
    /// 서버는 의미가 없으므로 시작 시점에 실패시킵니다.
    pub fn from_env() -> Self {
        Self {
            access_secret: env::var("ACCESS_TOKEN_SECRET")
                .expect("ACCESS_TOKEN_SECRET must be set"),
            access_expiry_hours: env::var("ACCESS_TOKEN_EXPIRY_HOURS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
            refresh_secret: env::var("REFRESH_TOKEN_SECRET")
                .expect("REFRESH_TOKEN_SECRET must be set"),
            refresh_expiry_days: env::var("REFRESH_TOKEN_EXPIRY_DAYS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
        }
    }
}

/// 비밀번호 해싱 설정
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// bcrypt cost (4-15 범위, 높을수록 느리고 안전)
    pub bcrypt_cost: u32,
}

impl PasswordConfig {
    /// 환경 변수에서 비밀번호 해싱 설정을 로드합니다.
    pub fn from_env() -> Self {
        let bcrypt_cost = env::var("BCRYPT_COST")
            .unwrap_or_else(|_| "12".to_string())
            .parse::<u32>()
            .unwrap_or(12)
            .clamp(4, 15);

        Self { bcrypt_cost }
    }
}

/// 미디어 호스트 (Cloudinary) 설정
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Cloudinary 클라우드 이름
    pub cloud_name: String,
    /// API 키
    pub api_key: String,
    /// API 시크릿 (서명 생성에 사용, 로그에 출력 금지)
    pub api_secret: String,
}

impl MediaConfig {
    /// 환경 변수에서 미디어 호스트 설정을 로드합니다.
    ///
    /// # Panics
    ///
    /// Cloudinary 자격 증명 환경 변수가 설정되지 않은 경우
    /// 패닉이 발생합니다.
    pub fn from_env() -> Self {
        Self {
            cloud_name: env::var("CLOUDINARY_CLOUD_NAME")
                .expect("CLOUDINARY_CLOUD_NAME must be set"),
            api_key: env::var("CLOUDINARY_API_KEY")
                .expect("CLOUDINARY_API_KEY must be set"),
            api_secret: env::var("CLOUDINARY_API_SECRET")
                .expect("CLOUDINARY_API_SECRET must be set"),
        }
    }
}

/// Rate Limiting 설정
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// 초당 허용 요청 수
    pub per_second: u64,
    /// 버스트 허용량
    pub burst_size: u32,
}

impl RateLimitConfig {
    /// 환경 변수에서 Rate Limiting 설정을 로드합니다.
    ///
    /// 기본값: 초당 100요청, 버스트 200개
    pub fn from_env() -> Self {
        let per_second = env::var("RATE_LIMIT_PER_SECOND")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u64>()
            .unwrap_or(100);

        let burst_size = env::var("RATE_LIMIT_BURST_SIZE")
            .unwrap_or_else(|_| "200".to_string())
            .parse::<u32>()
            .unwrap_or(200);

        Self {
            per_second,
            burst_size,
        }
    }
}

/// 애플리케이션 전체 설정
///
/// 프로세스 시작 시 한 번 구성되어 각 서비스에 참조로 전달됩니다.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub media: MediaConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// 모든 설정 섹션을 환경 변수에서 로드합니다.
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env(),
            password: PasswordConfig::from_env(),
            media: MediaConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
        }
    }
}

//! # 사용자 세션 HTTP 핸들러
//!
//! `/api/v1/users` 스코프의 엔드포인트들을 처리합니다.
//! 핸들러는 전송 계층의 관심사(multipart 파싱, 쿠키, 상태 코드)만을
//! 다루고, 비즈니스 규칙은 모두 `SessionService`에 위임합니다.
//!
//! ## 엔드포인트
//!
//! | 메서드 | 경로 | 설명 | 인증 |
//! |--------|------|------|------|
//! | `POST` | `/register` | 회원가입 (multipart) | 불필요 |
//! | `POST` | `/login` | 로그인 | 불필요 |
//! | `POST` | `/refresh-token` | 액세스 토큰 갱신 | 불필요 |
//! | `POST` | `/logout` | 로그아웃 | 필수 |
//! | `POST` | `/change-password` | 비밀번호 변경 | 필수 |
//! | `GET` | `/current-user` | 현재 사용자 조회 | 필수 |
//! | `PATCH` | `/update-account` | 계정 정보 수정 | 필수 |
//! | `PATCH` | `/update-avatar` | 아바타 교체 (multipart) | 필수 |
//! | `PATCH` | `/update-cover-image` | 커버 이미지 교체 (multipart) | 필수 |
//! | `GET` | `/channel/{username}` | 채널 프로필 조회 | 선택 |
//!
//! ## 쿠키 정책
//!
//! 로그인과 갱신은 `accessToken` / `refreshToken` 쿠키를
//! HttpOnly + Secure 속성으로 설정하며, 동일한 토큰을 응답 본문에도
//! 포함합니다 (쿠키를 쓸 수 없는 클라이언트용). 로그아웃은 두 쿠키를
//! 제거합니다.

use std::collections::HashMap;
use std::path::PathBuf;

use actix_multipart::{Field, Multipart};
use actix_web::cookie::Cookie;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, get, patch, post, web};
use futures_util::TryStreamExt;
use uuid::Uuid;
use validator::Validate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::dto::request::{
    ChangePasswordRequest, LoginRequest, RefreshTokenRequest, RegisterInput, UpdateAccountRequest,
};
use crate::domain::dto::response::{ApiResponse, AuthResponse, TokenPairResponse};
use crate::domain::token::TokenPair;
use crate::errors::errors::AppError;
use crate::state::AppState;

/// 회원가입 핸들러
///
/// multipart/form-data 요청에서 텍스트 필드(fullName, email, username,
/// password)와 이미지 파일(avatar 필수, coverImage 선택)을 파싱합니다.
/// 업로드 파일은 임시 디렉터리에 저장된 뒤 서비스 호출이 끝나면
/// 성공 여부와 무관하게 삭제됩니다.
///
/// # 엔드포인트
///
/// `POST /api/v1/users/register`
///
/// # 응답
///
/// * `201 Created` - 정제된 사용자 요약
/// * `400 Bad Request` - 필수 필드 누락, 아바타 누락, 업로드 실패
/// * `409 Conflict` - 사용자명 또는 이메일 중복
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let (input, temp_files) = parse_register_multipart(payload).await?;

    let result = state.sessions.register(input).await;

    // 임시 파일은 결과와 무관하게 정리한다
    remove_temp_files(&temp_files);

    let summary = result?;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        201,
        summary,
        "회원가입이 완료되었습니다",
    )))
}

/// 로그인 핸들러
///
/// 자격 증명 검증에 성공하면 토큰 쌍을 쿠키와 본문 양쪽으로
/// 전달합니다.
///
/// # 엔드포인트
///
/// `POST /api/v1/users/login`
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let (user, pair) = state.sessions.login(&payload).await?;

    let body = ApiResponse::success(
        200,
        AuthResponse {
            user,
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
        },
        "로그인에 성공했습니다",
    );

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie("accessToken", &pair.access_token))
        .cookie(auth_cookie("refreshToken", &pair.refresh_token))
        .json(body))
}

/// 로그아웃 핸들러
///
/// 저장된 리프레시 토큰을 폐기하고 인증 쿠키를 제거합니다.
///
/// # 엔드포인트
///
/// `POST /api/v1/users/logout` (인증 필수)
#[post("/logout")]
pub async fn logout(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let auth = current_auth(&req)?;

    state.sessions.logout(auth.user_id()).await?;

    let mut response = HttpResponse::Ok().json(ApiResponse::success(
        200,
        serde_json::json!({}),
        "로그아웃되었습니다",
    ));
    remove_auth_cookies(&mut response)?;

    Ok(response)
}

/// 액세스 토큰 갱신 핸들러
///
/// 리프레시 토큰은 refreshToken 쿠키 또는 요청 본문에서 읽습니다.
/// 갱신에 성공하면 새 토큰 쌍이 쿠키와 본문으로 전달되며, 이전
/// 리프레시 토큰은 더 이상 사용할 수 없습니다.
///
/// # 엔드포인트
///
/// `POST /api/v1/users/refresh-token`
#[post("/refresh-token")]
pub async fn refresh_token(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Option<web::Json<RefreshTokenRequest>>,
) -> Result<HttpResponse, AppError> {
    let incoming = req
        .cookie("refreshToken")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| payload.map(|body| body.into_inner().refresh_token))
        .ok_or_else(|| {
            AppError::AuthenticationError("리프레시 토큰이 없습니다".to_string())
        })?;

    let pair = state.sessions.refresh(&incoming).await?;

    Ok(token_pair_response(&pair, "토큰이 갱신되었습니다"))
}

/// 비밀번호 변경 핸들러
///
/// 기존 비밀번호 확인 후 새 비밀번호를 저장합니다. 저장된 리프레시
/// 토큰이 함께 폐기되므로 다른 기기의 세션은 갱신 시점에 끊어집니다.
///
/// # 엔드포인트
///
/// `POST /api/v1/users/change-password` (인증 필수)
#[post("/change-password")]
pub async fn change_password(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let auth = current_auth(&req)?;

    state
        .sessions
        .change_password(auth.user_id(), &payload.old_password, &payload.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        200,
        serde_json::json!({}),
        "비밀번호가 변경되었습니다",
    )))
}

/// 현재 사용자 조회 핸들러
///
/// # 엔드포인트
///
/// `GET /api/v1/users/current-user` (인증 필수)
#[get("/current-user")]
pub async fn current_user(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let auth = current_auth(&req)?;
    let summary = state.sessions.current_user(auth.user_id()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        200,
        summary,
        "현재 사용자 정보입니다",
    )))
}

/// 계정 정보 수정 핸들러
///
/// # 엔드포인트
///
/// `PATCH /api/v1/users/update-account` (인증 필수)
#[patch("/update-account")]
pub async fn update_account(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<UpdateAccountRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let auth = current_auth(&req)?;
    let summary = state
        .sessions
        .update_account(auth.user_id(), &payload)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        200,
        summary,
        "계정 정보가 수정되었습니다",
    )))
}

/// 아바타 교체 핸들러
///
/// # 엔드포인트
///
/// `PATCH /api/v1/users/update-avatar` (인증 필수, multipart)
#[patch("/update-avatar")]
pub async fn update_avatar(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let auth = current_auth(&req)?;
    let temp_path = parse_single_file_multipart(payload, "avatar").await?;

    let result = state.sessions.update_avatar(auth.user_id(), &temp_path).await;
    remove_temp_files(std::slice::from_ref(&temp_path));
    let summary = result?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        200,
        summary,
        "아바타가 변경되었습니다",
    )))
}

/// 커버 이미지 교체 핸들러
///
/// # 엔드포인트
///
/// `PATCH /api/v1/users/update-cover-image` (인증 필수, multipart)
#[patch("/update-cover-image")]
pub async fn update_cover_image(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let auth = current_auth(&req)?;
    let temp_path = parse_single_file_multipart(payload, "coverImage").await?;

    let result = state
        .sessions
        .update_cover_image(auth.user_id(), &temp_path)
        .await;
    remove_temp_files(std::slice::from_ref(&temp_path));
    let summary = result?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        200,
        summary,
        "커버 이미지가 변경되었습니다",
    )))
}

/// 채널 프로필 조회 핸들러
///
/// 인증은 선택 사항입니다. 인증된 호출자에게만 구독 여부가
/// 계산됩니다.
///
/// # 엔드포인트
///
/// `GET /api/v1/users/channel/{username}` (선택적 인증, `/channel`
/// 스코프 아래에 등록됨)
#[get("/{username}")]
pub async fn channel_profile(
    state: web::Data<AppState>,
    req: HttpRequest,
    username: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let viewer_id = req
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|auth| auth.user_id().to_string());

    let profile = state
        .sessions
        .channel_profile(&username, viewer_id.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        200,
        profile,
        "채널 정보를 조회했습니다",
    )))
}

/// 요청 확장에서 인증된 사용자 정보를 꺼낸다
///
/// 인증 미들웨어가 먼저 실행되지 않은 라우트에서 호출되면
/// 인증 오류를 반환합니다.
fn current_auth(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    req.extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthenticationError("인증이 필요합니다".to_string()))
}

/// 인증 쿠키 생성 (HttpOnly + Secure)
fn auth_cookie<'a>(name: &'a str, value: &'a str) -> Cookie<'a> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .secure(true)
        .finish()
}

/// 응답에서 인증 쿠키 제거
fn remove_auth_cookies(response: &mut HttpResponse) -> Result<(), AppError> {
    for name in ["accessToken", "refreshToken"] {
        let mut cookie = Cookie::build(name, "").path("/").finish();
        cookie.make_removal();
        response
            .add_cookie(&cookie)
            .map_err(|e| AppError::InternalError(format!("쿠키 설정 실패: {}", e)))?;
    }
    Ok(())
}

/// 토큰 쌍을 쿠키 + 본문으로 담은 200 응답 생성
fn token_pair_response(pair: &TokenPair, message: &str) -> HttpResponse {
    let body = ApiResponse::success(
        200,
        TokenPairResponse {
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
        },
        message,
    );

    HttpResponse::Ok()
        .cookie(auth_cookie("accessToken", &pair.access_token))
        .cookie(auth_cookie("refreshToken", &pair.refresh_token))
        .json(body)
}

/// 회원가입 multipart 요청 파싱
///
/// 텍스트 필드는 메모리에 모으고, 파일 필드(avatar, coverImage)는
/// 임시 디렉터리에 저장합니다. 파싱 도중 실패하면 그 시점까지
/// 저장된 임시 파일을 모두 삭제한 뒤 에러를 반환합니다. 성공 시
/// 반환된 임시 경로의 정리는 호출자의 책임입니다.
async fn parse_register_multipart(
    payload: Multipart,
) -> Result<(RegisterInput, Vec<PathBuf>), AppError> {
    let mut temp_files: Vec<PathBuf> = Vec::new();

    match collect_register_fields(payload, &mut temp_files).await {
        Ok(input) => Ok((input, temp_files)),
        Err(e) => {
            // 부분적으로 저장된 파일을 남기지 않는다
            remove_temp_files(&temp_files);
            Err(e)
        }
    }
}

async fn collect_register_fields(
    mut payload: Multipart,
    temp_files: &mut Vec<PathBuf>,
) -> Result<RegisterInput, AppError> {
    let mut text_fields: HashMap<String, String> = HashMap::new();
    let mut avatar_path: Option<PathBuf> = None;
    let mut cover_image_path: Option<PathBuf> = None;

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let filename = disposition.get_filename().map(str::to_string);

        match (name.as_str(), filename) {
            ("avatar", Some(filename)) => {
                let path = save_temp_file(&mut field, &filename).await?;
                temp_files.push(path.clone());
                avatar_path = Some(path);
            }
            ("coverImage", Some(filename)) => {
                let path = save_temp_file(&mut field, &filename).await?;
                temp_files.push(path.clone());
                cover_image_path = Some(path);
            }
            (_, None) => {
                let value = read_text_field(&mut field).await?;
                text_fields.insert(name, value);
            }
            // 예상하지 못한 파일 필드는 무시한다 (저장하지 않고 소진)
            (_, Some(_)) => {
                while field.try_next().await.map_err(multipart_error)?.is_some() {}
            }
        }
    }

    Ok(RegisterInput {
        full_name: text_fields.remove("fullName").unwrap_or_default(),
        email: text_fields.remove("email").unwrap_or_default(),
        username: text_fields.remove("username").unwrap_or_default(),
        password: text_fields.remove("password").unwrap_or_default(),
        avatar_path,
        cover_image_path,
    })
}

/// 단일 파일 multipart 요청 파싱 (아바타/커버 이미지 교체용)
async fn parse_single_file_multipart(
    mut payload: Multipart,
    field_name: &str,
) -> Result<PathBuf, AppError> {
    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let filename = disposition.get_filename().map(str::to_string);

        if let (true, Some(filename)) = (name == field_name, filename) {
            return save_temp_file(&mut field, &filename).await;
        }

        // 대상이 아닌 필드는 소진만 한다
        while field.try_next().await.map_err(multipart_error)?.is_some() {}
    }

    Err(AppError::ValidationError(format!(
        "{} 파일이 필요합니다",
        field_name
    )))
}

/// multipart 필드를 임시 파일로 저장
///
/// 파일명 충돌을 피하기 위해 UUID 접두사를 붙입니다.
async fn save_temp_file(field: &mut Field, original_name: &str) -> Result<PathBuf, AppError> {
    let mut bytes: Vec<u8> = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        bytes.extend_from_slice(&chunk);
    }

    if bytes.is_empty() {
        return Err(AppError::ValidationError(
            "업로드된 파일이 비어 있습니다".to_string(),
        ));
    }

    let path = std::env::temp_dir().join(format!("{}-{}", Uuid::new_v4(), original_name));

    let write_path = path.clone();
    web::block(move || std::fs::write(&write_path, bytes))
        .await
        .map_err(|e| AppError::InternalError(format!("파일 저장 작업 실패: {}", e)))?
        .map_err(|e| AppError::InternalError(format!("임시 파일 저장 실패: {}", e)))?;

    Ok(path)
}

/// multipart 텍스트 필드를 UTF-8 문자열로 읽기
async fn read_text_field(field: &mut Field) -> Result<String, AppError> {
    let mut bytes: Vec<u8> = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes)
        .map_err(|_| AppError::ValidationError("텍스트 필드가 UTF-8이 아닙니다".to_string()))
}

/// 임시 파일 정리 (실패는 경고만 남긴다)
fn remove_temp_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            log::warn!("임시 파일 삭제 실패 {}: {}", path.display(), e);
        }
    }
}

fn multipart_error(e: actix_multipart::MultipartError) -> AppError {
    AppError::ValidationError(format!("잘못된 multipart 요청입니다: {}", e))
}

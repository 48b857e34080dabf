//! 세션 수명주기 서비스
//!
//! 이 서비스가 저장소의 리프레시 토큰 슬롯을 변경하는 유일한
//! 경로입니다. 자격 증명 검증, 토큰 발급, 리프레시 토큰의 영속화와
//! 회전, 그리고 회원가입/프로필 관리 흐름을 오케스트레이션합니다.
//!
//! ## 회전 규칙
//!
//! - 로그인: 새 리프레시 토큰으로 슬롯을 덮어쓴다 (이전 토큰 무효화)
//! - 갱신: 수신 토큰이 슬롯 값과 일치할 때만 새 토큰으로 교체한다
//!   (조건부 업데이트 — 재사용된 토큰과 동시 갱신 경쟁의 패자는
//!   모두 인증 실패로 처리)
//! - 로그아웃: 슬롯을 비운다
//! - 비밀번호 변경: 슬롯을 비운다 (기존 세션 폐기)
//!
//! 갱신 경로의 모든 실패 원인(누락, 서명/만료 오류, 미존재 사용자,
//! 슬롯 불일치)은 클라이언트에게 동일한 401로 보고됩니다.
//! 어떤 검사가 실패했는지 노출하지 않기 위한 의도적인 동작입니다.

use std::path::Path;
use std::sync::Arc;

use crate::domain::dto::request::{LoginRequest, RegisterInput, UpdateAccountRequest};
use crate::domain::dto::response::{ChannelProfile, UserSummary};
use crate::domain::entities::user::User;
use crate::domain::token::TokenPair;
use crate::errors::errors::{AppError, AppResult, ErrorContext};
use crate::repositories::{ProfileUpdate, UserStore};
use crate::services::media_service::MediaHost;
use crate::services::token_service::TokenService;
use crate::utils::string_utils::{clean_optional_string, validate_required_string};

/// 세션 수명주기 오케스트레이터
///
/// 자격 증명 저장소와 미디어 호스트는 trait 경계 뒤에 있어
/// 테스트에서 인메모리 가짜로 대체됩니다.
pub struct SessionService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
    media: Arc<dyn MediaHost>,
    bcrypt_cost: u32,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
        media: Arc<dyn MediaHost>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            tokens,
            media,
            bcrypt_cost,
        }
    }

    /// 회원가입
    ///
    /// 검증 순서: 텍스트 필드 → 중복 검사 → 아바타 존재 여부 →
    /// 미디어 업로드 → 생성 → 재조회. 아바타가 없으면 업로드를
    /// 시도하지 않고 실패합니다.
    pub async fn register(&self, input: RegisterInput) -> AppResult<UserSummary> {
        let full_name = validate_required_string(&input.full_name, "fullName")?;
        let email = validate_required_string(&input.email, "email")?;
        let username = validate_required_string(&input.username, "username")?;
        let password = validate_required_string(&input.password, "password")?;

        let existing = self
            .users
            .find_by_username_or_email(Some(&username), Some(&email))
            .await?;
        if existing.is_some() {
            return Err(AppError::ConflictError(
                "사용자명 또는 이메일이 이미 존재합니다".to_string(),
            ));
        }

        let avatar_path = input.avatar_path.as_deref().ok_or_else(|| {
            AppError::ValidationError("아바타 이미지는 필수입니다".to_string())
        })?;

        let avatar = self
            .media
            .upload(avatar_path)
            .await?
            .ok_or_else(|| AppError::UploadError("아바타 업로드에 실패했습니다".to_string()))?;

        let cover_image = match input.cover_image_path.as_deref() {
            Some(path) => self.media.upload(path).await?.map(|media| media.url),
            None => None,
        };

        let password_hash = bcrypt::hash(&password, self.bcrypt_cost).context("비밀번호 해싱 실패")?;

        let created = self
            .users
            .create(User::new(
                username,
                email,
                full_name,
                avatar.url,
                cover_image,
                password_hash,
            ))
            .await?;

        // 쓰기 직후 재조회로 영속화 여부를 방어적으로 확인한다
        let created_id = created
            .id_string()
            .ok_or_else(|| AppError::InternalError("생성된 사용자에 ID가 없습니다".to_string()))?;

        let persisted = self.users.find_by_id(&created_id).await?.ok_or_else(|| {
            AppError::InternalError("사용자 등록 중 문제가 발생했습니다".to_string())
        })?;

        log::info!("새 사용자 등록: {}", persisted.username);

        Ok(UserSummary::from(&persisted))
    }

    /// 로그인
    ///
    /// 자격 증명 검증에 성공하면 새 토큰 쌍을 발급하고, 리프레시
    /// 토큰을 사용자 레코드에 영속화합니다 (회전 지점 — 이전 토큰은
    /// 더 이상 갱신에 사용할 수 없게 됩니다).
    pub async fn login(&self, request: &LoginRequest) -> AppResult<(UserSummary, TokenPair)> {
        let username = clean_optional_string(request.username.clone());
        let email = clean_optional_string(request.email.clone());

        if username.is_none() && email.is_none() {
            return Err(AppError::ValidationError(
                "사용자명 또는 이메일이 필요합니다".to_string(),
            ));
        }

        let user = self
            .users
            .find_by_username_or_email(username.as_deref(), email.as_deref())
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;

        let is_valid = bcrypt::verify(&request.password, &user.password_hash).context("비밀번호 검증 실패")?;

        if !is_valid {
            log::warn!("로그인 실패 (잘못된 비밀번호): {}", user.username);
            return Err(AppError::AuthenticationError(
                "유효하지 않은 자격 증명입니다".to_string(),
            ));
        }

        let user_id = user
            .id_string()
            .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?;

        let pair = self.tokens.issue_token_pair(&user)?;
        self.users
            .set_refresh_token(&user_id, &pair.refresh_token)
            .await?;

        log::info!("로그인 성공: {}", user.username);

        Ok((UserSummary::from(&user), pair))
    }

    /// 로그아웃
    ///
    /// 리프레시 토큰 슬롯을 비워 세션을 폐기합니다. 대체 토큰 발급
    /// 없이 세션을 끝내는 유일한 연산입니다.
    pub async fn logout(&self, user_id: &str) -> AppResult<()> {
        self.users.clear_refresh_token(user_id).await?;
        log::info!("로그아웃 완료: 사용자 ID {}", user_id);
        Ok(())
    }

    /// 액세스 토큰 갱신
    ///
    /// 수신한 리프레시 토큰을 검증하고, 저장된 슬롯 값과 대조한 뒤,
    /// 새 토큰 쌍을 발급하며 슬롯을 조건부로 교체합니다.
    /// 한 번 교환된 토큰은 만료 전이라도 재사용할 수 없습니다.
    pub async fn refresh(&self, incoming_token: &str) -> AppResult<TokenPair> {
        let claims = self
            .tokens
            .verify_refresh_token(incoming_token)
            .map_err(|_| {
                AppError::AuthenticationError("유효하지 않은 리프레시 토큰입니다".to_string())
            })?;

        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| {
                AppError::AuthenticationError("유효하지 않은 리프레시 토큰입니다".to_string())
            })?;

        match user.refresh_token.as_deref() {
            Some(stored) if stored == incoming_token => {}
            _ => {
                log::warn!("재사용되었거나 폐기된 리프레시 토큰: 사용자 ID {}", claims.sub);
                return Err(AppError::AuthenticationError(
                    "리프레시 토큰이 만료되었거나 이미 사용되었습니다".to_string(),
                ));
            }
        }

        let pair = self.tokens.issue_token_pair(&user)?;

        // 조건부 회전: 저장된 토큰이 그 사이 바뀌었다면 경쟁의 패자이므로 실패
        let rotated = self
            .users
            .rotate_refresh_token(&claims.sub, incoming_token, &pair.refresh_token)
            .await?;

        if !rotated {
            return Err(AppError::AuthenticationError(
                "리프레시 토큰이 만료되었거나 이미 사용되었습니다".to_string(),
            ));
        }

        Ok(pair)
    }

    /// 비밀번호 변경
    ///
    /// 기존 비밀번호를 확인한 뒤 새 비밀번호를 해싱하여 저장합니다.
    /// 저장된 리프레시 토큰은 함께 폐기되어, 기존 세션으로는 더 이상
    /// 갱신할 수 없습니다.
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;

        let is_valid = bcrypt::verify(old_password, &user.password_hash).context("비밀번호 검증 실패")?;

        if !is_valid {
            return Err(AppError::AuthenticationError(
                "기존 비밀번호가 일치하지 않습니다".to_string(),
            ));
        }

        let password_hash =
            bcrypt::hash(new_password, self.bcrypt_cost).context("비밀번호 해싱 실패")?;

        self.users.set_password_hash(user_id, &password_hash).await?;
        self.users.clear_refresh_token(user_id).await?;

        log::info!("비밀번호 변경 완료: 사용자 ID {}", user_id);

        Ok(())
    }

    /// 현재 사용자 조회 (정제 투영)
    pub async fn current_user(&self, user_id: &str) -> AppResult<UserSummary> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;

        Ok(UserSummary::from(&user))
    }

    /// 계정 정보 수정 (표시 이름, 이메일)
    pub async fn update_account(
        &self,
        user_id: &str,
        request: &UpdateAccountRequest,
    ) -> AppResult<UserSummary> {
        // 이메일 변경 시 다른 계정과의 충돌 확인
        if let Some(existing) = self
            .users
            .find_by_username_or_email(None, Some(&request.email))
            .await?
        {
            if existing.id_string().as_deref() != Some(user_id) {
                return Err(AppError::ConflictError(
                    "이미 사용 중인 이메일입니다".to_string(),
                ));
            }
        }

        let updated = self
            .users
            .update_profile(
                user_id,
                ProfileUpdate {
                    full_name: Some(request.full_name.clone()),
                    email: Some(request.email.clone()),
                    ..ProfileUpdate::default()
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;

        Ok(UserSummary::from(&updated))
    }

    /// 아바타 이미지 교체
    pub async fn update_avatar(&self, user_id: &str, local_path: &Path) -> AppResult<UserSummary> {
        let uploaded = self
            .media
            .upload(local_path)
            .await?
            .ok_or_else(|| AppError::UploadError("아바타 업로드에 실패했습니다".to_string()))?;

        let updated = self
            .users
            .update_profile(
                user_id,
                ProfileUpdate {
                    avatar: Some(uploaded.url),
                    ..ProfileUpdate::default()
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;

        Ok(UserSummary::from(&updated))
    }

    /// 커버 이미지 교체
    pub async fn update_cover_image(
        &self,
        user_id: &str,
        local_path: &Path,
    ) -> AppResult<UserSummary> {
        let uploaded = self
            .media
            .upload(local_path)
            .await?
            .ok_or_else(|| AppError::UploadError("커버 이미지 업로드에 실패했습니다".to_string()))?;

        let updated = self
            .users
            .update_profile(
                user_id,
                ProfileUpdate {
                    cover_image: Some(uploaded.url),
                    ..ProfileUpdate::default()
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;

        Ok(UserSummary::from(&updated))
    }

    /// 채널 프로필 조회
    ///
    /// 대상 사용자의 공개 프로필과 구독 관계 집계를 반환합니다.
    /// 호출자가 인증된 경우에만 구독 여부가 계산됩니다.
    pub async fn channel_profile(
        &self,
        username: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<ChannelProfile> {
        let username = validate_required_string(username, "username")?;

        self.users
            .channel_profile(&username, viewer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("채널이 존재하지 않습니다".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use mongodb::bson::oid::ObjectId;

    use crate::config::JwtConfig;
    use crate::services::media_service::UploadedMedia;

    /// 테스트용 인메모리 자격 증명 저장소
    struct InMemoryUserStore {
        users: Mutex<HashMap<String, User>>,
        /// (subscriber_id, channel_id) 쌍
        subscriptions: Mutex<Vec<(String, String)>>,
    }

    impl InMemoryUserStore {
        fn new() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
                subscriptions: Mutex::new(Vec::new()),
            }
        }

        fn user_count(&self) -> usize {
            self.users.lock().unwrap().len()
        }

        fn stored_refresh_token(&self, id: &str) -> Option<String> {
            self.users
                .lock()
                .unwrap()
                .get(id)
                .and_then(|user| user.refresh_token.clone())
        }

        fn subscribe(&self, subscriber_id: &str, channel_id: &str) {
            self.subscriptions
                .lock()
                .unwrap()
                .push((subscriber_id.to_string(), channel_id.to_string()));
        }
    }

    #[async_trait]
    impl UserStore for InMemoryUserStore {
        async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
            Ok(self.users.lock().unwrap().get(id).cloned())
        }

        async fn find_by_username_or_email(
            &self,
            username: Option<&str>,
            email: Option<&str>,
        ) -> AppResult<Option<User>> {
            let users = self.users.lock().unwrap();
            Ok(users
                .values()
                .find(|user| {
                    username
                        .map(|u| user.username == u.to_lowercase())
                        .unwrap_or(false)
                        || email.map(|e| user.email == e).unwrap_or(false)
                })
                .cloned())
        }

        async fn create(&self, mut user: User) -> AppResult<User> {
            let id = ObjectId::new();
            user.id = Some(id);
            self.users
                .lock()
                .unwrap()
                .insert(id.to_hex(), user.clone());
            Ok(user)
        }

        async fn update_profile(
            &self,
            id: &str,
            update: ProfileUpdate,
        ) -> AppResult<Option<User>> {
            let mut users = self.users.lock().unwrap();
            Ok(users.get_mut(id).map(|user| {
                if let Some(full_name) = update.full_name {
                    user.full_name = full_name;
                }
                if let Some(email) = update.email {
                    user.email = email;
                }
                if let Some(avatar) = update.avatar {
                    user.avatar = avatar;
                }
                if let Some(cover_image) = update.cover_image {
                    user.cover_image = Some(cover_image);
                }
                user.clone()
            }))
        }

        async fn set_password_hash(&self, id: &str, password_hash: &str) -> AppResult<()> {
            if let Some(user) = self.users.lock().unwrap().get_mut(id) {
                user.password_hash = password_hash.to_string();
            }
            Ok(())
        }

        async fn set_refresh_token(&self, id: &str, token: &str) -> AppResult<()> {
            if let Some(user) = self.users.lock().unwrap().get_mut(id) {
                user.refresh_token = Some(token.to_string());
            }
            Ok(())
        }

        async fn rotate_refresh_token(
            &self,
            id: &str,
            expected: &str,
            new_token: &str,
        ) -> AppResult<bool> {
            let mut users = self.users.lock().unwrap();
            match users.get_mut(id) {
                Some(user) if user.refresh_token.as_deref() == Some(expected) => {
                    user.refresh_token = Some(new_token.to_string());
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn clear_refresh_token(&self, id: &str) -> AppResult<()> {
            if let Some(user) = self.users.lock().unwrap().get_mut(id) {
                user.refresh_token = None;
            }
            Ok(())
        }

        async fn channel_profile(
            &self,
            username: &str,
            viewer_id: Option<&str>,
        ) -> AppResult<Option<ChannelProfile>> {
            let users = self.users.lock().unwrap();
            let target = match users
                .values()
                .find(|user| user.username == username.to_lowercase())
            {
                Some(user) => user,
                None => return Ok(None),
            };

            let target_id = target.id_string().unwrap();
            let subscriptions = self.subscriptions.lock().unwrap();

            let subscriber_count = subscriptions
                .iter()
                .filter(|(_, channel)| *channel == target_id)
                .count() as i64;
            let channels_subscribed_to_count = subscriptions
                .iter()
                .filter(|(subscriber, _)| *subscriber == target_id)
                .count() as i64;
            let is_subscribed = viewer_id
                .map(|viewer| {
                    subscriptions
                        .iter()
                        .any(|(subscriber, channel)| subscriber == viewer && *channel == target_id)
                })
                .unwrap_or(false);

            Ok(Some(ChannelProfile {
                username: target.username.clone(),
                full_name: target.full_name.clone(),
                email: target.email.clone(),
                avatar: target.avatar.clone(),
                cover_image: target.cover_image.clone(),
                subscriber_count,
                channels_subscribed_to_count,
                is_subscribed,
            }))
        }
    }

    /// 테스트용 가짜 미디어 호스트
    ///
    /// 수행된 업로드를 기록하여 "업로드가 일어나지 않았음"을 검증할 수
    /// 있게 합니다.
    struct FakeMediaHost {
        fail: bool,
        uploads: Mutex<Vec<PathBuf>>,
    }

    impl FakeMediaHost {
        fn new() -> Self {
            Self {
                fail: false,
                uploads: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                uploads: Mutex::new(Vec::new()),
            }
        }

        fn upload_count(&self) -> usize {
            self.uploads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MediaHost for FakeMediaHost {
        async fn upload(&self, local_path: &Path) -> AppResult<Option<UploadedMedia>> {
            self.uploads.lock().unwrap().push(local_path.to_path_buf());

            if self.fail {
                return Ok(None);
            }

            Ok(Some(UploadedMedia {
                url: format!("https://media.test/{}", local_path.display()),
                public_id: "test-media".to_string(),
            }))
        }
    }

    fn test_jwt_config() -> JwtConfig {
        JwtConfig {
            access_secret: "test-access-secret".to_string(),
            access_expiry_hours: 1,
            refresh_secret: "test-refresh-secret".to_string(),
            refresh_expiry_days: 10,
        }
    }

    struct Harness {
        service: SessionService,
        store: Arc<InMemoryUserStore>,
        media: Arc<FakeMediaHost>,
    }

    fn harness_with_media(media: FakeMediaHost) -> Harness {
        let store = Arc::new(InMemoryUserStore::new());
        let media = Arc::new(media);
        let service = SessionService::new(
            store.clone(),
            Arc::new(TokenService::new(test_jwt_config())),
            media.clone(),
            // 테스트에서는 낮은 cost로 해싱 시간을 줄인다
            4,
        );

        Harness {
            service,
            store,
            media,
        }
    }

    fn harness() -> Harness {
        harness_with_media(FakeMediaHost::new())
    }

    fn register_input(username: &str, email: &str) -> RegisterInput {
        RegisterInput {
            full_name: "Alice Kim".to_string(),
            email: email.to_string(),
            username: username.to_string(),
            password: "Secret1234".to_string(),
            avatar_path: Some(PathBuf::from("avatar.png")),
            cover_image_path: None,
        }
    }

    fn login_request(username: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.to_string()),
            email: None,
            password: "Secret1234".to_string(),
        }
    }

    #[actix_web::test]
    async fn test_register_returns_sanitized_summary() {
        let h = harness();

        let summary = h
            .service
            .register(register_input("Alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(summary.username, "alice");
        assert_eq!(summary.avatar, "https://media.test/avatar.png");

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("refreshToken"));
    }

    #[actix_web::test]
    async fn test_register_duplicate_fails_and_creates_nothing() {
        let h = harness();

        h.service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();
        assert_eq!(h.store.user_count(), 1);

        // 같은 사용자명, 다른 이메일
        let result = h
            .service
            .register(register_input("alice", "other@example.com"))
            .await;
        assert!(matches!(result, Err(AppError::ConflictError(_))));

        // 같은 이메일, 다른 사용자명
        let result = h
            .service
            .register(register_input("bob", "alice@example.com"))
            .await;
        assert!(matches!(result, Err(AppError::ConflictError(_))));

        assert_eq!(h.store.user_count(), 1);
    }

    #[actix_web::test]
    async fn test_register_blank_fields_rejected() {
        let h = harness();

        let mut input = register_input("alice", "alice@example.com");
        input.full_name = "   ".to_string();

        let result = h.service.register(input).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(h.store.user_count(), 0);
    }

    #[actix_web::test]
    async fn test_register_missing_avatar_performs_no_upload() {
        let h = harness();

        let mut input = register_input("alice", "alice@example.com");
        input.avatar_path = None;

        let result = h.service.register(input).await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(h.media.upload_count(), 0);
        assert_eq!(h.store.user_count(), 0);
    }

    #[actix_web::test]
    async fn test_register_failed_avatar_upload_is_upload_error() {
        let h = harness_with_media(FakeMediaHost::failing());

        let result = h
            .service
            .register(register_input("alice", "alice@example.com"))
            .await;

        assert!(matches!(result, Err(AppError::UploadError(_))));
        assert_eq!(h.store.user_count(), 0);
    }

    #[actix_web::test]
    async fn test_login_persists_refresh_token_and_invalidates_previous() {
        let h = harness();
        let summary = h
            .service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();

        let (_, first_pair) = h.service.login(&login_request("alice")).await.unwrap();
        assert_eq!(
            h.store.stored_refresh_token(&summary.id).as_deref(),
            Some(first_pair.refresh_token.as_str())
        );

        // 두 번째 로그인이 슬롯을 덮어써 첫 토큰을 무효화한다
        let (_, second_pair) = h.service.login(&login_request("alice")).await.unwrap();
        assert_ne!(first_pair.refresh_token, second_pair.refresh_token);

        let result = h.service.refresh(&first_pair.refresh_token).await;
        assert!(matches!(result, Err(AppError::AuthenticationError(_))));

        // 현재 토큰은 여전히 유효하다
        assert!(h.service.refresh(&second_pair.refresh_token).await.is_ok());
    }

    #[actix_web::test]
    async fn test_login_wrong_password_does_not_touch_slot() {
        let h = harness();
        let summary = h
            .service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();

        let (_, pair) = h.service.login(&login_request("alice")).await.unwrap();

        let mut bad = login_request("alice");
        bad.password = "WrongPassword".to_string();
        let result = h.service.login(&bad).await;

        assert!(matches!(result, Err(AppError::AuthenticationError(_))));
        assert_eq!(
            h.store.stored_refresh_token(&summary.id).as_deref(),
            Some(pair.refresh_token.as_str())
        );
    }

    #[actix_web::test]
    async fn test_login_without_identifier_is_validation_error() {
        let h = harness();

        let request = LoginRequest {
            username: None,
            email: None,
            password: "whatever".to_string(),
        };

        let result = h.service.login(&request).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[actix_web::test]
    async fn test_login_blank_identifier_is_validation_error() {
        let h = harness();

        // 공백만 있는 식별자는 없는 것으로 취급한다
        let request = LoginRequest {
            username: Some("   ".to_string()),
            email: None,
            password: "whatever".to_string(),
        };

        let result = h.service.login(&request).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[actix_web::test]
    async fn test_login_unknown_user_is_not_found() {
        let h = harness();

        let result = h.service.login(&login_request("ghost")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_refresh_rotates_and_rejects_stale_token() {
        let h = harness();
        h.service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();
        let (_, pair) = h.service.login(&login_request("alice")).await.unwrap();

        // 첫 번째 갱신은 성공하고 슬롯을 회전시킨다
        let rotated = h.service.refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        // 이미 교환된 토큰으로의 두 번째 갱신은 실패한다
        let result = h.service.refresh(&pair.refresh_token).await;
        assert!(matches!(result, Err(AppError::AuthenticationError(_))));

        // 회전된 토큰으로는 계속 갱신 가능하다
        assert!(h.service.refresh(&rotated.refresh_token).await.is_ok());
    }

    #[actix_web::test]
    async fn test_refresh_with_garbage_token_fails() {
        let h = harness();

        let result = h.service.refresh("not-a-jwt").await;
        assert!(matches!(result, Err(AppError::AuthenticationError(_))));
    }

    #[actix_web::test]
    async fn test_logout_clears_slot_and_kills_refresh() {
        let h = harness();
        let summary = h
            .service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();
        let (_, pair) = h.service.login(&login_request("alice")).await.unwrap();

        h.service.logout(&summary.id).await.unwrap();
        assert!(h.store.stored_refresh_token(&summary.id).is_none());

        let result = h.service.refresh(&pair.refresh_token).await;
        assert!(matches!(result, Err(AppError::AuthenticationError(_))));
    }

    #[actix_web::test]
    async fn test_change_password_old_fails_new_succeeds() {
        let h = harness();
        let summary = h
            .service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();
        let (_, pair) = h.service.login(&login_request("alice")).await.unwrap();

        h.service
            .change_password(&summary.id, "Secret1234", "NewSecret5678")
            .await
            .unwrap();

        // 기존 비밀번호로는 더 이상 로그인할 수 없다
        let result = h.service.login(&login_request("alice")).await;
        assert!(matches!(result, Err(AppError::AuthenticationError(_))));

        // 새 비밀번호로는 로그인 가능하다
        let mut new_login = login_request("alice");
        new_login.password = "NewSecret5678".to_string();
        assert!(h.service.login(&new_login).await.is_ok());

        // 기존 리프레시 토큰은 비밀번호 변경 시점에 폐기되었다
        // (새 로그인이 슬롯을 다시 채우기 전에 검증)
        let result = h.service.refresh(&pair.refresh_token).await;
        assert!(matches!(result, Err(AppError::AuthenticationError(_))));
    }

    #[actix_web::test]
    async fn test_change_password_wrong_old_password() {
        let h = harness();
        let summary = h
            .service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();

        let result = h
            .service
            .change_password(&summary.id, "WrongOld", "NewSecret5678")
            .await;

        assert!(matches!(result, Err(AppError::AuthenticationError(_))));
    }

    #[actix_web::test]
    async fn test_update_account_rejects_taken_email() {
        let h = harness();
        let alice = h
            .service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();
        h.service
            .register(register_input("bob", "bob@example.com"))
            .await
            .unwrap();

        let request = UpdateAccountRequest {
            full_name: "Alice Kim".to_string(),
            email: "bob@example.com".to_string(),
        };
        let result = h.service.update_account(&alice.id, &request).await;

        assert!(matches!(result, Err(AppError::ConflictError(_))));
    }

    #[actix_web::test]
    async fn test_update_avatar_replaces_url() {
        let h = harness();
        let summary = h
            .service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();

        let updated = h
            .service
            .update_avatar(&summary.id, Path::new("new-avatar.png"))
            .await
            .unwrap();

        assert_eq!(updated.avatar, "https://media.test/new-avatar.png");
    }

    #[actix_web::test]
    async fn test_channel_profile_counts_and_subscription_flag() {
        let h = harness();
        let alice = h
            .service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();
        let bob = h
            .service
            .register(register_input("bob", "bob@example.com"))
            .await
            .unwrap();

        h.store.subscribe(&bob.id, &alice.id);

        // bob 시점: alice 채널을 구독 중
        let profile = h
            .service
            .channel_profile("alice", Some(&bob.id))
            .await
            .unwrap();
        assert_eq!(profile.subscriber_count, 1);
        assert_eq!(profile.channels_subscribed_to_count, 0);
        assert!(profile.is_subscribed);

        // 익명 시점: 구독 여부는 항상 false
        let profile = h.service.channel_profile("alice", None).await.unwrap();
        assert!(!profile.is_subscribed);

        // bob 의 채널: 구독자는 없고 구독 중인 채널은 1개
        let profile = h.service.channel_profile("bob", None).await.unwrap();
        assert_eq!(profile.subscriber_count, 0);
        assert_eq!(profile.channels_subscribed_to_count, 1);
    }

    #[actix_web::test]
    async fn test_channel_profile_unknown_username() {
        let h = harness();

        let result = h.service.channel_profile("ghost", None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

//! AuthMiddleware 인증 로직의 핵심적인 기능

use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, forward_ready};
use actix_web::{Error, HttpMessage, HttpResponse, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::auth::{AuthMode, AuthenticatedUser};
use crate::domain::dto::response::UserSummary;
use crate::errors::errors::AppError;
use crate::state::AppState;

/// 실제 인증 로직을 수행하는 서비스
pub struct AuthMiddlewareService<S> {
    pub service: Rc<S>,
    pub mode: AuthMode,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let mode = self.mode.clone();

        Box::pin(async move {
            let auth_result = authenticate_request(&req).await;

            match (&mode, auth_result) {
                // Required 모드에서 인증 실패
                (AuthMode::Required, Err(err)) => {
                    log::warn!("인증 실패: {}", err);
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "statusCode": 401,
                        "message": "유효한 인증 토큰이 필요합니다",
                        "success": false,
                        "errors": []
                    }));
                    let (req, _) = req.into_parts();
                    let res = ServiceResponse::new(req, response).map_into_right_body();
                    return Ok(res);
                }
                // 인증 성공: 사용자 정보를 Request Extensions에 저장
                (_, Ok(user)) => {
                    log::debug!("인증 성공: 사용자 ID {}", user.user_id());
                    req.extensions_mut().insert(user);
                }
                // Optional 모드에서 인증 실패 (익명으로 진행)
                (AuthMode::Optional, Err(_)) => {
                    log::debug!("선택적 인증: 토큰 없음, 익명으로 진행");
                }
            }

            // 다음 서비스로 요청 전달
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// 요청에서 액세스 토큰을 추출하고 검증한 뒤 사용자 레코드를 조회
///
/// 토큰 소스 우선순위: accessToken 쿠키 → Authorization Bearer 헤더.
/// 검증에 성공하면 저장소에서 사용자를 재조회하여 토큰 발급 이후
/// 삭제된 계정을 걸러냅니다.
async fn authenticate_request(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("애플리케이션 상태가 없습니다".to_string()))?;

    let token = extract_access_token(req, state)?;
    let claims = state.tokens.verify_access_token(&token)?;

    let user = state
        .users
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("사용자를 찾을 수 없습니다".to_string()))?;

    Ok(AuthenticatedUser {
        user: UserSummary::from(&user),
    })
}

/// 쿠키 또는 Authorization 헤더에서 액세스 토큰 추출
fn extract_access_token(
    req: &ServiceRequest,
    state: &web::Data<AppState>,
) -> Result<String, AppError> {
    if let Some(cookie) = req.cookie("accessToken") {
        return Ok(cookie.value().to_string());
    }

    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            AppError::AuthenticationError("인증 토큰이 없습니다".to_string())
        })?;

    state
        .tokens
        .extract_bearer_token(auth_header)
        .map(str::to_string)
}

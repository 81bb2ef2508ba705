use crate::domain::user::{ChangePasswordRequest, LoginRequest, ProfileChanges, SignupRequest};
use crate::presentation::handlers::{ApiError, AppState};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, HttpResponse, web};
use std::future::Future;
use std::pin::Pin;
use tracing::{error, info, instrument};

/// Caller identity resolved from an `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub session_id: String,
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let token = token
                .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;
            let state = state
                .ok_or_else(|| ApiError::Internal("Application state not configured".to_string()))?;

            let claims = state.auth_service.authenticate(&token).await?;
            Ok(AuthenticatedUser {
                user_id: claims.user_id,
                session_id: claims.session_id,
            })
        })
    }
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn signup(
    state: web::Data<AppState>,
    req: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Signup request received");

    let session = state
        .auth_service
        .signup(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to sign up");
            ApiError::from(e)
        })?;

    info!(user_id = %session.user.id, "User signed up successfully");
    Ok(HttpResponse::Created().json(session))
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let session = state
        .auth_service
        .login(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to login");
            ApiError::from(e)
        })?;

    info!(user_id = %session.user.id, "Login successful");
    Ok(HttpResponse::Ok().json(session))
}

#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn logout(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    state.auth_service.logout(&user.session_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let profile = state.auth_service.current_user(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[instrument(skip(state, changes), fields(user_id = %user.user_id))]
pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    changes: web::Json<ProfileChanges>,
) -> Result<HttpResponse, ApiError> {
    let profile = state
        .auth_service
        .update_profile(&user.user_id, changes.into_inner())
        .await?;
    info!("Profile updated successfully");
    Ok(HttpResponse::Ok().json(profile))
}

#[instrument(skip(state, req), fields(user_id = %user.user_id))]
pub async fn change_password(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    state
        .auth_service
        .change_password(&user.user_id, req.into_inner())
        .await?;
    info!("Password changed successfully");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic dXNlcjpwdw=="))
            .to_http_request();
        assert!(bearer_token(&req).is_none());

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert!(bearer_token(&req).is_none());

        assert!(bearer_token(&TestRequest::default().to_http_request()).is_none());
    }
}

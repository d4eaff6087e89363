//! Auth handlers: register, login, profile, OAuth sign-in

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{
    ApiResponse, AuthPayload, FacebookLoginRequest, GoogleLoginRequest, LoginRequest,
    RegisterRequest, UpdatePasswordRequest, UpdateProfileRequest, User,
};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    let payload = state.auth_service.register(req).await?;
    Ok((
        StatusCode::CREATED,
        token_response(payload, state.config.jwt_expires_in_days),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = state.auth_service.login(&req.email, &req.password).await?;
    Ok(token_response(payload, state.config.jwt_expires_in_days))
}

pub async fn logout(AuthUser(_user): AuthUser) -> impl IntoResponse {
    // Tokens are stateless; just expire the cookie copy.
    (
        [(header::SET_COOKIE, "token=none; HttpOnly; Max-Age=10; Path=/")],
        Json(ApiResponse::<()>::message("Logged out successfully")),
    )
}

pub async fn me(AuthUser(user): AuthUser) -> Json<ApiResponse<User>> {
    Json(ApiResponse::ok(user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    req.validate()?;
    let user = state.auth_service.update_profile(user.id, req).await?;
    Ok(Json(ApiResponse::ok(user)))
}

pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    let payload = state.auth_service.update_password(user.id, req).await?;
    Ok(token_response(payload, state.config.jwt_expires_in_days))
}

pub async fn google_login(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.oauth_service.verify_google(&req.credential).await?;
    let payload = state.auth_service.oauth_login(profile).await?;
    Ok(token_response(payload, state.config.jwt_expires_in_days))
}

pub async fn facebook_login(
    State(state): State<AppState>,
    Json(req): Json<FacebookLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .oauth_service
        .verify_facebook(&req.access_token, &req.user_id)
        .await?;
    let payload = state.auth_service.oauth_login(profile).await?;
    Ok(token_response(payload, state.config.jwt_expires_in_days))
}

/// Issue the token both in the body and as an HttpOnly cookie whose
/// lifetime matches the token expiry.
fn token_response(payload: AuthPayload, expires_in_days: i64) -> impl IntoResponse {
    let cookie = format!(
        "token={}; HttpOnly; Path=/; Max-Age={}",
        payload.token,
        expires_in_days * 24 * 60 * 60
    );
    (
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::ok(payload)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PublicUser, UserRole};

    #[test]
    fn cookie_lifetime_matches_token_expiry() {
        let payload = AuthPayload {
            token: "abc".to_string(),
            user: PublicUser {
                id: uuid::Uuid::new_v4(),
                name: "Test".to_string(),
                email: "test@example.com".to_string(),
                role: UserRole::User,
                avatar: String::new(),
            },
        };
        let response = token_response(payload, 2).into_response();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap();
        assert!(cookie.contains("Max-Age=172800"), "cookie was {cookie}");
        assert!(cookie.contains("HttpOnly"));
    }
}

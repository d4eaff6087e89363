//! Authenticated-user extractors guarding protected routes
//!
//! `AuthUser` rejects with 401 when the bearer token is missing, invalid or
//! expired; `AdminUser` additionally rejects with 403 for non-admin roles.

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;
use axum::RequestPartsExt;
use axum_extra::TypedHeader;
use headers::authorization::Bearer;
use headers::Authorization;

use crate::app_state::AppState;
use crate::auth::jwt;
use crate::error::ApiError;
use crate::models::User;

pub struct AuthUser(pub User);

pub struct AdminUser(pub User);

/// Bearer token from the Authorization header, falling back to the
/// `token` cookie set at login.
async fn bearer_token(parts: &mut Parts) -> Option<String> {
    if let Ok(TypedHeader(Authorization(bearer))) =
        parts.extract::<TypedHeader<Authorization<Bearer>>>().await
    {
        return Some(bearer.token().to_string());
    }
    parts
        .headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|cookie| cookie.strip_prefix("token="))
                .map(str::to_string)
        })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = bearer_token(parts)
            .await
            .ok_or_else(|| ApiError::Authentication("Not authorized, no token".to_string()))?;

        let claims = jwt::verify_token(&state.config.jwt_secret, &token)?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(claims.sub)
            .fetch_optional(&state.pool)
            .await?
            .ok_or_else(|| {
                ApiError::Authentication("Not authorized, user no longer exists".to_string())
            })?;

        Ok(AuthUser(user))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Authorization(
                "Not authorized to access this route".to_string(),
            ));
        }
        Ok(AdminUser(user))
    }
}

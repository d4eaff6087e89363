//! OAuth identity verification against provider userinfo endpoints
//!
//! The providers are opaque collaborators: each login call verifies the
//! submitted token with the provider and returns normalized identity
//! claims for the auth service to resolve.

use serde::Deserialize;

use crate::error::ApiError;
use crate::models::{AuthProviderKind, OAuthProfile};

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const FACEBOOK_ME_URL: &str = "https://graph.facebook.com/me";

pub struct OAuthService {
    http: reqwest::Client,
    google_client_id: Option<String>,
}

#[derive(Deserialize)]
struct GoogleTokenInfo {
    sub: String,
    aud: String,
    email: Option<String>,
    // Google returns booleans as strings in the tokeninfo response.
    email_verified: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Deserialize)]
struct FacebookProfile {
    id: String,
    name: String,
    email: Option<String>,
    picture: Option<FacebookPicture>,
}

#[derive(Deserialize)]
struct FacebookPicture {
    data: FacebookPictureData,
}

#[derive(Deserialize)]
struct FacebookPictureData {
    url: String,
}

impl OAuthService {
    pub fn new(http: reqwest::Client, google_client_id: Option<String>) -> Self {
        Self {
            http,
            google_client_id,
        }
    }

    /// Verify a Google ID token and extract identity claims.
    pub async fn verify_google(&self, credential: &str) -> Result<OAuthProfile, ApiError> {
        let response = self
            .http
            .get(GOOGLE_TOKENINFO_URL)
            .query(&[("id_token", credential)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Authentication(
                "Google token verification failed".to_string(),
            ));
        }
        let info: GoogleTokenInfo = response.json().await?;

        if let Some(client_id) = self.google_client_id.as_deref() {
            if info.aud != client_id {
                return Err(ApiError::Authentication(
                    "Google token was issued for a different client".to_string(),
                ));
            }
        }

        Ok(OAuthProfile {
            provider: AuthProviderKind::Google,
            provider_id: info.sub,
            email_verified: info.email_verified.as_deref() == Some("true"),
            email: info.email,
            name: info.name.unwrap_or_else(|| "Google User".to_string()),
            avatar: info.picture.unwrap_or_default(),
        })
    }

    /// Verify a Facebook access token by fetching the profile it grants
    /// and checking it matches the claimed user id.
    pub async fn verify_facebook(
        &self,
        access_token: &str,
        claimed_user_id: &str,
    ) -> Result<OAuthProfile, ApiError> {
        let response = self
            .http
            .get(FACEBOOK_ME_URL)
            .query(&[
                ("fields", "id,name,email,picture"),
                ("access_token", access_token),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Authentication(
                "Facebook token verification failed".to_string(),
            ));
        }
        let profile: FacebookProfile = response.json().await?;

        if profile.id != claimed_user_id {
            return Err(ApiError::Authentication(
                "Facebook token does not belong to this user".to_string(),
            ));
        }

        Ok(OAuthProfile {
            provider: AuthProviderKind::Facebook,
            provider_id: profile.id,
            // Graph API only returns an email the user has confirmed.
            email_verified: profile.email.is_some(),
            email: profile.email,
            name: profile.name,
            avatar: profile
                .picture
                .map(|picture| picture.data.url)
                .unwrap_or_default(),
        })
    }
}

//! Auth service layer - registration, login, profile and OAuth resolution

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::error::ApiError;
use crate::models::{
    AuthPayload, AuthProviderKind, OAuthProfile, PublicUser, RegisterRequest, UpdatePasswordRequest,
    UpdateProfileRequest, User,
};

/// Identical message for unknown email and wrong password, so login
/// failures never reveal whether an account exists.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct AuthService {
    pool: PgPool,
    jwt_secret: String,
    jwt_expires_in_days: i64,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt_secret: String, jwt_expires_in_days: i64) -> Self {
        Self {
            pool,
            jwt_secret,
            jwt_expires_in_days,
        }
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String, ApiError> {
        auth::generate_token(&self.jwt_secret, user_id, self.jwt_expires_in_days)
    }

    fn auth_payload(&self, user: &User) -> Result<AuthPayload, ApiError> {
        Ok(AuthPayload {
            token: self.issue_token(user.id)?,
            user: PublicUser::from(user),
        })
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthPayload, ApiError> {
        let email = req.email.trim().to_lowercase();

        let existing = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(&email)
        .fetch_one(&self.pool)
        .await?;
        if existing {
            return Err(ApiError::Duplicate(
                "User already exists with this email".to_string(),
            ));
        }

        let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(&email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, "user registered");
        self.auth_payload(&user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError> {
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Please provide an email and password".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        // OAuth-only accounts have no hash and can never password-login.
        let hash = user
            .password_hash
            .as_deref()
            .ok_or_else(|| ApiError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !bcrypt::verify(password, hash)? {
            return Err(ApiError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        self.auth_payload(&user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<User, ApiError> {
        let email = req.email.map(|e| e.trim().to_lowercase());

        if let Some(email) = &email {
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id != $2)",
            )
            .bind(email)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
            if taken {
                return Err(ApiError::Duplicate(
                    "User already exists with this email".to_string(),
                ));
            }
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(req.name)
        .bind(email)
        .bind(req.phone)
        .bind(req.address.map(sqlx::types::Json))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(user)
    }

    pub async fn update_password(
        &self,
        user_id: Uuid,
        req: UpdatePasswordRequest,
    ) -> Result<AuthPayload, ApiError> {
        let user = self.get_user(user_id).await?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or_else(|| ApiError::Authentication("Current password is incorrect".to_string()))?;
        if !bcrypt::verify(&req.current_password, hash)? {
            return Err(ApiError::Authentication(
                "Current password is incorrect".to_string(),
            ));
        }

        let new_hash = bcrypt::hash(&req.new_password, bcrypt::DEFAULT_COST)?;
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(new_hash)
            .execute(&self.pool)
            .await?;

        self.auth_payload(&user)
    }

    /// Resolve an OAuth identity to an account: provider id first, then
    /// verified-email auto-link, then a fresh account. Emails the provider
    /// has not verified are never used for linking, only for creation of a
    /// provider-scoped placeholder identity.
    pub async fn oauth_login(&self, profile: OAuthProfile) -> Result<AuthPayload, ApiError> {
        let provider_column = match profile.provider {
            AuthProviderKind::Google => "google_id",
            AuthProviderKind::Facebook => "facebook_id",
            AuthProviderKind::Local => {
                return Err(ApiError::Validation("Unknown OAuth provider".to_string()))
            }
        };

        let by_provider = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users WHERE {provider_column} = $1"
        ))
        .bind(&profile.provider_id)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(user) = by_provider {
            return self.auth_payload(&user);
        }

        if profile.email_verified {
            if let Some(email) = profile.email.as_deref() {
                let by_email =
                    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                        .bind(email.to_lowercase())
                        .fetch_optional(&self.pool)
                        .await?;
                if let Some(user) = by_email {
                    let linked = sqlx::query_as::<_, User>(&format!(
                        r#"
                        UPDATE users
                        SET {provider_column} = $2,
                            avatar = CASE WHEN avatar = '' THEN $3 ELSE avatar END
                        WHERE id = $1
                        RETURNING *
                        "#
                    ))
                    .bind(user.id)
                    .bind(&profile.provider_id)
                    .bind(&profile.avatar)
                    .fetch_one(&self.pool)
                    .await?;
                    tracing::info!(user_id = %linked.id, provider = ?profile.provider, "linked OAuth identity to existing account");
                    return self.auth_payload(&linked);
                }
            }
        }

        let email = match (&profile.email, profile.email_verified) {
            (Some(email), true) => email.to_lowercase(),
            // Unverified or absent email: do not claim it, synthesize one.
            _ => format!("{}@{}.placeholder.local", profile.provider_id, provider_column),
        };

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, email, {provider_column}, auth_provider, avatar)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&profile.name)
        .bind(email)
        .bind(&profile.provider_id)
        .bind(profile.provider)
        .bind(&profile.avatar)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, provider = ?profile.provider, "created account from OAuth identity");
        self.auth_payload(&user)
    }
}

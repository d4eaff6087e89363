//! Environment-backed configuration

use std::env;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expires_in_days: i64,
    pub stripe_secret_key: Option<String>,
    pub google_client_id: Option<String>,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .context("PORT must be a number")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let jwt_expires_in_days = env::var("JWT_EXPIRES_IN_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .context("JWT_EXPIRES_IN_DAYS must be a number")?;
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            database_url,
            port,
            jwt_secret,
            jwt_expires_in_days,
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").ok(),
            google_client_id: env::var("GOOGLE_CLIENT_ID").ok(),
            cors_allowed_origins,
        })
    }
}

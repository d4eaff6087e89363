//! JWT issuing and validation
//!
//! Tokens bind a single claim, the account id, and are time-boxed by the
//! configured expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

pub fn generate_token(secret: &str, user_id: Uuid, expires_in_days: i64) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + Duration::days(expires_in_days)).timestamp(),
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_token_round_trips() {
        let user_id = Uuid::new_v4();
        let token = generate_token(SECRET, user_id, 7).unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Negative expiry puts `exp` well past the validation leeway.
        let token = generate_token(SECRET, Uuid::new_v4(), -1).unwrap();
        let err = verify_token(SECRET, &token).unwrap_err();
        assert_eq!(err.to_string(), "Not authorized, token failed");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_token("other-secret", Uuid::new_v4(), 7).unwrap();
        assert!(verify_token(SECRET, &token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token(SECRET, "not-a-token").is_err());
    }
}

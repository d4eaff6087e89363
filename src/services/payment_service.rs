//! Stripe payment-intent creation
//!
//! The gateway is an opaque collaborator: one HTTP call that either
//! returns a client secret or fails as an upstream error.

use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::PaymentIntentPayload;

const PAYMENT_INTENTS_URL: &str = "https://api.stripe.com/v1/payment_intents";

pub struct PaymentService {
    http: reqwest::Client,
    secret_key: Option<String>,
}

#[derive(Deserialize)]
struct StripePaymentIntent {
    client_secret: String,
}

impl PaymentService {
    pub fn new(http: reqwest::Client, secret_key: Option<String>) -> Self {
        Self { http, secret_key }
    }

    pub async fn create_payment_intent(
        &self,
        amount: f64,
        user_id: Uuid,
    ) -> Result<PaymentIntentPayload, ApiError> {
        if amount <= 0.0 {
            return Err(ApiError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }
        let secret_key = self.secret_key.as_deref().ok_or_else(|| {
            ApiError::Upstream("Payment gateway is not configured".to_string())
        })?;

        let amount_cents = (amount * 100.0).round() as i64;
        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", "usd".to_string()),
            ("metadata[userId]", user_id.to_string()),
        ];

        let response = self
            .http
            .post(PAYMENT_INTENTS_URL)
            .basic_auth(secret_key, Option::<&str>::None)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "payment intent creation failed");
            return Err(ApiError::Upstream(format!(
                "Payment provider returned {status}: {body}"
            )));
        }

        let intent: StripePaymentIntent = response.json().await?;
        Ok(PaymentIntentPayload {
            client_secret: intent.client_secret,
        })
    }
}

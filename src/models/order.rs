//! Orders, line-item snapshots, totals and the fulfillment state machine

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use super::Address;

pub const TAX_RATE: f64 = 0.08;
pub const FREE_SHIPPING_THRESHOLD: f64 = 100.0;
pub const FLAT_SHIPPING_PRICE: f64 = 9.99;

/// Fulfillment status.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Legal fulfillment transitions. Delivered and Cancelled are terminal;
    /// everything else moves forward or cancels.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Processing, Shipped) | (Processing, Cancelled) | (Shipped, Delivered) | (Shipped, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// Opaque payment-provider receipt stored on paid orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    pub update_time: String,
    pub email_address: String,
}

/// Order record. Line items live in `order_items` and are attached on read.
#[derive(Debug, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_address: Json<Address>,
    pub payment_method: String,
    pub payment_result: Option<Json<PaymentResult>>,
    pub items_price: f64,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub order_status: OrderStatus,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of a listing at the moment of purchase. Immutable: later edits
/// to the product never show through here.
#[derive(Debug, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    pub price: f64,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItem>,
}

/// Order plus the owning user's name and email, for admin listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItem>,
    pub user: OrderOwner,
}

#[derive(Debug, Serialize, sqlx::FromRow, Clone)]
pub struct OrderOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Admin order listing payload: the page of orders plus revenue over all
/// paid orders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderList {
    pub orders: Vec<AdminOrder>,
    pub total_revenue: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_items: Vec<OrderItemInput>,
    pub shipping_address: Address,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    pub total_price: f64,
}

fn default_payment_method() -> String {
    "stripe".to_string()
}

#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    pub product: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentRequest {
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentPayload {
    pub client_secret: String,
}

/// Totals breakdown derived from the items subtotal: 8% tax, flat-rate
/// shipping waived above the free-shipping threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    pub items_price: f64,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
}

impl OrderTotals {
    pub fn from_items_price(items_price: f64) -> Self {
        let items_price = round_cents(items_price);
        let shipping_price = if items_price > FREE_SHIPPING_THRESHOLD {
            0.0
        } else {
            FLAT_SHIPPING_PRICE
        };
        let tax_price = round_cents(items_price * TAX_RATE);
        let total_price = round_cents(items_price + shipping_price + tax_price);
        Self {
            items_price,
            tax_price,
            shipping_price,
            total_price,
        }
    }
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_below_free_shipping_threshold() {
        // Two units at $29.99: subtotal 59.98, flat shipping, 8% tax.
        let totals = OrderTotals::from_items_price(2.0 * 29.99);
        assert_eq!(totals.items_price, 59.98);
        assert_eq!(totals.shipping_price, FLAT_SHIPPING_PRICE);
        assert_eq!(totals.tax_price, 4.8);
        assert_eq!(totals.total_price, 74.77);
    }

    #[test]
    fn totals_above_free_shipping_threshold() {
        let totals = OrderTotals::from_items_price(150.0);
        assert_eq!(totals.shipping_price, 0.0);
        assert_eq!(totals.tax_price, 12.0);
        assert_eq!(totals.total_price, 162.0);
    }

    #[test]
    fn exactly_at_threshold_still_pays_shipping() {
        let totals = OrderTotals::from_items_price(100.0);
        assert_eq!(totals.shipping_price, FLAT_SHIPPING_PRICE);
    }

    #[test]
    fn transition_table_only_allows_forward_or_cancel() {
        use OrderStatus::*;
        let legal = [
            (Processing, Shipped),
            (Processing, Cancelled),
            (Shipped, Delivered),
            (Shipped, Cancelled),
        ];
        for from in [Processing, Shipped, Delivered, Cancelled] {
            for to in [Processing, Shipped, Delivered, Cancelled] {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transition {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn delivered_and_cancelled_are_terminal() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }
}

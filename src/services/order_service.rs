//! Order service layer - checkout, stock reconciliation, fulfillment
//!
//! Checkout runs inside a single transaction: each line item is claimed
//! with an atomic conditional decrement (`stock = stock - n WHERE
//! stock >= n`), so concurrent checkouts of the last unit cannot both
//! succeed and a failure on any item rolls back every decrement already
//! applied. Cancellation additively restores the snapshot quantities in
//! the same transaction as the status update.

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    AdminOrder, CreateOrderRequest, Order, OrderItem, OrderOwner, OrderStatus, OrderTotals,
    OrderWithItems, PaymentResult, User,
};

const ADMIN_PAGE_SIZE: i64 = 20;

/// Tolerance when comparing the client's expected total against the
/// server-computed one.
const TOTAL_TOLERANCE: f64 = 0.01;

pub struct OrderService {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct ItemSnapshot {
    id: Uuid,
    name: String,
    price: f64,
    images: Json<Vec<crate::models::ProductImage>>,
}

impl OrderService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate stock, decrement it and persist the order with immutable
    /// line-item snapshots, all-or-nothing.
    pub async fn create_order(
        &self,
        user_id: Uuid,
        req: CreateOrderRequest,
    ) -> Result<OrderWithItems, ApiError> {
        if req.order_items.is_empty() {
            return Err(ApiError::Validation("No order items".to_string()));
        }
        for item in &req.order_items {
            if item.quantity < 1 {
                return Err(ApiError::Validation(
                    "Item quantity must be at least 1".to_string(),
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let order_id = Uuid::new_v4();
        let mut items: Vec<OrderItem> = Vec::with_capacity(req.order_items.len());
        let mut items_price = 0.0;

        for item in &req.order_items {
            let snapshot = sqlx::query_as::<_, ItemSnapshot>(
                "SELECT id, name, price, images FROM products WHERE id = $1 AND is_active",
            )
            .bind(item.product)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {}", item.product)))?;

            let claimed = sqlx::query(
                "UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
            )
            .bind(item.product)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
            if claimed.rows_affected() == 0 {
                // Rolls back decrements already applied for earlier items.
                return Err(ApiError::InsufficientStock(format!(
                    "Insufficient stock for {}",
                    snapshot.name
                )));
            }

            let image = snapshot
                .images
                .0
                .first()
                .map(|img| img.url.clone())
                .unwrap_or_default();
            items_price += snapshot.price * f64::from(item.quantity);
            items.push(OrderItem {
                id: Uuid::new_v4(),
                order_id,
                product_id: snapshot.id,
                name: snapshot.name,
                image,
                price: snapshot.price,
                quantity: item.quantity,
            });
        }

        let totals = OrderTotals::from_items_price(items_price);
        if (totals.total_price - req.total_price).abs() > TOTAL_TOLERANCE {
            return Err(ApiError::Validation(format!(
                "Order total mismatch: expected {:.2}",
                totals.total_price
            )));
        }

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, user_id, shipping_address, payment_method,
                items_price, tax_price, shipping_price, total_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(user_id)
        .bind(Json(&req.shipping_address))
        .bind(&req.payment_method)
        .bind(totals.items_price)
        .bind(totals.tax_price)
        .bind(totals.shipping_price)
        .bind(totals.total_price)
        .fetch_one(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, name, image, price, quantity)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(item.id)
            .bind(item.order_id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(&item.image)
            .bind(item.price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(order_id = %order.id, total = order.total_price, "order created");
        Ok(OrderWithItems {
            order,
            order_items: items,
        })
    }

    /// Fetch one order; only the owner or an admin may read it.
    pub async fn get_order(&self, id: Uuid, requester: &User) -> Result<OrderWithItems, ApiError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

        if order.user_id != requester.id && !requester.is_admin() {
            return Err(ApiError::Authorization(
                "Not authorized to access this order".to_string(),
            ));
        }

        let order_items = self.items_for(order.id).await?;
        Ok(OrderWithItems { order, order_items })
    }

    pub async fn my_orders(&self, user_id: Uuid) -> Result<Vec<OrderWithItems>, ApiError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_items(orders).await
    }

    /// Record the provider receipt and mark the order paid. Paying a
    /// cancelled or already-paid order is rejected.
    pub async fn mark_paid(
        &self,
        id: Uuid,
        requester: &User,
        receipt: PaymentResult,
    ) -> Result<OrderWithItems, ApiError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

        if order.user_id != requester.id && !requester.is_admin() {
            return Err(ApiError::Authorization(
                "Not authorized to access this order".to_string(),
            ));
        }
        if order.order_status == OrderStatus::Cancelled {
            return Err(ApiError::Validation(
                "Cannot mark a cancelled order as paid".to_string(),
            ));
        }
        if order.is_paid {
            return Err(ApiError::Validation("Order is already paid".to_string()));
        }

        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET is_paid = TRUE, paid_at = now(), payment_result = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(&receipt))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order.id, "order paid");
        let order_items = self.items_for(order.id).await?;
        Ok(OrderWithItems { order, order_items })
    }

    /// Admin-only fulfillment transition, checked against the legal
    /// transition table. Cancelling restores stock for every snapshot
    /// line item; delivering stamps the delivery timestamp.
    pub async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<OrderWithItems, ApiError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

        if !order.order_status.can_transition_to(status) {
            return Err(ApiError::Validation(format!(
                "Cannot change order status from {} to {}",
                order.order_status, status
            )));
        }

        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET order_status = $2,
                delivered_at = CASE WHEN $2 = 'Delivered'::order_status THEN now() ELSE delivered_at END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        if status == OrderStatus::Cancelled {
            restore_stock(&mut tx, id).await?;
            tracing::info!(order_id = %id, "order cancelled, stock restored");
        }

        tx.commit().await?;

        let order_items = self.items_for(order.id).await?;
        Ok(OrderWithItems { order, order_items })
    }

    /// Admin listing with pagination and total revenue over paid orders.
    pub async fn list_all(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<(Vec<AdminOrder>, i64, i64, i64, f64), ApiError> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(ADMIN_PAGE_SIZE).clamp(1, 100);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        let total_revenue: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price), 0.0) FROM orders WHERE is_paid",
        )
        .fetch_one(&self.pool)
        .await?;

        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(&self.pool)
        .await?;

        let mut admin_orders = Vec::with_capacity(orders.len());
        for with_items in self.attach_items(orders).await? {
            let user = sqlx::query_as::<_, OrderOwner>(
                "SELECT id, name, email FROM users WHERE id = $1",
            )
            .bind(with_items.order.user_id)
            .fetch_one(&self.pool)
            .await?;
            admin_orders.push(AdminOrder {
                order: with_items.order,
                order_items: with_items.order_items,
                user,
            });
        }

        Ok((admin_orders, total, page, limit, total_revenue))
    }

    pub async fn stats(&self) -> Result<serde_json::Value, ApiError> {
        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        let pending_orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE order_status = 'Processing'",
        )
        .fetch_one(&self.pool)
        .await?;
        let delivered_orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE order_status = 'Delivered'",
        )
        .fetch_one(&self.pool)
        .await?;
        let total_revenue: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price), 0.0) FROM orders WHERE is_paid",
        )
        .fetch_one(&self.pool)
        .await?;
        let monthly_revenue = monthly_revenue(&self.pool).await?;

        Ok(serde_json::json!({
            "totalOrders": total_orders,
            "pendingOrders": pending_orders,
            "deliveredOrders": delivered_orders,
            "totalRevenue": total_revenue,
            "monthlyRevenue": monthly_revenue,
        }))
    }

    async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItem>, ApiError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn attach_items(&self, orders: Vec<Order>) -> Result<Vec<OrderWithItems>, ApiError> {
        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders
            .into_iter()
            .map(|order| {
                let order_items = items
                    .iter()
                    .filter(|item| item.order_id == order.id)
                    .cloned()
                    .collect();
                OrderWithItems { order, order_items }
            })
            .collect())
    }
}

/// Additive restore of the quantities recorded in the order's snapshot,
/// regardless of current stock.
async fn restore_stock(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<(), ApiError> {
    // Quantities are summed per product first: UPDATE .. FROM applies at
    // most one joined row per target, which would drop duplicate lines.
    sqlx::query(
        r#"
        UPDATE products
        SET stock = stock + oi.quantity
        FROM (
            SELECT product_id, SUM(quantity) AS quantity
            FROM order_items
            WHERE order_id = $1
            GROUP BY product_id
        ) oi
        WHERE products.id = oi.product_id
        "#,
    )
    .bind(order_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Paid revenue bucketed by calendar month, oldest first, for charts.
pub async fn monthly_revenue(pool: &PgPool) -> Result<serde_json::Value, ApiError> {
    #[derive(sqlx::FromRow)]
    struct MonthRow {
        month: String,
        revenue: f64,
        orders: i64,
    }

    let rows = sqlx::query_as::<_, MonthRow>(
        r#"
        SELECT to_char(date_trunc('month', created_at), 'YYYY-MM') AS month,
               COALESCE(SUM(total_price), 0.0) AS revenue,
               COUNT(*) AS orders
        FROM orders
        WHERE is_paid
        GROUP BY 1
        ORDER BY 1
        LIMIT 12
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(serde_json::Value::Array(
        rows.into_iter()
            .map(|row| {
                serde_json::json!({
                    "month": row.month,
                    "revenue": row.revenue,
                    "orders": row.orders,
                })
            })
            .collect(),
    ))
}

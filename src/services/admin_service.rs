//! Admin service layer - user management and dashboard aggregates

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{AdminUpdateUserRequest, Order, User};
use crate::services::order_service::monthly_revenue;

const USER_PAGE_SIZE: i64 = 20;
const LOW_STOCK_THRESHOLD: i32 = 10;

pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_users(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<(Vec<User>, i64, i64, i64), ApiError> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(USER_PAGE_SIZE).clamp(1, 100);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(&self.pool)
        .await?;

        Ok((users, total, page, limit))
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// The only path that may change an account's role.
    pub async fn update_user(
        &self,
        id: Uuid,
        req: AdminUpdateUserRequest,
    ) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(req.name)
        .bind(req.email.map(|e| e.trim().to_lowercase()))
        .bind(req.role)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        tracing::info!(user_id = %user.id, role = ?user.role, "user updated by admin");
        Ok(user)
    }

    /// Users with order history or catalog entries cannot be removed:
    /// orders are never deleted and products keep their creator. Reviews
    /// cascade with the account, so the affected product aggregates are
    /// recomputed in the same transaction.
    pub async fn delete_user(&self, id: Uuid) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;

        let has_orders: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM orders WHERE user_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if has_orders {
            return Err(ApiError::Validation(
                "Cannot delete a user with existing orders".to_string(),
            ));
        }

        let has_products: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM products WHERE created_by = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if has_products {
            return Err(ApiError::Validation(
                "Cannot delete a user who created products".to_string(),
            ));
        }

        let reviewed_products: Vec<Uuid> = sqlx::query_scalar(
            "SELECT DISTINCT product_id FROM reviews WHERE user_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        for product_id in reviewed_products {
            sqlx::query(
                r#"
                UPDATE products
                SET num_reviews = agg.cnt,
                    ratings = agg.avg
                FROM (
                    SELECT COUNT(*)::int AS cnt,
                           COALESCE(ROUND(AVG(rating)::numeric, 1), 0)::float8 AS avg
                    FROM reviews
                    WHERE product_id = $1
                ) AS agg
                WHERE products.id = $1
                "#,
            )
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(user_id = %id, "user deleted by admin");
        Ok(())
    }

    pub async fn dashboard(&self) -> Result<serde_json::Value, ApiError> {
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        let total_revenue: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price), 0.0) FROM orders WHERE is_paid",
        )
        .fetch_one(&self.pool)
        .await?;

        let recent_orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders ORDER BY created_at DESC LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await?;

        #[derive(sqlx::FromRow)]
        struct StatusCount {
            status: crate::models::OrderStatus,
            count: i64,
        }
        let status_breakdown = sqlx::query_as::<_, StatusCount>(
            "SELECT order_status AS status, COUNT(*) AS count FROM orders GROUP BY order_status",
        )
        .fetch_all(&self.pool)
        .await?;

        #[derive(sqlx::FromRow)]
        struct TopProduct {
            product_id: Uuid,
            name: String,
            total_sold: i64,
            revenue: f64,
        }
        let top_products = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT product_id,
                   MIN(name) AS name,
                   SUM(quantity)::bigint AS total_sold,
                   SUM(price * quantity) AS revenue
            FROM order_items
            GROUP BY product_id
            ORDER BY total_sold DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let monthly_sales = monthly_revenue(&self.pool).await?;

        #[derive(sqlx::FromRow)]
        struct LowStockProduct {
            id: Uuid,
            name: String,
            stock: i32,
            price: f64,
        }
        let low_stock = sqlx::query_as::<_, LowStockProduct>(
            "SELECT id, name, stock, price FROM products WHERE stock < $1 ORDER BY stock LIMIT 5",
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_all(&self.pool)
        .await?;

        Ok(serde_json::json!({
            "totalUsers": total_users,
            "totalProducts": total_products,
            "totalOrders": total_orders,
            "totalRevenue": total_revenue,
            "recentOrders": recent_orders,
            "orderStatusBreakdown": status_breakdown
                .into_iter()
                .map(|row| serde_json::json!({ "status": row.status, "count": row.count }))
                .collect::<Vec<_>>(),
            "topProducts": top_products
                .into_iter()
                .map(|row| serde_json::json!({
                    "product": row.product_id,
                    "name": row.name,
                    "totalSold": row.total_sold,
                    "revenue": row.revenue,
                }))
                .collect::<Vec<_>>(),
            "monthlySales": monthly_sales,
            "lowStockProducts": low_stock
                .into_iter()
                .map(|row| serde_json::json!({
                    "id": row.id,
                    "name": row.name,
                    "stock": row.stock,
                    "price": row.price,
                }))
                .collect::<Vec<_>>(),
        }))
    }
}

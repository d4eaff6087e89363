//! Product catalog service layer - listings, filtering, reviews

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    AddReviewRequest, CreateProductRequest, ListProductsQuery, Product, ProductCategory,
    ProductDetail, ProductSort, Review, UpdateProductRequest, User,
};

const DEFAULT_PAGE_SIZE: i64 = 12;
const ADMIN_PAGE_SIZE: i64 = 20;
const FEATURED_LIMIT: i64 = 8;

pub struct ProductService {
    pool: PgPool,
}

impl ProductService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Filtered, sorted, paginated listing over active products.
    pub async fn list(
        &self,
        query: ListProductsQuery,
    ) -> Result<(Vec<Product>, i64, i64, i64), ApiError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
        let offset = (page - 1) * limit;

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM products WHERE is_active");
        push_filters(&mut count_builder, &query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM products WHERE is_active");
        push_filters(&mut builder, &query);
        builder.push(" ORDER BY ");
        builder.push(query.sort.unwrap_or(ProductSort::Newest).order_by());
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let products = builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok((products, total, page, limit))
    }

    /// Admin listing: includes inactive products.
    pub async fn list_admin(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<(Vec<Product>, i64, i64, i64), ApiError> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(ADMIN_PAGE_SIZE).clamp(1, 100);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(&self.pool)
        .await?;

        Ok((products, total, page, limit))
    }

    pub async fn get(&self, id: Uuid) -> Result<ProductDetail, ApiError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE product_id = $1 ORDER BY created_at DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProductDetail { product, reviews })
    }

    pub async fn featured(&self) -> Result<Vec<Product>, ApiError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE featured AND is_active ORDER BY created_at DESC LIMIT $1",
        )
        .bind(FEATURED_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn categories(&self) -> Result<Vec<ProductCategory>, ApiError> {
        let categories = sqlx::query_scalar::<_, ProductCategory>(
            "SELECT DISTINCT category FROM products ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn create(
        &self,
        req: CreateProductRequest,
        created_by: Uuid,
    ) -> Result<Product, ApiError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                id, name, description, price, original_price, category, brand,
                images, stock, featured, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.name)
        .bind(req.description)
        .bind(req.price)
        .bind(req.original_price)
        .bind(req.category)
        .bind(req.brand.unwrap_or_else(|| "Unbranded".to_string()))
        .bind(sqlx::types::Json(req.images))
        .bind(req.stock)
        .bind(req.featured)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    pub async fn update(&self, id: Uuid, req: UpdateProductRequest) -> Result<Product, ApiError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                original_price = COALESCE($5, original_price),
                category = COALESCE($6, category),
                brand = COALESCE($7, brand),
                images = COALESCE($8, images),
                stock = COALESCE($9, stock),
                featured = COALESCE($10, featured),
                is_active = COALESCE($11, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(req.name)
        .bind(req.description)
        .bind(req.price)
        .bind(req.original_price)
        .bind(req.category)
        .bind(req.brand)
        .bind(req.images.map(sqlx::types::Json))
        .bind(req.stock)
        .bind(req.featured)
        .bind(req.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

        Ok(product)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Product not found".to_string()));
        }
        Ok(())
    }

    /// Record a review and recompute the aggregate rating. At most one
    /// review per author per product; the aggregate is the mean rating
    /// rounded to one decimal, recomputed in a single statement so that
    /// concurrent reviewers cannot overwrite each other's update.
    pub async fn add_review(
        &self,
        product_id: Uuid,
        reviewer: &User,
        req: AddReviewRequest,
    ) -> Result<(), ApiError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(ApiError::NotFound("Product not found".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO reviews (id, product_id, user_id, name, rating, comment)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (product_id, user_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(reviewer.id)
        .bind(&reviewer.name)
        .bind(req.rating)
        .bind(&req.comment)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(ApiError::Duplicate(
                "You have already reviewed this product".to_string(),
            ));
        }

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

        tx.commit().await?;
        Ok(())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ListProductsQuery) {
    // "All" is the client's sentinel for no category filter. An unknown
    // category name matches nothing rather than erroring.
    if let Some(category) = query.category.as_deref().filter(|c| *c != "All") {
        let parsed: Result<ProductCategory, _> =
            serde_json::from_value(serde_json::Value::String(category.to_string()));
        match parsed {
            Ok(category) => {
                builder.push(" AND category = ");
                builder.push_bind(category);
            }
            Err(_) => {
                builder.push(" AND FALSE");
            }
        }
    }
    if let Some(min_price) = query.min_price {
        builder.push(" AND price >= ");
        builder.push_bind(min_price);
    }
    if let Some(max_price) = query.max_price {
        builder.push(" AND price <= ");
        builder.push_bind(max_price);
    }
    if let Some(rating) = query.rating {
        builder.push(" AND ratings >= ");
        builder.push_bind(rating);
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        builder.push(" AND (name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR description ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    if let Some(brand) = query.brand.as_deref() {
        builder.push(" AND brand = ");
        builder.push_bind(brand.to_string());
    }
}

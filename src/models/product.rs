//! Product catalog models and query DTOs

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;
use validator::Validate;

/// Closed set of product categories.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "product_category")]
pub enum ProductCategory {
    Electronics,
    Clothing,
    #[sqlx(rename = "Home & Garden")]
    #[serde(rename = "Home & Garden")]
    HomeAndGarden,
    Sports,
    Books,
    Beauty,
    Toys,
    Automotive,
    Health,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

/// Product listing. `ratings` and `num_reviews` are derived from the
/// reviews table and never settable directly.
#[derive(Debug, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub original_price: f64,
    pub category: ProductCategory,
    pub brand: String,
    pub images: Json<Vec<ProductImage>>,
    pub stock: i32,
    pub ratings: f64,
    pub num_reviews: i32,
    pub featured: bool,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One review per author per product, enforced by a unique constraint.
#[derive(Debug, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Product detail response: the listing plus its review list.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Product name cannot exceed 200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[serde(default)]
    pub original_price: f64,
    pub category: ProductCategory,
    pub brand: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub featured: bool,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Product name cannot exceed 200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub category: Option<ProductCategory>,
    pub brand: Option<String>,
    pub images: Option<Vec<ProductImage>>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub featured: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(min = 1, message = "Please provide a comment"))]
    pub comment: String,
}

/// Query parameters for the public product listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub rating: Option<f64>,
    pub search: Option<String>,
    pub brand: Option<String>,
    pub sort: Option<ProductSort>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    Newest,
    PriceLow,
    PriceHigh,
    Rating,
}

impl ProductSort {
    pub fn order_by(self) -> &'static str {
        match self {
            ProductSort::Newest => "created_at DESC",
            ProductSort::PriceLow => "price ASC",
            ProductSort::PriceHigh => "price DESC",
            ProductSort::Rating => "ratings DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_keys_map_to_sql_order() {
        let q: ListProductsQuery =
            serde_json::from_value(serde_json::json!({ "sort": "price_low" })).unwrap();
        assert_eq!(q.sort, Some(ProductSort::PriceLow));
        assert_eq!(ProductSort::PriceLow.order_by(), "price ASC");
        assert_eq!(ProductSort::Newest.order_by(), "created_at DESC");
    }

    #[test]
    fn home_and_garden_round_trips_with_its_wire_name() {
        let json = serde_json::to_string(&ProductCategory::HomeAndGarden).unwrap();
        assert_eq!(json, "\"Home & Garden\"");
        let back: ProductCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProductCategory::HomeAndGarden);
    }
}

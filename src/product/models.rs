use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use stone_shop::schema::{images, products};
use validator::Validate;

use crate::category::models::Category;

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Identifiable, Serialize)]
#[diesel(table_name=products)]
#[diesel(primary_key(product_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    pub product_id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock_quantity: i32,
    pub category_id: i32,
}

#[derive(Insertable, Deserialize, Validate)]
#[diesel(table_name = products)]
pub struct NewProduct {
    #[validate(length(min = 3, max = 255))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0))]
    pub stock_quantity: i32,
    pub category_id: i32,
}

#[derive(AsChangeset, Deserialize)]
#[diesel(table_name = products)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock_quantity: Option<i32>,
    pub category_id: Option<i32>,
}

#[derive(Queryable, Selectable, Debug, PartialEq, Identifiable, Associations, Serialize)]
#[diesel(table_name=images)]
#[diesel(primary_key(image_id))]
#[diesel(belongs_to(Product))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Image {
    pub image_id: i32,
    pub product_id: i32,
    pub url: String,
}

#[derive(Serialize)]
pub struct ProductWithDetails {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    pub image_url: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Pagination {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

use super::models::{NewProduct, Pagination, Product, ProductWithDetails, UpdateProduct};
use crate::category::models::Category;
use crate::storage;
use crate::utils::error::{bad_request, internal_error, not_found};
use crate::utils::extract::ValidatedJson;
use crate::utils::types::Pool;
use axum::{
    extract::{Json, Multipart, Path, Query, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

pub async fn create_product(
    State(pool): State<Pool>,
    ValidatedJson(payload): ValidatedJson<NewProduct>,
) -> Result<Json<Product>, (StatusCode, String)> {
    use stone_shop::schema::{categories, products};

    let mut conn = pool.get().await.map_err(internal_error)?;

    let category_exists: i64 = categories::table
        .filter(categories::category_id.eq(payload.category_id))
        .count()
        .get_result(&mut conn)
        .await
        .map_err(internal_error)?;

    if category_exists == 0 {
        return Err(bad_request("unknown category"));
    }

    let res = diesel::insert_into(products::table)
        .values(&payload)
        .returning(Product::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(res))
}

pub async fn get_products(
    State(pool): State<Pool>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<ProductWithDetails>>, (StatusCode, String)> {
    use stone_shop::schema::{categories, images, products};

    let mut conn = pool.get().await.map_err(internal_error)?;

    let rows = products::table
        .left_join(categories::table)
        .left_join(images::table)
        .order(products::product_id.desc())
        .offset(pagination.offset.unwrap_or(0))
        .limit(pagination.limit.unwrap_or(50))
        .select((
            Product::as_select(),
            Option::<Category>::as_select(),
            images::url.nullable(),
        ))
        .load::<(Product, Option<Category>, Option<String>)>(&mut conn)
        .await
        .map_err(internal_error)?;

    let res = rows
        .into_iter()
        .map(|(product, category, image_url)| ProductWithDetails {
            product,
            category,
            image_url: image_url.map(|url| storage::public_url(&url)),
        })
        .collect();

    Ok(Json(res))
}

pub async fn get_product_by_id(
    State(pool): State<Pool>,
    Path(id): Path<i32>,
) -> Result<Json<ProductWithDetails>, (StatusCode, String)> {
    use stone_shop::schema::{categories, images, products};

    let mut conn = pool.get().await.map_err(internal_error)?;

    let (product, category, image_url) = products::table
        .left_join(categories::table)
        .left_join(images::table)
        .filter(products::product_id.eq(id))
        .select((
            Product::as_select(),
            Option::<Category>::as_select(),
            images::url.nullable(),
        ))
        .get_result::<(Product, Option<Category>, Option<String>)>(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?
        .ok_or_else(|| not_found("product not found"))?;

    Ok(Json(ProductWithDetails {
        product,
        category,
        image_url: image_url.map(|url| storage::public_url(&url)),
    }))
}

pub async fn update_product(
    State(pool): State<Pool>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProduct>,
) -> Result<Json<Product>, (StatusCode, String)> {
    use stone_shop::schema::products;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = diesel::update(products::table.find(id))
        .set(&payload)
        .returning(Product::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(res))
}

pub async fn remove_product(
    State(pool): State<Pool>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, (StatusCode, String)> {
    use stone_shop::schema::{images, products};

    let mut conn = pool.get().await.map_err(internal_error)?;

    // blob first, then the row; the images row itself goes with the cascade
    let image_path: Option<String> = images::table
        .filter(images::product_id.eq(id))
        .select(images::url)
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?;

    if let Some(path) = image_path {
        storage::delete(&path).await.map_err(internal_error)?;
    }

    let res = diesel::delete(products::table.find(id))
        .returning(Product::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(res))
}

/// Stores the product image under the `product-images` namespace and upserts
/// the single image row for the product.
pub async fn upload_product_image(
    State(pool): State<Pool>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    use stone_shop::schema::{images, products};

    let mut upload: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        if field.name() == Some("image") {
            let content_type = field.content_type().map(str::to_owned);
            let data = field
                .bytes()
                .await
                .map_err(|e| bad_request(e.to_string()))?;
            upload = Some((content_type, data.to_vec()));
        }
    }

    let (content_type, data) = upload.ok_or_else(|| bad_request("missing image field"))?;
    let ext = storage::validate_image(content_type.as_deref(), data.len())?;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let product_exists: i64 = products::table
        .filter(products::product_id.eq(id))
        .count()
        .get_result(&mut conn)
        .await
        .map_err(internal_error)?;

    if product_exists == 0 {
        return Err(not_found("product not found"));
    }

    let previous: Option<String> = images::table
        .filter(images::product_id.eq(id))
        .select(images::url)
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?;

    let path = storage::store(storage::PRODUCT_IMAGES, ext, &data)
        .await
        .map_err(internal_error)?;

    diesel::insert_into(images::table)
        .values((images::product_id.eq(id), images::url.eq(&path)))
        .on_conflict(images::product_id)
        .do_update()
        .set(images::url.eq(&path))
        .execute(&mut conn)
        .await
        .map_err(internal_error)?;

    if let Some(old) = previous {
        if let Err(e) = storage::delete(&old).await {
            tracing::warn!(error = %e, path = %old, "failed to remove replaced product image");
        }
    }

    Ok(Json(serde_json::json!({ "url": storage::public_url(&path) })))
}

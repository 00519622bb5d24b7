use super::models::{Category, NewCategory};
use crate::utils::error::{conflict, internal_error};
use crate::utils::extract::ValidatedJson;
use crate::utils::types::Pool;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

pub async fn create_category(
    State(pool): State<Pool>,
    ValidatedJson(payload): ValidatedJson<NewCategory>,
) -> Result<Json<Category>, (StatusCode, String)> {
    use stone_shop::schema::categories;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = diesel::insert_into(categories::table)
        .values(&payload)
        .returning(Category::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => conflict("category name already exists"),
            other => internal_error(other),
        })?;

    Ok(Json(res))
}

pub async fn get_categories(
    State(pool): State<Pool>,
) -> Result<Json<Vec<Category>>, (StatusCode, String)> {
    use stone_shop::schema::categories;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = categories::table
        .order(categories::category_id.asc())
        .select(Category::as_select())
        .load(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(res))
}

pub async fn get_category_by_id(
    State(pool): State<Pool>,
    Path(id): Path<i32>,
) -> Result<Json<Category>, (StatusCode, String)> {
    use stone_shop::schema::categories;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = categories::table
        .find(id)
        .select(Category::as_select())
        .get_result(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(res))
}

pub async fn update_category(
    State(pool): State<Pool>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<NewCategory>,
) -> Result<Json<Category>, (StatusCode, String)> {
    use stone_shop::schema::categories;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = diesel::update(categories::table.find(id))
        .set(categories::name.eq(&payload.name))
        .returning(Category::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => conflict("category name already exists"),
            other => internal_error(other),
        })?;

    Ok(Json(res))
}

/// Deletion is guarded at the application level: a category that still has
/// products cannot be removed, and both sides stay untouched.
pub async fn remove_category(
    State(pool): State<Pool>,
    Path(id): Path<i32>,
) -> Result<Json<Category>, (StatusCode, String)> {
    use stone_shop::schema::{categories, products};

    let mut conn = pool.get().await.map_err(internal_error)?;

    let product_count: i64 = products::table
        .filter(products::category_id.eq(id))
        .count()
        .get_result(&mut conn)
        .await
        .map_err(internal_error)?;

    if product_count > 0 {
        return Err(conflict("category cannot be deleted while products reference it"));
    }

    let res = diesel::delete(categories::table.find(id))
        .returning(Category::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(res))
}

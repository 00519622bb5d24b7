use super::models::{Customer, NewCustomer};
use crate::utils::error::{conflict, internal_error};
use crate::utils::extract::ValidatedJson;
use crate::utils::types::Pool;
use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

pub async fn get_customers(
    State(pool): State<Pool>,
) -> Result<Json<Vec<Customer>>, (StatusCode, String)> {
    use stone_shop::schema::customers;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = customers::table
        .order((customers::first_name.asc(), customers::last_name.asc()))
        .select(Customer::as_select())
        .load(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(res))
}

pub async fn create_customer(
    State(pool): State<Pool>,
    ValidatedJson(payload): ValidatedJson<NewCustomer>,
) -> Result<Json<Customer>, (StatusCode, String)> {
    use stone_shop::schema::customers;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = diesel::insert_into(customers::table)
        .values(&payload)
        .returning(Customer::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => conflict("customer email already registered"),
            other => internal_error(other),
        })?;

    Ok(Json(res))
}

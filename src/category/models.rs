use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use stone_shop::schema::categories;
use validator::Validate;

#[derive(Queryable, Selectable, Debug, PartialEq, Identifiable, Serialize)]
#[diesel(table_name=categories)]
#[diesel(primary_key(category_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Category {
    pub category_id: i32,
    pub name: String,
}

#[derive(Insertable, Deserialize, Validate)]
#[diesel(table_name = categories)]
pub struct NewCategory {
    #[validate(length(min = 3, max = 100))]
    pub name: String,
}

use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use uuid::Uuid;

use crate::db::schema::foods;
use savora_api::FoodResponse;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = foods)]
pub struct NewFood {
    pub enterprise_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub image_url: Option<String>,
    pub available: bool,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = foods)]
pub struct Food {
    pub id: Uuid,
    pub enterprise_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub image_url: Option<String>,
    pub available: bool,
    #[allow(dead_code)]
    pub created_at: DateTime<Utc>,
}

impl From<Food> for FoodResponse {
    fn from(food: Food) -> Self {
        FoodResponse {
            id: food.id,
            enterprise_id: food.enterprise_id,
            name: food.name,
            description: food.description,
            price_cents: food.price_cents,
            image_url: food.image_url,
            available: food.available,
        }
    }
}

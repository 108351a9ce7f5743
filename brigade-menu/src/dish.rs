use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sellable dish. Prices are integer minor units. The price on the dish is
/// the *current* menu price; orders capture their own copy at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub available: bool,
    pub popularity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An add-on attached to a dish (extra cheese, large size, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishOption {
    pub id: Uuid,
    pub dish_id: Uuid,
    pub name: String,
    pub extra_price_cents: i64,
    pub available: bool,
}

/// Read shape for dish listings: the dish with its options embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishWithOptions {
    #[serde(flatten)]
    pub dish: Dish,
    pub options: Vec<DishOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDish {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub options: Vec<NewDishOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDishOption {
    pub name: String,
    #[serde(default)]
    pub extra_price_cents: i64,
    #[serde(default = "default_available")]
    pub available: bool,
}

/// Partial update; absent fields are left untouched. When `options` is
/// present it replaces the dish's option set wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DishUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
    pub options: Option<Vec<NewDishOption>>,
}

fn default_available() -> bool {
    true
}

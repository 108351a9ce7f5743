use std::collections::HashMap;
use std::sync::Arc;

use brigade_menu::{
    cache_keys, Category, CategoryUpdate, Dish, DishOption, DishUpdate, DishWithOptions,
    NewCategory, NewDish, NewDishOption,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::redis_repo::RedisClient;

/// Menu reads and writes. Listings go through the cache; every write
/// invalidates the whole `menu:*` keyspace before returning, so the next
/// read repopulates from Postgres.
pub struct MenuRepository {
    pool: PgPool,
    cache: Arc<RedisClient>,
    menu_ttl_seconds: u64,
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    display_order: i32,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            display_order: row.display_order,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct DishRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price_cents: i64,
    category_id: Option<Uuid>,
    image_url: Option<String>,
    available: bool,
    popularity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DishRow> for Dish {
    fn from(row: DishRow) -> Self {
        Dish {
            id: row.id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            category_id: row.category_id,
            image_url: row.image_url,
            available: row.available,
            popularity: row.popularity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DishOptionRow {
    id: Uuid,
    dish_id: Uuid,
    name: String,
    extra_price_cents: i64,
    available: bool,
}

impl From<DishOptionRow> for DishOption {
    fn from(row: DishOptionRow) -> Self {
        DishOption {
            id: row.id,
            dish_id: row.dish_id,
            name: row.name,
            extra_price_cents: row.extra_price_cents,
            available: row.available,
        }
    }
}

const CATEGORY_COLUMNS: &str = "id, name, description, display_order, active, created_at, updated_at";
const DISH_COLUMNS: &str =
    "id, name, description, price_cents, category_id, image_url, available, popularity, created_at, updated_at";
const OPTION_COLUMNS: &str = "id, dish_id, name, extra_price_cents, available";

impl MenuRepository {
    pub fn new(pool: PgPool, cache: Arc<RedisClient>, menu_ttl_seconds: u64) -> Self {
        Self {
            pool,
            cache,
            menu_ttl_seconds,
        }
    }

    // ========================================================================
    // Categories
    // ========================================================================

    /// Category listing, cache-aside.
    pub async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let key = cache_keys::categories();
        if let Some(cached) = self.cache_read(&key).await {
            if let Ok(categories) = serde_json::from_str::<Vec<Category>>(&cached) {
                debug!("Menu cache hit: {}", key);
                return Ok(categories);
            }
        }

        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY display_order ASC, name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let categories: Vec<Category> = rows.into_iter().map(Category::from).collect();
        self.cache_write(&key, &categories).await;
        Ok(categories)
    }

    /// New categories are appended after the current highest display order.
    pub async fn create_category(&self, new: &NewCategory) -> Result<Category, StoreError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO categories (name, description, display_order, active)
             VALUES ($1, $2, (SELECT COALESCE(MAX(display_order), 0) + 1 FROM categories), $3)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.active)
        .fetch_one(&self.pool)
        .await?;

        self.invalidate_menu().await;
        Ok(row.into())
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        update: &CategoryUpdate,
    ) -> Result<Category, StoreError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE categories
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 display_order = COALESCE($4, display_order),
                 active = COALESCE($5, active),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.display_order)
        .bind(update.active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Category"))?;

        self.invalidate_menu().await;
        Ok(row.into())
    }

    /// Dishes in a deleted category are kept and detached (FK sets their
    /// category to NULL).
    pub async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Category"));
        }

        self.invalidate_menu().await;
        Ok(())
    }

    // ========================================================================
    // Dishes
    // ========================================================================

    /// Dish listing with optional category/availability filters, cache-aside.
    /// Each filter combination gets its own cache key.
    pub async fn list_dishes(
        &self,
        category_id: Option<Uuid>,
        available: Option<bool>,
    ) -> Result<Vec<DishWithOptions>, StoreError> {
        let key = cache_keys::dishes(category_id, available);
        if let Some(cached) = self.cache_read(&key).await {
            if let Ok(dishes) = serde_json::from_str::<Vec<DishWithOptions>>(&cached) {
                debug!("Menu cache hit: {}", key);
                return Ok(dishes);
            }
        }

        let rows = sqlx::query_as::<_, DishRow>(&format!(
            "SELECT {DISH_COLUMNS} FROM dishes
             WHERE ($1::UUID IS NULL OR category_id = $1)
               AND ($2::BOOLEAN IS NULL OR available = $2)
             ORDER BY name ASC"
        ))
        .bind(category_id)
        .bind(available)
        .fetch_all(&self.pool)
        .await?;

        let dish_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let option_rows = sqlx::query_as::<_, DishOptionRow>(&format!(
            "SELECT {OPTION_COLUMNS} FROM dish_options WHERE dish_id = ANY($1) ORDER BY name ASC"
        ))
        .bind(&dish_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut options_by_dish: HashMap<Uuid, Vec<DishOption>> = HashMap::new();
        for row in option_rows {
            options_by_dish
                .entry(row.dish_id)
                .or_default()
                .push(row.into());
        }

        let dishes: Vec<DishWithOptions> = rows
            .into_iter()
            .map(|row| {
                let options = options_by_dish.remove(&row.id).unwrap_or_default();
                DishWithOptions {
                    dish: row.into(),
                    options,
                }
            })
            .collect();

        self.cache_write(&key, &dishes).await;
        Ok(dishes)
    }

    /// Uncached dish lookup by ids; order creation prices carts against this.
    pub async fn dishes_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Dish>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, DishRow>(&format!(
            "SELECT {DISH_COLUMNS} FROM dishes WHERE id = ANY($1)"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| (row.id, row.into())).collect())
    }

    pub async fn create_dish(&self, new: &NewDish) -> Result<DishWithOptions, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, DishRow>(&format!(
            "INSERT INTO dishes (name, description, price_cents, category_id, image_url, available)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {DISH_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price_cents)
        .bind(new.category_id)
        .bind(&new.image_url)
        .bind(new.available)
        .fetch_one(&mut *tx)
        .await?;

        let mut options = Vec::with_capacity(new.options.len());
        for option in &new.options {
            options.push(insert_option(&mut tx, row.id, option).await?);
        }

        tx.commit().await?;
        self.invalidate_menu().await;

        Ok(DishWithOptions {
            dish: row.into(),
            options,
        })
    }

    /// Partial dish update. A present `options` list replaces the dish's
    /// option set wholesale.
    pub async fn update_dish(
        &self,
        id: Uuid,
        update: &DishUpdate,
    ) -> Result<DishWithOptions, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, DishRow>(&format!(
            "UPDATE dishes
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 price_cents = COALESCE($4, price_cents),
                 category_id = COALESCE($5, category_id),
                 image_url = COALESCE($6, image_url),
                 available = COALESCE($7, available),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {DISH_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.price_cents)
        .bind(update.category_id)
        .bind(&update.image_url)
        .bind(update.available)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound("Dish"))?;

        if let Some(new_options) = &update.options {
            sqlx::query("DELETE FROM dish_options WHERE dish_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for option in new_options {
                insert_option(&mut tx, id, option).await?;
            }
        }

        let option_rows = sqlx::query_as::<_, DishOptionRow>(&format!(
            "SELECT {OPTION_COLUMNS} FROM dish_options WHERE dish_id = $1 ORDER BY name ASC"
        ))
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        self.invalidate_menu().await;

        Ok(DishWithOptions {
            dish: row.into(),
            options: option_rows.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn delete_dish(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM dishes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Dish"));
        }

        self.invalidate_menu().await;
        Ok(())
    }

    // ========================================================================
    // Cache plumbing (fail-open: Redis being down never blocks the menu)
    // ========================================================================

    async fn cache_read(&self, key: &str) -> Option<String> {
        match self.cache.cache_get(key).await {
            Ok(found) => found,
            Err(e) => {
                debug!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn cache_write<T: serde::Serialize>(&self, key: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(_) => return,
        };
        if let Err(e) = self
            .cache
            .cache_set(key, &payload, self.menu_ttl_seconds)
            .await
        {
            debug!("Cache write failed for {}: {}", key, e);
        }
    }

    async fn invalidate_menu(&self) {
        if let Err(e) = self.cache.delete_matching(cache_keys::MENU_PATTERN).await {
            warn!("Menu cache invalidation failed: {}", e);
        }
    }
}

async fn insert_option(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    dish_id: Uuid,
    option: &NewDishOption,
) -> Result<DishOption, StoreError> {
    let row = sqlx::query_as::<_, DishOptionRow>(&format!(
        "INSERT INTO dish_options (dish_id, name, extra_price_cents, available)
         VALUES ($1, $2, $3, $4)
         RETURNING {OPTION_COLUMNS}"
    ))
    .bind(dish_id)
    .bind(&option.name)
    .bind(option.extra_price_cents)
    .bind(option.available)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row.into())
}

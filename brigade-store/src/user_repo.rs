use brigade_core::{NewUser, Role, User};
use brigade_menu::Dish;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::menu_repo::DishRow;

pub struct UserRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    last_name: String,
    first_name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, StoreError> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| StoreError::Decode(format!("user role '{}'", self.role)))?;

        Ok(User {
            id: self.id,
            last_name: self.last_name,
            first_name: self.first_name,
            email: self.email,
            password_hash: self.password_hash.into(),
            phone: self.phone,
            role,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, last_name, first_name, email, password_hash, phone, role, active, created_at, updated_at";

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (last_name, first_name, email, password_hash, phone, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.last_name)
        .bind(&new_user.first_name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.phone)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.into_user()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    pub async fn get(&self, user_id: Uuid) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("User"))?;

        row.into_user()
    }

    /// Partial profile update; absent fields keep their stored value.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        last_name: Option<&str>,
        first_name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users
             SET last_name = COALESCE($2, last_name),
                 first_name = COALESCE($3, first_name),
                 phone = COALESCE($4, phone),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(last_name)
        .bind(first_name)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("User"))?;

        row.into_user()
    }

    pub async fn update_password(&self, user_id: Uuid, new_hash: &str) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(user_id)
                .bind(new_hash)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("User"));
        }
        Ok(())
    }

    pub async fn list_employees(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE role = 'employee'
             ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    /// Toggle an employee account. Admin accounts never match the update;
    /// they cannot be deactivated through this path.
    pub async fn set_active(&self, user_id: Uuid, active: bool) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET active = $2, updated_at = NOW()
             WHERE id = $1 AND role = 'employee'
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Employee"))?;

        row.into_user()
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    pub async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<Dish>, StoreError> {
        let rows = sqlx::query_as::<_, DishRow>(
            "SELECT d.id, d.name, d.description, d.price_cents, d.category_id, d.image_url,
                    d.available, d.popularity, d.created_at, d.updated_at
             FROM favorites f
             JOIN dishes d ON d.id = f.dish_id
             WHERE f.user_id = $1
             ORDER BY f.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Dish::from).collect())
    }

    /// Returns `false` when the dish was already in the user's favorites.
    pub async fn add_favorite(&self, user_id: Uuid, dish_id: Uuid) -> Result<bool, StoreError> {
        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM dishes WHERE id = $1")
            .bind(dish_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound("Dish"));
        }

        let result = sqlx::query(
            "INSERT INTO favorites (user_id, dish_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, dish_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(dish_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Removing an absent favorite is not an error.
    pub async fn remove_favorite(&self, user_id: Uuid, dish_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND dish_id = $2")
            .bind(user_id)
            .bind(dish_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> UserRow {
        let now = Utc::now();
        UserRow {
            id: Uuid::new_v4(),
            last_name: "Okonkwo".to_string(),
            first_name: "Nadia".to_string(),
            email: "nadia@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            phone: None,
            role: role.to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn user_rows_decode_roles() {
        let user = row("employee").into_user().unwrap();
        assert_eq!(user.role, Role::Employee);
        assert!(user.active);
    }

    #[test]
    fn unknown_roles_surface_as_decode_errors() {
        assert!(matches!(
            row("superuser").into_user(),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn debug_output_never_contains_the_password_hash() {
        let user = row("client").into_user().unwrap();
        let dump = format!("{:?}", user);
        assert!(!dump.contains("argon2id"));
        assert!(dump.contains("********"));
    }
}

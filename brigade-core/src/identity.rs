use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::pii::Masked;

/// Role carried by every authenticated principal. Each operation declares the
/// role set it accepts; there is no permission inheritance between roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "client" => Some(Role::Client),
            "admin" => Some(Role::Admin),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }

    /// Staff roles may operate the kitchen and cash endpoints.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Employee)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account row. Deliberately not `Serialize`: API responses go through
/// [`UserProfile`] so the password hash can never leak into a payload.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub password_hash: Masked<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role,
            active: self.active,
            created_at: self.created_at,
        }
    }
}

/// Payload for inserting a new account. The password arrives already
/// hashed; raw passwords never reach the store layer.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// The sanitized view of a user returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_db_strings() {
        for role in [Role::Client, Role::Admin, Role::Employee] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn staff_check_covers_admin_and_employee() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Employee.is_staff());
        assert!(!Role::Client.is_staff());
    }
}

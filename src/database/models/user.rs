use serde::Serialize;
use uuid::Uuid;

use crate::types::Role;

/// Stored account, including the password hash. Never serialized directly.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

impl User {
    pub fn output(&self) -> UserOutput {
        UserOutput {
            id: self.id,
            user_name: self.user_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public projection of a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOutput {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
}

/// Insert payload. The caller decides the role; handlers always pass `Role::User`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Allow-listed user mutation. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.user_name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }

    pub fn apply_to(self, user: &mut User) {
        if let Some(user_name) = self.user_name {
            user.user_name = user_name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}

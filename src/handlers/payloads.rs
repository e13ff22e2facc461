// handlers/payloads.rs - Request bodies accepted by the user and cat handlers
//
// Each body is an explicit allow-list. Fields not named here (`owner`, `_id`,
// and `role` outside the admin path) are dropped by serde and can never reach
// a store mutation.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::auth::PasswordHasher;
use crate::database::models::{CatChanges, UserChanges};
use crate::error::ApiError;
use crate::geo::Point;
use crate::types::Role;
use crate::validation::{
    deserialize_email, deserialize_optional_email, Validator, USER_NAME_MIN_LENGTH,
};

pub const NO_FIELDS_TO_UPDATE: &str = "No fields to update";

/// POST /users
#[derive(Debug, Default, Deserialize)]
pub struct RegisterUser {
    #[serde(default)]
    pub user_name: String,
    #[serde(default, deserialize_with = "deserialize_email")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterUser {
    pub fn validate(&self, password_min: usize) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.min_length("user_name", &self.user_name, USER_NAME_MIN_LENGTH);
        v.email("email", &self.email);
        v.min_length("password", &self.password, password_min);
        v.finish()
    }
}

/// PUT /users (self)
#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    pub user_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_email")]
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.user_name.is_none() && self.email.is_none() && self.password.is_none()
    }

    fn check(&self, v: &mut Validator, password_min: usize) {
        if let Some(user_name) = &self.user_name {
            v.min_length("user_name", user_name, USER_NAME_MIN_LENGTH);
        }
        if let Some(email) = &self.email {
            v.email("email", email);
        }
        if let Some(password) = &self.password {
            v.min_length("password", password, password_min);
        }
    }

    /// Validates, then hashes any new password. Rejects a patch that changes nothing.
    pub async fn into_changes(
        self,
        password_min: usize,
        passwords: &Arc<PasswordHasher>,
    ) -> Result<UserChanges, ApiError> {
        if self.is_empty() {
            return Err(ApiError::bad_request(NO_FIELDS_TO_UPDATE));
        }
        let mut v = Validator::new();
        self.check(&mut v, password_min);
        v.finish()?;

        let password_hash = match self.password {
            Some(password) => Some(passwords.clone().hash_blocking(password).await?),
            None => None,
        };
        Ok(UserChanges {
            user_name: self.user_name,
            email: self.email,
            password_hash,
            role: None,
        })
    }
}

/// PUT /users/:id (admin). The only body that may carry `role`.
#[derive(Debug, Default, Deserialize)]
pub struct AdminUserPatch {
    #[serde(flatten)]
    pub user: UserPatch,
    pub role: Option<Role>,
}

impl AdminUserPatch {
    pub async fn into_changes(
        self,
        password_min: usize,
        passwords: &Arc<PasswordHasher>,
    ) -> Result<UserChanges, ApiError> {
        match self.role {
            None => self.user.into_changes(password_min, passwords).await,
            Some(role) if self.user.is_empty() => Ok(UserChanges {
                role: Some(role),
                ..Default::default()
            }),
            Some(role) => {
                let mut changes = self.user.into_changes(password_min, passwords).await?;
                changes.role = Some(role);
                Ok(changes)
            }
        }
    }
}

/// PUT /cats/:id and /cats/admin/:id
#[derive(Debug, Default, Deserialize)]
pub struct CatPatch {
    pub cat_name: Option<String>,
    pub weight: Option<Value>,
    pub birthdate: Option<String>,
    pub filename: Option<String>,
    pub location: Option<Point>,
}

impl CatPatch {
    pub fn into_changes(self) -> Result<CatChanges, ApiError> {
        let mut v = Validator::new();
        if let Some(cat_name) = &self.cat_name {
            v.non_empty("cat_name", cat_name);
        }
        let weight = self.weight.as_ref().and_then(|w| v.number("weight", w));
        let birthdate = self.birthdate.as_deref().and_then(|d| v.date("birthdate", d));
        if let Some(location) = &self.location {
            if let Err(e) = location.coordinates() {
                v.reject("location", e.to_string());
            }
        }
        v.finish()?;

        let changes = CatChanges {
            cat_name: self.cat_name,
            weight,
            birthdate,
            filename: self.filename,
            location: self.location,
        };
        if changes.is_empty() {
            return Err(ApiError::bad_request(NO_FIELDS_TO_UPDATE));
        }
        Ok(changes)
    }
}

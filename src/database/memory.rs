//! In-memory implementation of the user and cat stores.
//!
//! Records live in insertion-ordered vectors behind a single `tokio::sync::RwLock`;
//! lists come back oldest first, matching the `created_at` order of Postgres.
//! Every mutation runs inside one write-locked section, which gives it the
//! same all-or-nothing behaviour a single SQL statement has in the Postgres
//! backend. Nothing is durable; this backend serves tests and local development.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    Cat, CatChanges, CatOutput, NewCat, NewUser, OwnerRef, OwnerSummary, User, UserChanges,
};
use super::{
    CatStore, OwnerScope, Store, StoreError, StoreResult, UserStore, CAT_NOT_FOUND,
    USER_NOT_FOUND,
};
use crate::config::StoreBackend;
use crate::geo::BoundingBox;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    cats: Vec<Cat>,
}

impl Inner {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Uniqueness of name and email, ignoring the record being updated.
    fn check_unique(
        &self,
        user_name: Option<&str>,
        email: Option<&str>,
        except: Option<Uuid>,
    ) -> StoreResult<()> {
        let clash = self.users.iter().filter(|u| Some(u.id) != except).find(|u| {
            user_name.is_some_and(|n| n == u.user_name)
                || email.is_some_and(|e| e.to_lowercase() == u.email.to_lowercase())
        });
        match clash {
            Some(_) => Err(StoreError::Conflict(
                "User name or email already in use".to_string(),
            )),
            None => Ok(()),
        }
    }

    fn resolve(&self, cat: &Cat) -> StoreResult<CatOutput> {
        let owner = self.user(cat.owner.0).ok_or_else(|| {
            StoreError::Unexpected(anyhow::anyhow!("cat {} references missing owner", cat.id))
        })?;
        Ok(cat.output(OwnerSummary {
            id: owner.id,
            user_name: owner.user_name.clone(),
        }))
    }

    fn resolve_all<'a>(&self, cats: impl Iterator<Item = &'a Cat>) -> StoreResult<Vec<CatOutput>> {
        cats.map(|cat| self.resolve(cat)).collect()
    }

    fn scoped_cat_index(&self, id: Uuid, scope: OwnerScope) -> StoreResult<usize> {
        self.cats
            .iter()
            .position(|c| c.id == id && scope.permits(c.owner))
            .ok_or_else(|| StoreError::NotFound(CAT_NOT_FOUND.to_string()))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<User> {
        self.inner
            .read()
            .await
            .user(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(USER_NOT_FOUND.to_string()))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        let email = email.to_lowercase();
        Ok(inner
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        inner.check_unique(Some(user.user_name.as_str()), Some(user.email.as_str()), None)?;

        let user = User {
            id: Uuid::new_v4(),
            user_name: user.user_name,
            email: user.email,
            role: user.role,
            password_hash: user.password_hash,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        let index = inner
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| StoreError::NotFound(USER_NOT_FOUND.to_string()))?;
        inner.check_unique(changes.user_name.as_deref(), changes.email.as_deref(), Some(id))?;

        let user = &mut inner.users[index];
        changes.apply_to(user);
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        let index = inner
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| StoreError::NotFound(USER_NOT_FOUND.to_string()))?;

        let user = inner.users.remove(index);
        inner.cats.retain(|c| c.owner.0 != id);
        Ok(user)
    }
}

#[async_trait]
impl CatStore for MemoryStore {
    async fn list_cats(&self) -> StoreResult<Vec<CatOutput>> {
        let inner = self.inner.read().await;
        inner.resolve_all(inner.cats.iter())
    }

    async fn list_cats_by_owner(&self, owner: OwnerRef) -> StoreResult<Vec<CatOutput>> {
        let inner = self.inner.read().await;
        inner.resolve_all(inner.cats.iter().filter(|c| c.owner == owner))
    }

    async fn list_cats_in_box(&self, bbox: &BoundingBox) -> StoreResult<Vec<CatOutput>> {
        let inner = self.inner.read().await;
        inner.resolve_all(inner.cats.iter().filter(|c| bbox.contains(&c.location)))
    }

    async fn get_cat(&self, id: Uuid) -> StoreResult<CatOutput> {
        let inner = self.inner.read().await;
        let cat = inner
            .cats
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(CAT_NOT_FOUND.to_string()))?;
        inner.resolve(cat)
    }

    async fn create_cat(&self, cat: NewCat) -> StoreResult<CatOutput> {
        let mut inner = self.inner.write().await;
        if inner.user(cat.owner.0).is_none() {
            return Err(StoreError::NothingChanged("No cats added".to_string()));
        }

        let cat = Cat {
            id: Uuid::new_v4(),
            cat_name: cat.cat_name,
            weight: cat.weight,
            birthdate: cat.birthdate,
            filename: cat.filename,
            owner: cat.owner,
            location: cat.location,
        };
        let output = inner.resolve(&cat)?;
        inner.cats.push(cat);
        Ok(output)
    }

    async fn update_cat(
        &self,
        id: Uuid,
        scope: OwnerScope,
        changes: CatChanges,
    ) -> StoreResult<CatOutput> {
        let mut inner = self.inner.write().await;
        let index = inner.scoped_cat_index(id, scope)?;
        changes.apply_to(&mut inner.cats[index]);
        inner.resolve(&inner.cats[index])
    }

    async fn delete_cat(&self, id: Uuid, scope: OwnerScope) -> StoreResult<CatOutput> {
        let mut inner = self.inner.write().await;
        let index = inner.scoped_cat_index(id, scope)?;
        let output = inner.resolve(&inner.cats[index])?;
        inner.cats.remove(index);
        Ok(output)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Memory
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

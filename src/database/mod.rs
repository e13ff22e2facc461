pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::geo::BoundingBox;
use models::{CatChanges, CatOutput, NewCat, NewUser, OwnerRef, User, UserChanges};

pub use manager::{DatabaseError, DatabaseManager};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// A write completed without affecting anything, for a reason other than absence.
    #[error("{0}")]
    NothingChanged(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(DatabaseError::Sqlx(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Ownership criterion folded into a cat mutation.
///
/// `Owner(id)` narrows the statement to rows owned by `id`, so a mismatch
/// reads as "not found" rather than "forbidden".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    Any,
    Owner(Uuid),
}

impl OwnerScope {
    pub fn permits(&self, owner: OwnerRef) -> bool {
        match self {
            OwnerScope::Any => true,
            OwnerScope::Owner(id) => owner.0 == *id,
        }
    }

    /// Owner id to bind in SQL, `None` meaning unrestricted.
    pub fn owner_id(&self) -> Option<Uuid> {
        match self {
            OwnerScope::Any => None,
            OwnerScope::Owner(id) => Some(*id),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn get_user(&self, id: Uuid) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<User>;
    /// Removes the user and every cat they own.
    async fn delete_user(&self, id: Uuid) -> StoreResult<User>;
}

#[async_trait]
pub trait CatStore: Send + Sync {
    async fn list_cats(&self) -> StoreResult<Vec<CatOutput>>;
    async fn list_cats_by_owner(&self, owner: OwnerRef) -> StoreResult<Vec<CatOutput>>;
    async fn list_cats_in_box(&self, bbox: &BoundingBox) -> StoreResult<Vec<CatOutput>>;
    async fn get_cat(&self, id: Uuid) -> StoreResult<CatOutput>;
    async fn create_cat(&self, cat: NewCat) -> StoreResult<CatOutput>;
    async fn update_cat(
        &self,
        id: Uuid,
        scope: OwnerScope,
        changes: CatChanges,
    ) -> StoreResult<CatOutput>;
    async fn delete_cat(&self, id: Uuid, scope: OwnerScope) -> StoreResult<CatOutput>;
}

#[async_trait]
pub trait Store: UserStore + CatStore {
    fn backend(&self) -> StoreBackend;
    async fn health_check(&self) -> StoreResult<()>;
}

pub const USER_NOT_FOUND: &str = "User not found";
pub const CAT_NOT_FOUND: &str = "Cat not found";

/// Opens the configured backend, creating the relational schema when needed.
pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn Store>, DatabaseError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(memory::MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(config).await?;
            DatabaseManager::bootstrap(&pool).await?;
            Ok(Arc::new(postgres::PgStore::new(pool)))
        }
    }
}

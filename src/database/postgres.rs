//! Postgres-backed implementation of the user and cat stores.
//!
//! Every operation is a single statement. Partial updates use
//! `COALESCE($n, column)` so one static query serves any subset of fields,
//! and ownership scoping is part of the `WHERE` clause
//! (`$n::uuid IS NULL OR owner = $n`). Mutations that also need the owner's
//! name run as a data-modifying CTE joined back to `users`. Lists are ordered
//! by `created_at`, oldest first.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::models::{
    CatChanges, CatOutput, NewCat, NewUser, OwnerRef, OwnerSummary, User, UserChanges,
};
use super::{
    CatStore, DatabaseManager, OwnerScope, Store, StoreError, StoreResult, UserStore,
    CAT_NOT_FOUND, USER_NOT_FOUND,
};
use crate::config::StoreBackend;
use crate::geo::{BoundingBox, Coordinates, Point};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    user_name: String,
    email: String,
    role: String,
    password: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e: String| StoreError::Unexpected(anyhow::anyhow!(e)))?;
        Ok(User {
            id: row.id,
            user_name: row.user_name,
            email: row.email,
            role,
            password_hash: row.password,
        })
    }
}

#[derive(FromRow)]
struct CatRow {
    id: Uuid,
    cat_name: String,
    weight: f64,
    birthdate: NaiveDate,
    filename: String,
    lat: f64,
    lng: f64,
    owner_id: Uuid,
    owner_name: String,
}

impl From<CatRow> for CatOutput {
    fn from(row: CatRow) -> Self {
        CatOutput {
            id: row.id,
            cat_name: row.cat_name,
            weight: row.weight,
            birthdate: row.birthdate,
            filename: row.filename,
            location: Point::from(Coordinates {
                lat: row.lat,
                lng: row.lng,
            }),
            owner: OwnerSummary {
                id: row.owner_id,
                user_name: row.owner_name,
            },
        }
    }
}

const USER_COLUMNS: &str = "id, user_name, email, role, password";

const CAT_ORDER: &str = "ORDER BY c.created_at, c.id";

/// Projection over a relation aliased `c` joined to `users u`.
const CAT_SELECT: &str = r#"
    SELECT c.id, c.cat_name, c.weight, c.birthdate, c.filename, c.lat, c.lng,
           u.id AS owner_id, u.user_name AS owner_name
"#;

fn map_unique(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Conflict("User name or email already in use".to_string())
        }
        _ => err.into(),
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_cats(&self, sql: &str, binds: CatFilter) -> StoreResult<Vec<CatOutput>> {
        let query = sqlx::query_as::<_, CatRow>(sql);
        let query = match binds {
            CatFilter::All => query,
            CatFilter::Owner(owner) => query.bind(owner),
            CatFilter::Box([[min_lng, min_lat], [max_lng, max_lat]]) => query
                .bind(min_lng)
                .bind(max_lng)
                .bind(min_lat)
                .bind(max_lat),
        };
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(CatOutput::from).collect())
    }
}

enum CatFilter {
    All,
    Owner(Uuid),
    Box([[f64; 2]; 2]),
}

#[async_trait]
impl UserStore for PgStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at, id", USER_COLUMNS);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(USER_NOT_FOUND.to_string()))?
            .try_into()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE lower(email) = lower($1)", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, user_name, email, role, password)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.user_name)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(&user.password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique)?
            .ok_or_else(|| StoreError::NothingChanged("No user added".to_string()))?
            .try_into()
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<User> {
        let sql = format!(
            "UPDATE users SET
                user_name = COALESCE($2, user_name),
                email = COALESCE($3, email),
                password = COALESCE($4, password),
                role = COALESCE($5, role)
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(changes.user_name)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.role.map(|r| r.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique)?
            .ok_or_else(|| StoreError::NotFound(USER_NOT_FOUND.to_string()))?
            .try_into()
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<User> {
        let sql = format!("DELETE FROM users WHERE id = $1 RETURNING {}", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(USER_NOT_FOUND.to_string()))?
            .try_into()
    }
}

#[async_trait]
impl CatStore for PgStore {
    async fn list_cats(&self) -> StoreResult<Vec<CatOutput>> {
        let sql = format!(
            "{} FROM cats c JOIN users u ON c.owner = u.id {}",
            CAT_SELECT, CAT_ORDER
        );
        self.fetch_cats(&sql, CatFilter::All).await
    }

    async fn list_cats_by_owner(&self, owner: OwnerRef) -> StoreResult<Vec<CatOutput>> {
        let sql = format!(
            "{} FROM cats c JOIN users u ON c.owner = u.id WHERE c.owner = $1 {}",
            CAT_SELECT, CAT_ORDER
        );
        self.fetch_cats(&sql, CatFilter::Owner(owner.0)).await
    }

    async fn list_cats_in_box(&self, bbox: &BoundingBox) -> StoreResult<Vec<CatOutput>> {
        let sql = format!(
            "{} FROM cats c JOIN users u ON c.owner = u.id
             WHERE c.lng BETWEEN $1 AND $2 AND c.lat BETWEEN $3 AND $4 {}",
            CAT_SELECT, CAT_ORDER
        );
        self.fetch_cats(&sql, CatFilter::Box(bbox.as_box())).await
    }

    async fn get_cat(&self, id: Uuid) -> StoreResult<CatOutput> {
        let sql = format!(
            "{} FROM cats c JOIN users u ON c.owner = u.id WHERE c.id = $1",
            CAT_SELECT
        );
        sqlx::query_as::<_, CatRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(CatOutput::from)
            .ok_or_else(|| StoreError::NotFound(CAT_NOT_FOUND.to_string()))
    }

    async fn create_cat(&self, cat: NewCat) -> StoreResult<CatOutput> {
        // Selecting from users makes an unknown owner insert zero rows
        let sql = format!(
            "WITH c AS (
                INSERT INTO cats (id, cat_name, weight, birthdate, filename, owner, lat, lng)
                SELECT $1, $2, $3, $4, $5, id, $7, $8 FROM users WHERE id = $6
                RETURNING *
             )
             {} FROM c JOIN users u ON c.owner = u.id",
            CAT_SELECT
        );
        sqlx::query_as::<_, CatRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&cat.cat_name)
            .bind(cat.weight)
            .bind(cat.birthdate)
            .bind(&cat.filename)
            .bind(cat.owner.0)
            .bind(cat.location.lat())
            .bind(cat.location.lng())
            .fetch_optional(&self.pool)
            .await?
            .map(CatOutput::from)
            .ok_or_else(|| StoreError::NothingChanged("No cats added".to_string()))
    }

    async fn update_cat(
        &self,
        id: Uuid,
        scope: OwnerScope,
        changes: CatChanges,
    ) -> StoreResult<CatOutput> {
        let sql = format!(
            "WITH c AS (
                UPDATE cats SET
                    cat_name = COALESCE($3, cat_name),
                    weight = COALESCE($4, weight),
                    birthdate = COALESCE($5, birthdate),
                    filename = COALESCE($6, filename),
                    lat = COALESCE($7, lat),
                    lng = COALESCE($8, lng)
                WHERE id = $1 AND ($2::uuid IS NULL OR owner = $2)
                RETURNING *
             )
             {} FROM c JOIN users u ON c.owner = u.id",
            CAT_SELECT
        );
        sqlx::query_as::<_, CatRow>(&sql)
            .bind(id)
            .bind(scope.owner_id())
            .bind(changes.cat_name)
            .bind(changes.weight)
            .bind(changes.birthdate)
            .bind(changes.filename)
            .bind(changes.location.map(|p| p.lat()))
            .bind(changes.location.map(|p| p.lng()))
            .fetch_optional(&self.pool)
            .await?
            .map(CatOutput::from)
            .ok_or_else(|| StoreError::NotFound(CAT_NOT_FOUND.to_string()))
    }

    async fn delete_cat(&self, id: Uuid, scope: OwnerScope) -> StoreResult<CatOutput> {
        let sql = format!(
            "WITH c AS (
                DELETE FROM cats
                WHERE id = $1 AND ($2::uuid IS NULL OR owner = $2)
                RETURNING *
             )
             {} FROM c JOIN users u ON c.owner = u.id",
            CAT_SELECT
        );
        sqlx::query_as::<_, CatRow>(&sql)
            .bind(id)
            .bind(scope.owner_id())
            .fetch_optional(&self.pool)
            .await?
            .map(CatOutput::from)
            .ok_or_else(|| StoreError::NotFound(CAT_NOT_FOUND.to_string()))
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Postgres
    }

    async fn health_check(&self) -> StoreResult<()> {
        DatabaseManager::health_check(&self.pool).await?;
        Ok(())
    }
}

//! Postgres store against a live database. Runs when `SSSF_TEST_DATABASE_URL`
//! or `DATABASE_URL` points at a reachable server and skips otherwise.
//! Every test works on its own uniquely named rows, so they can share a database.

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::OnceCell;
use uuid::Uuid;

use sssf_api_rust::config::{DatabaseConfig, StoreBackend};
use sssf_api_rust::database::models::{CatChanges, NewCat, NewUser, OwnerRef, User, UserChanges};
use sssf_api_rust::database::postgres::PgStore;
use sssf_api_rust::database::{CatStore, DatabaseManager, OwnerScope, StoreError, UserStore};
use sssf_api_rust::geo::{BoundingBox, Coordinates, Point};
use sssf_api_rust::types::Role;

static SCHEMA: OnceCell<()> = OnceCell::const_new();

async fn pg_store() -> Option<PgStore> {
    let url = match std::env::var("SSSF_TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping postgres store tests: set SSSF_TEST_DATABASE_URL or DATABASE_URL");
            return None;
        }
    };
    let config = DatabaseConfig {
        backend: StoreBackend::Postgres,
        url: Some(url),
        max_connections: 5,
        connection_timeout: 5,
    };

    let pool = match DatabaseManager::connect(&config).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("skipping postgres store tests: cannot connect: {err}");
            return None;
        }
    };
    if let Err(err) = SCHEMA
        .get_or_try_init(|| DatabaseManager::bootstrap(&pool))
        .await
    {
        eprintln!("skipping postgres store tests: schema bootstrap failed: {err}");
        return None;
    }
    Some(PgStore::new(pool))
}

fn new_user(name: &str) -> NewUser {
    let name = format!("{}-{}", name, Uuid::new_v4().simple());
    NewUser {
        email: format!("{}@example.com", name),
        user_name: name,
        password_hash: "hash".to_string(),
        role: Role::User,
    }
}

fn new_cat(owner: &User, lat: f64, lng: f64) -> NewCat {
    NewCat {
        cat_name: "Mittens".to_string(),
        weight: 4.2,
        birthdate: NaiveDate::from_ymd_opt(2020, 5, 17).expect("valid date"),
        filename: String::new(),
        owner: OwnerRef(owner.id),
        location: Point::from(Coordinates { lat, lng }),
    }
}

#[tokio::test]
async fn duplicate_name_or_email_conflicts() -> Result<()> {
    let Some(store) = pg_store().await else {
        return Ok(());
    };
    let alice = store.create_user(new_user("alice")).await?;

    let mut same_name = new_user("other");
    same_name.user_name = alice.user_name.clone();
    assert!(matches!(store.create_user(same_name).await, Err(StoreError::Conflict(_))));

    let mut shouting = new_user("other");
    shouting.email = alice.email.to_uppercase();
    assert!(matches!(store.create_user(shouting).await, Err(StoreError::Conflict(_))));

    let found = store.find_user_by_email(&alice.email.to_uppercase()).await?;
    assert_eq!(found.map(|u| u.id), Some(alice.id));
    Ok(())
}

#[tokio::test]
async fn user_updates_merge_and_report_missing_rows() -> Result<()> {
    let Some(store) = pg_store().await else {
        return Ok(());
    };
    let alice = store.create_user(new_user("alice")).await?;
    let renamed = format!("alicia-{}", Uuid::new_v4().simple());

    let changes = UserChanges {
        user_name: Some(renamed.clone()),
        role: Some(Role::Admin),
        ..Default::default()
    };
    let updated = store.update_user(alice.id, changes).await?;
    assert_eq!(updated.user_name, renamed);
    assert_eq!(updated.email, alice.email);
    assert_eq!(updated.password_hash, alice.password_hash);
    assert_eq!(updated.role, Role::Admin);

    let changes = UserChanges {
        user_name: Some("nobody".to_string()),
        ..Default::default()
    };
    let missing = store.update_user(Uuid::new_v4(), changes).await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn cat_mutations_are_scoped_to_the_owner() -> Result<()> {
    let Some(store) = pg_store().await else {
        return Ok(());
    };
    let alice = store.create_user(new_user("alice")).await?;
    let bob = store.create_user(new_user("bob")).await?;
    let cat = store.create_cat(new_cat(&alice, 61.2, 23.5)).await?;
    assert_eq!(cat.owner.id, alice.id);
    assert_eq!(cat.owner.user_name, alice.user_name);

    let rename = CatChanges {
        cat_name: Some("Stolen".to_string()),
        ..Default::default()
    };
    let denied = store
        .update_cat(cat.id, OwnerScope::Owner(bob.id), rename.clone())
        .await;
    assert!(matches!(denied, Err(StoreError::NotFound(_))));
    let denied = store.delete_cat(cat.id, OwnerScope::Owner(bob.id)).await;
    assert!(matches!(denied, Err(StoreError::NotFound(_))));
    assert_eq!(store.get_cat(cat.id).await?.cat_name, "Mittens");

    let updated = store.update_cat(cat.id, OwnerScope::Any, rename).await?;
    assert_eq!(updated.cat_name, "Stolen");
    assert_eq!(updated.weight, 4.2);
    assert_eq!(updated.location, cat.location);
    assert_eq!(updated.owner.user_name, alice.user_name);

    let deleted = store.delete_cat(cat.id, OwnerScope::Owner(alice.id)).await?;
    assert_eq!(deleted.id, cat.id);
    assert!(matches!(store.get_cat(cat.id).await, Err(StoreError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn box_query_uses_inclusive_lng_lat_ranges() -> Result<()> {
    let Some(store) = pg_store().await else {
        return Ok(());
    };
    let alice = store.create_user(new_user("alice")).await?;
    let inside = store.create_cat(new_cat(&alice, 61.2, 23.5)).await?;
    let edge = store.create_cat(new_cat(&alice, 61.0, 23.0)).await?;
    store.create_cat(new_cat(&alice, 62.0, 24.0)).await?;

    let bbox = BoundingBox::from_corners(
        Coordinates { lat: 61.5, lng: 23.8 },
        Coordinates { lat: 61.0, lng: 23.0 },
    );
    let found: Vec<Uuid> = store
        .list_cats_in_box(&bbox)
        .await?
        .into_iter()
        .filter(|c| c.owner.id == alice.id)
        .map(|c| c.id)
        .collect();
    assert_eq!(found, [inside.id, edge.id]);

    let mine = store.list_cats_by_owner(OwnerRef(alice.id)).await?;
    assert_eq!(mine.len(), 3);
    Ok(())
}

#[tokio::test]
async fn deleting_user_cascades_to_cats() -> Result<()> {
    let Some(store) = pg_store().await else {
        return Ok(());
    };
    let alice = store.create_user(new_user("alice")).await?;
    let cat = store.create_cat(new_cat(&alice, 61.2, 23.5)).await?;

    store.delete_user(alice.id).await?;
    assert!(matches!(store.get_cat(cat.id).await, Err(StoreError::NotFound(_))));
    assert!(store.list_cats_by_owner(OwnerRef(alice.id)).await?.is_empty());
    assert!(matches!(store.delete_user(alice.id).await, Err(StoreError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn cat_for_unknown_owner_is_not_added() -> Result<()> {
    let Some(store) = pg_store().await else {
        return Ok(());
    };
    let ghost = User {
        id: Uuid::new_v4(),
        user_name: "ghost".to_string(),
        email: "ghost@example.com".to_string(),
        role: Role::User,
        password_hash: String::new(),
    };
    let result = store.create_cat(new_cat(&ghost, 61.2, 23.5)).await;
    assert!(matches!(result, Err(StoreError::NothingChanged(_))));
    Ok(())
}

use anyhow::{bail, Context};
use serde_json::json;

use crate::auth::PasswordHasher;
use crate::cli::OutputFormat;
use crate::config::{AppConfig, StoreBackend};
use crate::database::models::{NewUser, User, UserChanges};
use crate::database::{self, Store};
use crate::handlers::payloads::RegisterUser;
use crate::types::Role;
use crate::validation::normalize_email;

async fn open_persistent(config: &AppConfig) -> anyhow::Result<std::sync::Arc<dyn Store>> {
    if config.database.backend == StoreBackend::Memory {
        bail!("the in-memory store does not outlive this command; set DATABASE_URL");
    }
    database::open(&config.database)
        .await
        .context("failed to open store")
}

pub async fn create_admin(
    config: &AppConfig,
    user_name: String,
    email: String,
    password: String,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let store = open_persistent(config).await?;
    let passwords = PasswordHasher::from_config(&config.security)?;
    let account = RegisterUser {
        user_name,
        email: normalize_email(&email),
        password,
    };

    let password_min = config.security.password_min_length;
    let user = insert_admin(store.as_ref(), &passwords, account, password_min).await?;
    print_user("Admin created", &user, output_format);
    Ok(())
}

pub async fn promote(
    config: &AppConfig,
    email: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let store = open_persistent(config).await?;
    let user = promote_by_email(store.as_ref(), &normalize_email(email)).await?;
    print_user("User promoted", &user, output_format);
    Ok(())
}

async fn insert_admin(
    store: &dyn Store,
    passwords: &PasswordHasher,
    account: RegisterUser,
    password_min: usize,
) -> anyhow::Result<User> {
    account.validate(password_min)?;
    let password_hash = passwords.hash(&account.password)?;

    let user = store
        .create_user(NewUser {
            user_name: account.user_name,
            email: account.email,
            password_hash,
            role: Role::Admin,
        })
        .await?;
    tracing::info!("Created admin {}", user.id);
    Ok(user)
}

async fn promote_by_email(store: &dyn Store, email: &str) -> anyhow::Result<User> {
    let user = match store.find_user_by_email(email).await? {
        Some(user) => user,
        None => bail!("no account with email {}", email),
    };
    let changes = UserChanges {
        role: Some(Role::Admin),
        ..Default::default()
    };
    Ok(store.update_user(user.id, changes).await?)
}

fn print_user(message: &str, user: &User, output_format: OutputFormat) {
    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "message": message, "data": user.output(), "role": user.role })
        ),
        OutputFormat::Text => println!(
            "{}: {} <{}> ({}, role {})",
            message, user.user_name, user.email, user.id, user.role
        ),
    }
}

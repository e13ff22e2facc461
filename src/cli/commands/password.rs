use serde_json::json;

use crate::auth::PasswordHasher;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

/// Hash for seeding a password column by hand.
pub fn hash(config: &AppConfig, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let hash = PasswordHasher::from_config(&config.security)?.hash(password)?;
    match output_format {
        OutputFormat::Json => println!("{}", json!({ "hash": hash })),
        OutputFormat::Text => println!("{}", hash),
    }
    Ok(())
}

//! HTTP application wiring: shared state, extractors and the router.

pub mod extract;
pub mod routes;

use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::AppConfig;
use crate::database::{self, Store};
use crate::geo::{Coordinates, FallbackGeolocator, Geolocator};
use crate::uploads::{DiskUploadStore, UploadStore};

pub use extract::JsonBody;
pub use routes::build_router;

/// Everything a handler may need, cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub passwords: Arc<PasswordHasher>,
    pub uploads: Arc<dyn UploadStore>,
    pub geolocator: Arc<dyn Geolocator>,
}

impl AppState {
    /// Opens the configured store and builds the default collaborators.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store = database::open(&config.database).await?;
        let passwords = PasswordHasher::from_config(&config.security)?;
        Self::with_store(config, store, passwords)
    }

    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn Store>,
        passwords: PasswordHasher,
    ) -> anyhow::Result<Self> {
        let tokens = TokenService::from_config(&config.security)?;
        let uploads = DiskUploadStore::new(&config.server.upload_dir);
        let fallback = Coordinates::new(config.geo.default_lat, config.geo.default_lng)?;

        Ok(Self {
            tokens: Arc::new(tokens),
            passwords: Arc::new(passwords),
            uploads: Arc::new(uploads),
            geolocator: Arc::new(FallbackGeolocator::new(fallback)),
            store,
            config: Arc::new(config),
        })
    }
}

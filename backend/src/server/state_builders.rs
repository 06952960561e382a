//! Builders for the HTTP port bundle.
//!
//! PostgreSQL adapters are used when a database URL is configured; otherwise
//! every repository port is served by one shared [`InMemoryStore`].

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use karigari::domain::ports::{ImageStore, PasswordHasher};
use karigari::inbound::http::state::{HttpState, HttpStatePorts};
use karigari::outbound::hashing::Argon2PasswordHasher;
use karigari::outbound::memory::InMemoryStore;
use karigari::outbound::persistence::{
    DbPool, DieselChatRepository, DieselCustomizationRepository, DieselOrderRepository,
    DieselProductRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use karigari::outbound::storage::FsImageStore;
use karigari::settings::AppSettings;

/// Adapters shared by every port bundle regardless of persistence.
struct SharedAdapters {
    hasher: Arc<dyn PasswordHasher>,
    images: Arc<dyn ImageStore>,
    clock: Arc<dyn Clock>,
}

fn memory_ports(store: &InMemoryStore, shared: SharedAdapters) -> HttpStatePorts {
    let store = Arc::new(store.clone());
    HttpStatePorts {
        users: store.clone(),
        products: store.clone(),
        orders: store.clone(),
        customizations: store.clone(),
        chat: store,
        hasher: shared.hasher,
        images: shared.images,
        clock: shared.clock,
    }
}

fn diesel_ports(pool: &DbPool, shared: SharedAdapters) -> HttpStatePorts {
    HttpStatePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        products: Arc::new(DieselProductRepository::new(pool.clone())),
        orders: Arc::new(DieselOrderRepository::new(pool.clone())),
        customizations: Arc::new(DieselCustomizationRepository::new(pool.clone())),
        chat: Arc::new(DieselChatRepository::new(pool.clone())),
        hasher: shared.hasher,
        images: shared.images,
        clock: shared.clock,
    }
}

/// Apply migrations and open the connection pool.
async fn connect(database_url: &str) -> std::io::Result<DbPool> {
    let applied = run_pending_migrations(database_url)
        .await
        .map_err(std::io::Error::other)?;
    info!(applied, "database migrations applied");
    DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(std::io::Error::other)
}

/// Build the service layer from settings.
///
/// # Errors
/// Fails when the upload directory cannot be opened or, with a database
/// configured, when migrations or the pool cannot be set up.
pub async fn build_http_state(settings: &AppSettings) -> std::io::Result<HttpState> {
    let upload_dir = settings.upload_dir();
    let shared = SharedAdapters {
        hasher: Arc::new(Argon2PasswordHasher::new()),
        images: Arc::new(FsImageStore::open(&upload_dir)?),
        clock: Arc::new(DefaultClock),
    };
    info!(path = %upload_dir.display(), "product images stored on disk");

    let ports = match settings.database_url() {
        Some(url) => diesel_ports(&connect(url).await?, shared),
        None => {
            warn!("KARIGARI_DATABASE_URL not set; data lives in memory and is lost on restart");
            memory_ports(&InMemoryStore::new(), shared)
        }
    };
    Ok(HttpState::new(ports, settings.tax_basis_points))
}

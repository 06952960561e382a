//! Shared helpers for the end-to-end HTTP tests.
//!
//! The app is assembled from the public crate surface the same way the
//! server binary does it, with the in-memory store standing in for
//! PostgreSQL and a temporary directory for product images.

use std::sync::Arc;

use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use mockable::DefaultClock;
use serde_json::Value;
use tempfile::TempDir;

use karigari::Trace;
use karigari::inbound::http::configure;
use karigari::inbound::http::health::{HealthState, live, ready};
use karigari::inbound::http::session_config::{SESSION_COOKIE_NAME, SessionSettings};
use karigari::inbound::http::state::{HttpState, HttpStatePorts};
use karigari::inbound::http::validation::{json_config, query_config};
use karigari::outbound::hashing::Argon2PasswordHasher;
use karigari::outbound::memory::InMemoryStore;
use karigari::outbound::storage::FsImageStore;

/// One isolated marketplace: store, image directory and session key.
pub struct Marketplace {
    pub state: web::Data<HttpState>,
    pub health: web::Data<HealthState>,
    session: SessionSettings,
    _images: TempDir,
}

impl Marketplace {
    pub fn new(tax_basis_points: u32) -> Self {
        let images = TempDir::new().expect("image dir");
        let store = Arc::new(InMemoryStore::new());
        let state = HttpState::new(
            HttpStatePorts {
                users: store.clone(),
                products: store.clone(),
                orders: store.clone(),
                customizations: store.clone(),
                chat: store,
                hasher: Arc::new(Argon2PasswordHasher::new()),
                images: Arc::new(FsImageStore::open(images.path()).expect("image store")),
                clock: Arc::new(DefaultClock),
            },
            tax_basis_points,
        );
        Self {
            state: web::Data::new(state),
            health: web::Data::new(HealthState::new()),
            session: SessionSettings {
                key: Key::generate(),
                cookie_secure: false,
                same_site: SameSite::Lax,
            },
            _images: images,
        }
    }

    /// The application as the server mounts it, minus WebSocket and docs.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state.clone())
            .app_data(self.health.clone())
            .app_data(json_config())
            .app_data(query_config())
            .wrap(self.session.middleware())
            .wrap(Trace)
            .configure(configure)
            .service(ready)
            .service(live)
    }
}

/// The session cookie a response set, if any.
pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Read a response body as JSON.
pub async fn json_body(response: ServiceResponse) -> Value {
    test::read_body_json(response).await
}

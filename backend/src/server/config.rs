//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::web;

use karigari::inbound::http::health::HealthState;
use karigari::inbound::http::session_config::SessionSettings;
use karigari::inbound::http::state::HttpState;
use karigari::inbound::ws::state::WsState;

/// Everything [`super::create_server`] needs, resolved ahead of time.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: web::Data<HttpState>,
    pub(crate) ws_state: web::Data<WsState>,
    pub(crate) health_state: web::Data<HealthState>,
}

impl ServerConfig {
    /// Bundle resolved session settings, services and origin allow-list.
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        http_state: HttpState,
        ws_state: WsState,
    ) -> Self {
        Self {
            session,
            bind_addr,
            http_state: web::Data::new(http_state),
            ws_state: web::Data::new(ws_state),
            health_state: web::Data::new(HealthState::new()),
        }
    }

    /// Shared readiness state, marked ready once the listener is bound.
    #[must_use]
    pub fn health_state(&self) -> web::Data<HealthState> {
        self.health_state.clone()
    }
}

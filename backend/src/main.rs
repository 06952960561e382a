//! Karigari entry-point: loads settings, wires adapters and serves the REST
//! API, the WebSocket channel and (in debug builds) the OpenAPI docs.

mod server;

use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use karigari::inbound::http::session_config::{BuildMode, session_settings_from_env};
use karigari::inbound::ws::state::WsState;
use karigari::settings::AppSettings;
use server::{ServerConfig, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(std::io::Error::other)?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let ws_state = WsState::new(settings.ws_origins().map_err(std::io::Error::other)?);
    let http_state = build_http_state(&settings).await?;

    let server = create_server(ServerConfig::new(session, bind_addr, http_state, ws_state))?;
    server.await
}

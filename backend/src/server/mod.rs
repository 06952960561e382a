//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::build_http_state;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use karigari::Trace;
#[cfg(debug_assertions)]
use karigari::doc::ApiDoc;
use karigari::inbound::http::configure;
use karigari::inbound::http::health::{HealthState, live, ready};
use karigari::inbound::http::state::HttpState;
use karigari::inbound::http::validation::{json_config, query_config};
use karigari::inbound::ws;
use karigari::inbound::ws::state::WsState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
    session: SessionMiddleware<CookieSessionStore>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
        session,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .app_data(json_config())
        .app_data(query_config())
        .wrap(session)
        .wrap(Trace)
        .configure(configure)
        .service(ws::ws_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the Actix HTTP server from a resolved [`ServerConfig`].
///
/// The returned [`Server`] must be awaited to drive the listener. Readiness
/// is flipped once the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails or, with the
/// `metrics` feature, when collectors cannot be registered.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let ServerConfig {
        session,
        bind_addr,
        http_state,
        ws_state,
        health_state,
    } = config;
    let server_health_state = health_state.clone();

    #[cfg(feature = "metrics")]
    let prometheus = metrics::build_metrics()?;

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
            session: session.middleware(),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}

//! WebSocket inbound adapter.
//!
//! Responsibilities:
//! - validate upgrade requests against the configured origin allow-list
//! - hand accepted connections to the per-connection heartbeat loop

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tracing::{error, info, warn};
use url::Url;

mod session;

pub mod state;

use state::WsState;

/// Handle WebSocket upgrade for the `/ws` endpoint.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        warn!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        warn!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    validate_origin(&state, origin_header)?;

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorBadRequest("WebSocket upgrade failed")
    })?;
    let peer = req
        .connection_info()
        .realip_remote_addr()
        .map(str::to_owned)
        .unwrap_or_default();
    info!(peer = %peer, "WebSocket client connected");
    actix_web::rt::spawn(session::handle_ws_session(session, messages, peer));
    Ok(response)
}

fn validate_origin(state: &WsState, origin_header: &HeaderValue) -> actix_web::Result<()> {
    let origin_value = origin_header.to_str().map_err(|error| {
        warn!(error = %error, "Failed to parse Origin header as string");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    let origin = Url::parse(origin_value).map_err(|error| {
        warn!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if state.allows(&origin) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

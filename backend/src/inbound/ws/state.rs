//! Shared WebSocket adapter state.

use std::sync::Arc;

use url::{Origin, Url};

/// Origins allowed to open the real-time channel.
#[derive(Clone, Debug, Default)]
pub struct WsState {
    allowed_origins: Arc<[Origin]>,
}

impl WsState {
    /// Build the allow-list from configured origin URLs.
    ///
    /// Only the scheme, host and port of each URL take part in matching.
    pub fn new(allowed: impl IntoIterator<Item = Url>) -> Self {
        let allowed_origins = allowed
            .into_iter()
            .map(|url| url.origin())
            .filter(Origin::is_tuple)
            .collect();
        Self { allowed_origins }
    }

    /// Whether a parsed `Origin` header belongs to the allow-list.
    pub fn allows(&self, origin: &Url) -> bool {
        let origin = origin.origin();
        origin.is_tuple() && self.allowed_origins.contains(&origin)
    }
}

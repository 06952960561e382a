//! Runtime settings loaded via OrthoConfig.
//!
//! Every field can be supplied as a `KARIGARI_*` environment variable (for
//! example `KARIGARI_DATABASE_URL`) or the matching command-line flag.
//! Session cookie toggles are handled separately by
//! [`crate::inbound::http::session_config`].

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_UPLOAD_DIR: &str = "uploads/products";
const DEFAULT_WS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Problems found while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// One of the WebSocket origins is not an absolute URL.
    #[error("invalid WebSocket origin '{value}': {source}")]
    WsOrigin {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KARIGARI")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Directory product images are written to.
    pub upload_dir: Option<PathBuf>,
    /// Tax applied to order subtotals, in basis points.
    #[ortho_config(default = 0)]
    pub tax_basis_points: u32,
    /// Comma-separated origins allowed to open the WebSocket channel.
    pub ws_origins: Option<String>,
}

impl AppSettings {
    /// The configured bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// The configured upload directory, falling back to `uploads/products`.
    #[must_use]
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    /// The configured database URL, ignoring blank values.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Parsed WebSocket origins, falling back to the local dev servers.
    ///
    /// # Errors
    /// Returns [`SettingsError::WsOrigin`] for the first entry that is not an
    /// absolute URL.
    pub fn ws_origins(&self) -> Result<Vec<Url>, SettingsError> {
        self.ws_origins
            .as_deref()
            .unwrap_or(DEFAULT_WS_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                Url::parse(origin).map_err(|source| SettingsError::WsOrigin {
                    value: origin.to_owned(),
                    source,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "KARIGARI_BIND_ADDR",
        "KARIGARI_DATABASE_URL",
        "KARIGARI_UPLOAD_DIR",
        "KARIGARI_TAX_BASIS_POINTS",
        "KARIGARI_WS_ORIGINS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("karigari")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket addr")
        );
        assert_eq!(settings.upload_dir(), PathBuf::from(DEFAULT_UPLOAD_DIR));
        assert_eq!(settings.tax_basis_points, 0);
        assert!(settings.database_url().is_none());
        assert_eq!(settings.ws_origins().expect("default origins").len(), 2);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("KARIGARI_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "KARIGARI_DATABASE_URL",
                Some("postgres://localhost/karigari".to_owned()),
            ),
            ("KARIGARI_UPLOAD_DIR", Some("/srv/karigari/images".to_owned())),
            ("KARIGARI_TAX_BASIS_POINTS", Some("1800".to_owned())),
            (
                "KARIGARI_WS_ORIGINS",
                Some("https://karigari.example, https://admin.karigari.example".to_owned()),
            ),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind addr").port(),
            9000
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://localhost/karigari")
        );
        assert_eq!(settings.upload_dir(), PathBuf::from("/srv/karigari/images"));
        assert_eq!(settings.tax_basis_points, 1800);
        let origins = settings.ws_origins().expect("origins");
        assert_eq!(
            origins.iter().map(Url::as_str).collect::<Vec<_>>(),
            ["https://karigari.example/", "https://admin.karigari.example/"]
        );
    }

    #[rstest]
    fn malformed_values_are_reported() {
        let _guard = lock_env([
            ("KARIGARI_BIND_ADDR", Some("everywhere".to_owned())),
            ("KARIGARI_WS_ORIGINS", Some("localhost".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
        assert!(matches!(
            settings.ws_origins(),
            Err(SettingsError::WsOrigin { .. })
        ));
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let _guard = lock_env([("KARIGARI_DATABASE_URL", Some("  ".to_owned()))]);

        assert!(load_from_empty_args().database_url().is_none());
    }
}

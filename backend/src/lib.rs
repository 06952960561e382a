//! Karigari marketplace backend.
//!
//! Layout follows ports and adapters:
//! - [`domain`]: entities, rules and services
//! - [`inbound`]: HTTP and WebSocket adapters driving the services
//! - [`outbound`]: PostgreSQL, in-memory, hashing and image storage adapters

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;

//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via Diesel, with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. No business rules live here, with the exception of the
//!   atomic stock reservation that order placement relies on.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Diesel and pool failures are mapped to each
//!   port's error enum; unique violations become the port's conflict
//!   variants.
//!
//! # Example
//!
//! ```no_run
//! use karigari::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn connect() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/karigari")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_chat_repository;
mod diesel_customization_repository;
mod diesel_helpers;
mod diesel_order_repository;
mod diesel_product_repository;
mod diesel_user_repository;
mod json_serializers;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_chat_repository::DieselChatRepository;
pub use diesel_customization_repository::DieselCustomizationRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

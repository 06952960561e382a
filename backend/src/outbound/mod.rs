//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: a mutex-guarded store used when no database is configured
//! - **hashing**: Argon2id password hashing
//! - **storage**: product images on the local filesystem
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod hashing;
pub mod memory;
pub mod persistence;
pub mod storage;

//! Port for customization request persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Customization, CustomizationId, CustomizationStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by customization repository adapters.
    pub enum CustomizationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "customization repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "customization repository query failed: {message}",
        /// The stored request gained timeline entries since it was read.
        Conflict { request: String } =>
            "customization request {request} was modified concurrently",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomizationQuery {
    pub status: Option<CustomizationStatus>,
    pub customer: Option<UserId>,
    pub artisan: Option<UserId>,
}

impl CustomizationQuery {
    pub fn matches(&self, request: &Customization) -> bool {
        self.status.is_none_or(|status| request.status == status)
            && self.customer.is_none_or(|customer| request.customer == customer)
            && self.artisan.is_none_or(|artisan| request.artisan == artisan)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomizationRepository: Send + Sync {
    async fn insert(&self, request: &Customization) -> Result<(), CustomizationRepositoryError>;

    async fn find_by_id(
        &self,
        id: &CustomizationId,
    ) -> Result<Option<Customization>, CustomizationRepositoryError>;

    /// Persist status, quote and response and append the newest timeline
    /// entry. Returns `false` when the row is gone and `Conflict` when the
    /// stored timeline no longer ends where `request` was read.
    async fn update(&self, request: &Customization) -> Result<bool, CustomizationRepositoryError>;

    /// Newest requests first.
    async fn list(
        &self,
        query: &CustomizationQuery,
        page: PageRequest,
    ) -> Result<Page<Customization>, CustomizationRepositoryError>;
}

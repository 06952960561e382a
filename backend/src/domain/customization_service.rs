//! Customization request use cases.

use std::sync::Arc;

use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::port_errors::{map_customization_error, map_product_error};
use super::ports::{CustomizationQuery, CustomizationRepository, ProductRepository};
use super::{
    Actor, Customization, CustomizationId, CustomizationStatus, Error, NewCustomization,
    Priority, ProductId, Quote, QuoteDraft, RequestDetails, UserId,
};

const NOT_FOUND: &str = "Customization request not found";

/// A customer's bespoke request for a listed product.
#[derive(Debug, Clone)]
pub struct CustomizationRequest {
    pub artisan: UserId,
    pub product: ProductId,
    pub request_details: RequestDetails,
    pub priority: Priority,
    pub tags: Vec<String>,
}

#[derive(Clone)]
pub struct CustomizationService {
    requests: Arc<dyn CustomizationRepository>,
    products: Arc<dyn ProductRepository>,
    clock: Arc<dyn Clock>,
}

impl CustomizationService {
    pub fn new(
        requests: Arc<dyn CustomizationRepository>,
        products: Arc<dyn ProductRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            products,
            clock,
        }
    }

    /// Open a request against a product sold by the named artisan.
    pub async fn create(
        &self,
        actor: &Actor,
        request: CustomizationRequest,
    ) -> Result<Customization, Error> {
        if actor.require_customer().is_err() {
            return Err(Error::forbidden(
                "Only customers can create customization requests",
            ));
        }
        let product = self
            .products
            .find_by_id(&request.product)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| Error::not_found("Product not found"))?;
        if product.artisan != request.artisan {
            return Err(Error::invalid_request(
                "Product is not sold by the selected artisan",
            ));
        }
        let customization = Customization::open(
            CustomizationId::random(),
            NewCustomization {
                customer: actor.id,
                artisan: request.artisan,
                product: request.product,
                request_details: request.request_details,
                priority: request.priority,
                tags: request.tags,
            },
            self.clock.utc(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.requests
            .insert(&customization)
            .await
            .map_err(map_customization_error)?;
        info!(
            customization_id = %customization.id,
            customer = %actor.id,
            artisan = %customization.artisan,
            "customization requested"
        );
        Ok(customization)
    }

    pub async fn get(&self, actor: &Actor, id: &CustomizationId) -> Result<Customization, Error> {
        let customization = self.find(id).await?;
        if actor.can_access_customization(&customization) {
            Ok(customization)
        } else {
            Err(Error::forbidden("Access denied"))
        }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        query: &CustomizationQuery,
        page: PageRequest,
    ) -> Result<Page<Customization>, Error> {
        actor.require_admin()?;
        self.requests
            .list(query, page)
            .await
            .map_err(map_customization_error)
    }

    pub async fn customer_requests(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<Page<Customization>, Error> {
        actor.require_customer()?;
        let query = CustomizationQuery {
            customer: Some(actor.id),
            ..CustomizationQuery::default()
        };
        self.requests
            .list(&query, page)
            .await
            .map_err(map_customization_error)
    }

    pub async fn artisan_requests(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<Page<Customization>, Error> {
        actor.require_artisan()?;
        let query = CustomizationQuery {
            artisan: Some(actor.id),
            ..CustomizationQuery::default()
        };
        self.requests
            .list(&query, page)
            .await
            .map_err(map_customization_error)
    }

    /// Any participant or an admin may move the request to any status.
    pub async fn set_status(
        &self,
        actor: &Actor,
        id: &CustomizationId,
        status: CustomizationStatus,
        note: Option<String>,
    ) -> Result<Customization, Error> {
        let mut customization = self.get(actor, id).await?;
        customization.set_status(actor.id, status, note, self.clock.utc());
        self.save(&customization).await?;
        info!(customization_id = %id, actor = %actor.id, status = %status, "customization status updated");
        Ok(customization)
    }

    /// The addressed artisan prices the request.
    pub async fn quote(
        &self,
        actor: &Actor,
        id: &CustomizationId,
        draft: QuoteDraft,
        message: Option<String>,
    ) -> Result<Customization, Error> {
        actor.require_artisan()?;
        let mut customization = self.find(id).await?;
        if customization.artisan != actor.id {
            return Err(Error::forbidden("Access denied"));
        }
        let quote =
            Quote::from_draft(draft).map_err(|err| Error::invalid_request(err.to_string()))?;
        customization.submit_quote(actor.id, quote, message, self.clock.utc());
        self.save(&customization).await?;
        info!(customization_id = %id, artisan = %actor.id, "customization quoted");
        Ok(customization)
    }

    async fn find(&self, id: &CustomizationId) -> Result<Customization, Error> {
        self.requests
            .find_by_id(id)
            .await
            .map_err(map_customization_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn save(&self, customization: &Customization) -> Result<(), Error> {
        let updated = self
            .requests
            .update(customization)
            .await
            .map_err(map_customization_error)?;
        if updated {
            Ok(())
        } else {
            Err(Error::not_found(NOT_FOUND))
        }
    }
}

#[cfg(test)]
#[path = "customization_service_tests.rs"]
mod tests;

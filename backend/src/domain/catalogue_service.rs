//! Catalogue use cases: browsing, listing management, images and moderation.

use std::sync::Arc;

use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::port_errors::{map_image_error, map_product_error};
use super::ports::{ImageStore, InventoryChange, ProductQuery, ProductRepository};
use super::{
    Actor, Category, DescriptionRequest, Error, GeneratedDescription, ImageFormat, Product,
    ProductDraft, ProductId, ProductPatch, ProductStatus, StoredImageName, generate_description,
};

const NOT_FOUND: &str = "Product not found";

/// Result of flipping a listing between draft and published.
#[derive(Debug, Clone)]
pub struct ToggleOutcome {
    pub product: Product,
    pub message: &'static str,
}

#[derive(Clone)]
pub struct CatalogueService {
    products: Arc<dyn ProductRepository>,
    images: Arc<dyn ImageStore>,
    clock: Arc<dyn Clock>,
}

impl CatalogueService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        images: Arc<dyn ImageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            products,
            images,
            clock,
        }
    }

    /// Public catalogue: only published or approved listings.
    pub async fn browse(
        &self,
        mut query: ProductQuery,
        page: PageRequest,
    ) -> Result<Page<Product>, Error> {
        query.statuses = ProductStatus::PUBLIC.to_vec();
        query.artisan = None;
        self.products
            .list(&query, page)
            .await
            .map_err(map_product_error)
    }

    pub fn categories(&self) -> Vec<Category> {
        Category::ALL.to_vec()
    }

    /// Fetch one listing and count the view.
    ///
    /// Listings outside the public catalogue are visible to their owner and
    /// to admins only, and owner previews are not counted.
    pub async fn view(&self, id: &ProductId, viewer: Option<&Actor>) -> Result<Product, Error> {
        let product = self.find(id).await?;
        if product.status.is_public() {
            return self
                .products
                .record_view(id)
                .await
                .map_err(map_product_error)?
                .ok_or_else(|| Error::not_found(NOT_FOUND));
        }
        let privileged = viewer.is_some_and(|actor| actor.is_admin() || actor.owns_product(&product));
        if privileged {
            Ok(product)
        } else {
            Err(Error::not_found(NOT_FOUND))
        }
    }

    pub async fn create(&self, actor: &Actor, draft: ProductDraft) -> Result<Product, Error> {
        actor.require_approved_artisan()?;
        let product = Product::create(ProductId::random(), actor.id, draft, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.products
            .insert(&product)
            .await
            .map_err(map_product_error)?;
        info!(artisan = %actor.id, product_id = %product.id, "product created");
        Ok(product)
    }

    pub fn describe(&self, request: &DescriptionRequest) -> GeneratedDescription {
        generate_description(request, &mut rand::thread_rng())
    }

    /// The caller's own listings, any status unless filtered.
    pub async fn artisan_products(
        &self,
        actor: &Actor,
        mut query: ProductQuery,
        page: PageRequest,
    ) -> Result<Page<Product>, Error> {
        actor.require_artisan()?;
        query.artisan = Some(actor.id);
        self.products
            .list(&query, page)
            .await
            .map_err(map_product_error)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, Error> {
        let inventory = InventoryChange {
            stock: patch.stock,
            images: patch.images.clone(),
        };
        let mut product = self.owned(actor, id).await?;
        product
            .apply_patch(patch, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.save(&product, &inventory).await
    }

    pub async fn delete(&self, actor: &Actor, id: &ProductId) -> Result<(), Error> {
        self.owned(actor, id).await?;
        self.remove(id).await?;
        info!(artisan = %actor.id, product_id = %id, "product deleted");
        Ok(())
    }

    pub async fn toggle_publication(
        &self,
        actor: &Actor,
        id: &ProductId,
    ) -> Result<ToggleOutcome, Error> {
        let mut product = self.owned(actor, id).await?;
        product
            .toggle_publication(self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let product = self.save(&product, &InventoryChange::default()).await?;
        let message = if product.status == ProductStatus::Published {
            "Product published successfully"
        } else {
            "Product saved as draft successfully"
        };
        Ok(ToggleOutcome { product, message })
    }

    /// Store uploaded images and append their URIs to the listing.
    pub async fn add_images(
        &self,
        actor: &Actor,
        id: &ProductId,
        uploads: Vec<(ImageFormat, Vec<u8>)>,
    ) -> Result<Product, Error> {
        self.owned(actor, id).await?;
        if uploads.is_empty() {
            return Err(Error::invalid_request("At least one image is required"));
        }
        let mut uris = Vec::with_capacity(uploads.len());
        for (format, bytes) in uploads {
            let name = self
                .images
                .save(format, bytes)
                .await
                .map_err(map_image_error)?;
            uris.push(name.public_path());
        }
        let product = self
            .products
            .append_images(id, &uris, self.clock.utc())
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))?;
        info!(product_id = %product.id, added = uris.len(), "product images stored");
        Ok(product)
    }

    /// Bytes of a stored image, for serving under the uploads path.
    pub async fn image(&self, name: &StoredImageName) -> Result<Vec<u8>, Error> {
        self.images
            .load(name)
            .await
            .map_err(map_image_error)?
            .ok_or_else(|| Error::not_found("Image not found"))
    }

    /// Admin moderation. A rejection reason is kept only for rejections.
    pub async fn moderate(
        &self,
        actor: &Actor,
        id: &ProductId,
        status: ProductStatus,
        rejection_reason: Option<String>,
    ) -> Result<Product, Error> {
        actor.require_admin()?;
        let mut product = self.find(id).await?;
        product.moderate(status, rejection_reason, self.clock.utc());
        let product = self.save(&product, &InventoryChange::default()).await?;
        info!(admin = %actor.id, product_id = %id, status = %status, "product moderated");
        Ok(product)
    }

    pub async fn admin_delete(&self, actor: &Actor, id: &ProductId) -> Result<(), Error> {
        actor.require_admin()?;
        self.remove(id).await?;
        info!(admin = %actor.id, product_id = %id, "product removed by admin");
        Ok(())
    }

    async fn find(&self, id: &ProductId) -> Result<Product, Error> {
        self.products
            .find_by_id(id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    /// Load a listing the artisan owns. Other people's listings look
    /// missing.
    async fn owned(&self, actor: &Actor, id: &ProductId) -> Result<Product, Error> {
        actor.require_artisan()?;
        let product = self.find(id).await?;
        if actor.owns_product(&product) {
            Ok(product)
        } else {
            Err(Error::not_found("Product not found or access denied"))
        }
    }

    async fn save(&self, product: &Product, inventory: &InventoryChange) -> Result<Product, Error> {
        self.products
            .update(product, inventory)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn remove(&self, id: &ProductId) -> Result<(), Error> {
        let deleted = self
            .products
            .delete(id)
            .await
            .map_err(map_product_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Error::not_found(NOT_FOUND))
        }
    }
}

#[cfg(test)]
#[path = "catalogue_service_tests.rs"]
mod tests;

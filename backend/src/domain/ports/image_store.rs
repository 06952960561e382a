//! Port for storing uploaded product images.

use async_trait::async_trait;

use crate::domain::{ImageFormat, StoredImageName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image storage adapters.
    pub enum ImageStoreError {
        /// Reading or writing the backing store failed.
        Io { message: String } => "image storage failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` under a fresh `product-<uuid>.<ext>` name.
    async fn save(
        &self,
        format: ImageFormat,
        bytes: Vec<u8>,
    ) -> Result<StoredImageName, ImageStoreError>;

    /// Read a previously stored image, `None` when it does not exist.
    async fn load(&self, name: &StoredImageName) -> Result<Option<Vec<u8>>, ImageStoreError>;
}

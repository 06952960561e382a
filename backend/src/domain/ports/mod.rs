//! Domain ports: the traits outbound adapters implement.
//!
//! Each port reports failures through its own error enum so services can
//! tell connection problems from query failures and from the few
//! business-level conflicts adapters detect (duplicate email, short stock).

mod macros;
pub(crate) use macros::define_port_error;

mod chat_repository;
mod customization_repository;
mod image_store;
mod order_repository;
mod password_hasher;
mod product_repository;
mod user_repository;

#[cfg(test)]
pub use chat_repository::MockChatRepository;
pub use chat_repository::{ChatRepository, ChatRepositoryError};
#[cfg(test)]
pub use customization_repository::MockCustomizationRepository;
pub use customization_repository::{
    CustomizationQuery, CustomizationRepository, CustomizationRepositoryError,
};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderQuery, OrderRepository, OrderRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{
    InventoryChange, ProductQuery, ProductRepository, ProductRepositoryError, ProductSortField,
    SortDirection,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    FavoriteChange, StoredCredentials, UserQuery, UserRepository, UserRepositoryError,
};

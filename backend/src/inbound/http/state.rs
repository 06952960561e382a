//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services, which in turn only depend on ports. Swapping
//! the port bundle swaps persistence without touching a handler.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ChatRepository, CustomizationRepository, ImageStore, OrderRepository, PasswordHasher,
    ProductRepository, UserRepository,
};
use crate::domain::{
    AccountService, CatalogueService, ChatService, CustomizationService, OrderService,
};

/// Parameter object bundling every port implementation the services need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub customizations: Arc<dyn CustomizationRepository>,
    pub chat: Arc<dyn ChatRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub images: Arc<dyn ImageStore>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub catalogue: CatalogueService,
    pub orders: OrderService,
    pub customizations: CustomizationService,
    pub chat: ChatService,
}

impl HttpState {
    /// Wire every service from one port bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use karigari::inbound::http::state::{HttpState, HttpStatePorts};
    /// use karigari::outbound::hashing::Argon2PasswordHasher;
    /// use karigari::outbound::memory::InMemoryStore;
    /// use karigari::outbound::storage::FsImageStore;
    /// use mockable::DefaultClock;
    ///
    /// # fn build() -> std::io::Result<()> {
    /// let store = Arc::new(InMemoryStore::new());
    /// let state = HttpState::new(
    ///     HttpStatePorts {
    ///         users: store.clone(),
    ///         products: store.clone(),
    ///         orders: store.clone(),
    ///         customizations: store.clone(),
    ///         chat: store,
    ///         hasher: Arc::new(Argon2PasswordHasher::new()),
    ///         images: Arc::new(FsImageStore::open("uploads/products")?),
    ///         clock: Arc::new(DefaultClock),
    ///     },
    ///     0,
    /// );
    /// let _categories = state.catalogue.categories();
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(ports: HttpStatePorts, tax_basis_points: u32) -> Self {
        let HttpStatePorts {
            users,
            products,
            orders,
            customizations,
            chat,
            hasher,
            images,
            clock,
        } = ports;
        Self {
            accounts: AccountService::new(
                users.clone(),
                products.clone(),
                hasher,
                clock.clone(),
            ),
            catalogue: CatalogueService::new(products.clone(), images, clock.clone()),
            orders: OrderService::new(orders, products.clone(), clock.clone(), tax_basis_points),
            customizations: CustomizationService::new(customizations, products, clock.clone()),
            chat: ChatService::new(chat, users, clock),
        }
    }
}

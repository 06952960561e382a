//! Port for order persistence, including the stock reservation made when an
//! order is placed.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Order, OrderId, OrderStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
        /// The generated order number collided with an existing order.
        DuplicateOrderNumber { number: String } => "order number {number} already exists",
        /// A line asked for more units than are in stock.
        InsufficientStock { product: String } => "insufficient stock for product {product}",
        /// A line references a product that no longer exists.
        ProductMissing { product: String } => "product {product} no longer exists",
        /// The stored status changed since the order was read.
        StatusConflict { order: String } => "order {order} was modified concurrently",
    }
}

/// Filters for order listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub customer: Option<UserId>,
    /// Orders with at least one line sold by this artisan.
    pub artisan: Option<UserId>,
}

impl OrderQuery {
    /// Whether `order` passes every filter.
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|status| order.status == status)
            && self.customer.is_none_or(|customer| order.customer == customer)
            && self.artisan.is_none_or(|artisan| order.involves_artisan(artisan))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order and decrement stock for every line in one
    /// transaction. Nothing is written when any line is short.
    async fn place(&self, order: &Order) -> Result<(), OrderRepositoryError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError>;

    /// Store the order's new status and tracking and append the newest
    /// timeline entry.
    ///
    /// Applies only while the stored status still equals `expected` and the
    /// stored timeline holds exactly the entries before the newest one.
    /// Otherwise another writer got there first and `StatusConflict` is
    /// returned.
    async fn update_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> Result<(), OrderRepositoryError>;

    /// Newest orders first.
    async fn list(
        &self,
        query: &OrderQuery,
        page: PageRequest,
    ) -> Result<Page<Order>, OrderRepositoryError>;
}

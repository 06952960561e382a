//! Order use cases: placement, retrieval and fulfilment status changes.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::port_errors::{map_order_error, map_product_error};
use super::ports::{OrderQuery, OrderRepository, ProductRepository};
use super::{
    Actor, BillingAddress, Error, ItemCustomizations, ItemStatus, Money, NewOrder, Order,
    OrderId, OrderItem, OrderNumber, OrderStatus, OrderTransitionError, PaymentMethod, Pricing,
    ProductId, Shipment, ShippingAddress,
};

const NOT_FOUND: &str = "Order not found";

/// One line of a customer's basket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRequest {
    pub product: ProductId,
    pub quantity: u32,
    pub customizations: Option<ItemCustomizations>,
}

/// What a customer submits at checkout. Prices are looked up, never trusted
/// from the client.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub lines: Vec<LineRequest>,
    pub shipping_address: ShippingAddress,
    pub billing_address: Option<BillingAddress>,
    pub payment_method: PaymentMethod,
    pub customer_notes: Option<String>,
}

/// Artisan-initiated status change.
#[derive(Debug, Clone)]
pub struct ArtisanStatusChange {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub shipment: Option<Shipment>,
}

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    clock: Arc<dyn Clock>,
    tax_basis_points: u32,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        clock: Arc<dyn Clock>,
        tax_basis_points: u32,
    ) -> Self {
        Self {
            orders,
            products,
            clock,
            tax_basis_points,
        }
    }

    /// Place an order for the signed-in customer.
    ///
    /// Titles and prices are snapshotted from the current listings. Stock
    /// is reserved by the repository in the same write as the insert.
    pub async fn place(&self, actor: &Actor, request: OrderRequest) -> Result<Order, Error> {
        actor.require_customer()?;
        if request.lines.is_empty() {
            return Err(Error::invalid_request("Order must contain at least one item"));
        }
        let ids: Vec<ProductId> = request.lines.iter().map(|line| line.product).collect();
        let listings: HashMap<ProductId, _> = self
            .products
            .find_many(&ids)
            .await
            .map_err(map_product_error)?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        let mut items = Vec::with_capacity(request.lines.len());
        let mut subtotal = Money::ZERO;
        let mut shipping = Money::ZERO;
        for line in request.lines {
            let product = listings
                .get(&line.product)
                .filter(|product| product.status.is_public())
                .ok_or_else(|| Error::not_found(format!("Product {} not found", line.product)))?;
            if line.quantity > product.stock {
                return Err(Error::conflict(format!(
                    "Insufficient stock for {}",
                    product.title
                )));
            }
            let item = OrderItem {
                product: product.id,
                artisan: product.artisan,
                title: product.title.clone(),
                quantity: line.quantity,
                price: product.price,
                customizations: line.customizations,
                status: ItemStatus::default(),
            };
            subtotal = item
                .line_total()
                .and_then(|total| subtotal.checked_add(total))
                .ok_or_else(|| Error::invalid_request("Order amount is too large"))?;
            shipping = shipping
                .checked_add(product.shipping.charge())
                .ok_or_else(|| Error::invalid_request("Order amount is too large"))?;
            items.push(item);
        }
        let tax = subtotal
            .basis_points(self.tax_basis_points)
            .ok_or_else(|| Error::invalid_request("Order amount is too large"))?;
        let pricing = Pricing::new(subtotal, shipping, tax, Money::ZERO)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let now = self.clock.utc();
        let number = OrderNumber::generate(now, &mut rand::thread_rng());
        let order = Order::place(
            OrderId::random(),
            number,
            NewOrder {
                customer: actor.id,
                items,
                shipping_address: request.shipping_address,
                billing_address: request.billing_address,
                pricing,
                payment_method: request.payment_method,
                customer_notes: request.customer_notes,
            },
            now,
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.orders.place(&order).await.map_err(map_order_error)?;
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            customer = %actor.id,
            total = %order.pricing.total(),
            "order placed"
        );
        Ok(order)
    }

    /// Fetch an order the actor may see.
    pub async fn get(&self, actor: &Actor, id: &OrderId) -> Result<Order, Error> {
        let order = self.find(id).await?;
        if actor.can_view_order(&order) {
            Ok(order)
        } else {
            Err(Error::forbidden("Access denied"))
        }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        query: &OrderQuery,
        page: PageRequest,
    ) -> Result<Page<Order>, Error> {
        actor.require_admin()?;
        self.orders.list(query, page).await.map_err(map_order_error)
    }

    pub async fn customer_orders(
        &self,
        actor: &Actor,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<Order>, Error> {
        actor.require_customer()?;
        let query = OrderQuery {
            status,
            customer: Some(actor.id),
            artisan: None,
        };
        self.orders.list(&query, page).await.map_err(map_order_error)
    }

    /// Orders with at least one line sold by the actor.
    pub async fn artisan_orders(
        &self,
        actor: &Actor,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<Order>, Error> {
        actor.require_artisan()?;
        let query = OrderQuery {
            status,
            customer: None,
            artisan: Some(actor.id),
        };
        self.orders.list(&query, page).await.map_err(map_order_error)
    }

    /// Move an order one step along the fulfilment path.
    pub async fn advance_by_artisan(
        &self,
        actor: &Actor,
        id: &OrderId,
        change: ArtisanStatusChange,
    ) -> Result<Order, Error> {
        actor.require_approved_artisan()?;
        let mut order = self
            .orders
            .find_by_id(id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| Error::not_found(OrderTransitionError::NotInvolved.to_string()))?;
        let previous = order
            .advance_by_artisan(
                actor.id,
                change.status,
                change.note,
                change.shipment,
                self.clock.utc(),
            )
            .map_err(|err| match err {
                OrderTransitionError::NotInvolved => Error::not_found(err.to_string()),
                OrderTransitionError::InvalidTransition { .. }
                | OrderTransitionError::TrackingRequired => Error::invalid_request(err.to_string()),
            })?;
        self.orders
            .update_status(&order, previous)
            .await
            .map_err(map_order_error)?;
        info!(
            order_id = %order.id,
            artisan = %actor.id,
            from = %previous,
            to = %order.status,
            "order status advanced"
        );
        Ok(order)
    }

    /// Admin override; any status may be set.
    pub async fn override_status(
        &self,
        actor: &Actor,
        id: &OrderId,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, Error> {
        actor.require_admin()?;
        let mut order = self.find(id).await?;
        let previous = order.override_status(actor.id, status, note, self.clock.utc());
        self.orders
            .update_status(&order, previous)
            .await
            .map_err(map_order_error)?;
        info!(
            order_id = %order.id,
            admin = %actor.id,
            from = %previous,
            to = %status,
            "order status overridden"
        );
        Ok(order)
    }

    async fn find(&self, id: &OrderId) -> Result<Order, Error> {
        self.orders
            .find_by_id(id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;

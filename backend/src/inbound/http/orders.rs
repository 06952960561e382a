//! Order placement and fulfilment handlers.
//!
//! ```text
//! POST /api/orders {"items":[{"product":"<uuid>","quantity":2}],"shippingAddress":{...}}
//! PUT  /api/orders/{id}/status/artisan {"status":"shipped","tracking":{...}}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use pagination::{Page, PageDefaults};
use serde::{Deserialize, Serialize};

use crate::domain::ports::OrderQuery;
use crate::domain::{
    ArtisanStatusChange, BillingAddress, Error, ItemCustomizations, LineRequest, Order, OrderId,
    OrderRequest, OrderStatus, PaymentMethod, ProductId, Shipment, ShippingAddress, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::OrderPage;
use crate::inbound::http::session::CurrentActor;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, field_error, missing_field_error, page_request, parse_filter, parse_id,
    parse_rfc3339_timestamp,
};

const ORDER_STATUSES: &str = "pending|confirmed|processing|shipped|delivered|cancelled|refunded";

/// One basket line in `POST /api/orders`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderLineBody {
    pub product: Option<String>,
    pub quantity: Option<i64>,
    pub customizations: Option<ItemCustomizations>,
}

/// Body for `POST /api/orders`. Prices come from the listings.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderLineBody>,
    pub shipping_address: Option<ShippingAddress>,
    pub billing_address: Option<BillingAddress>,
    /// Defaults to `credit-card`.
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

/// Query string for `GET /api/orders`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    /// Customer id.
    pub customer: Option<String>,
    /// Orders with a line sold by this artisan id.
    pub artisan: Option<String>,
}

/// Query string for the customer and artisan order lists.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MyOrdersQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
}

/// Body for `PUT /api/orders/{id}/status`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct StatusOverrideRequest {
    pub status: Option<String>,
    pub note: Option<String>,
}

/// Carrier details supplied when an order ships.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingBody {
    pub carrier: String,
    pub tracking_number: String,
    /// RFC 3339 timestamp.
    pub estimated_delivery: Option<String>,
}

/// Body for `PUT /api/orders/{id}/status/artisan`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ArtisanStatusRequest {
    pub status: Option<String>,
    pub note: Option<String>,
    /// Required when moving to `shipped`.
    pub tracking: Option<TrackingBody>,
}

fn order_id(raw: &str) -> Result<OrderId, Error> {
    parse_id(raw, FieldName::new("id"))
}

fn parse_status(value: Option<&str>) -> Result<Option<OrderStatus>, Error> {
    parse_filter(
        value,
        FieldName::new("status"),
        ORDER_STATUSES,
        OrderStatus::parse,
    )
}

fn required_status(value: Option<&str>) -> Result<OrderStatus, Error> {
    parse_status(value)?.ok_or_else(|| missing_field_error(FieldName::new("status")))
}

fn optional_user(value: Option<&str>, field: &'static str) -> Result<Option<UserId>, Error> {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_id(raw, FieldName::new(field)))
        .transpose()
}

impl TryFrom<OrderLineBody> for LineRequest {
    type Error = Error;

    fn try_from(value: OrderLineBody) -> Result<Self, Self::Error> {
        let field = FieldName::new("items");
        let product = value
            .product
            .ok_or_else(|| field_error(field, "every item needs a product"))?;
        let product: ProductId = parse_id(&product, field)?;
        let quantity = value
            .quantity
            .and_then(|quantity| u32::try_from(quantity).ok())
            .filter(|quantity| *quantity > 0)
            .ok_or_else(|| field_error(field, "quantity must be a whole number of at least 1"))?;
        Ok(Self {
            product,
            quantity,
            customizations: value.customizations,
        })
    }
}

impl TryFrom<PlaceOrderRequest> for OrderRequest {
    type Error = Error;

    fn try_from(value: PlaceOrderRequest) -> Result<Self, Self::Error> {
        if value.items.is_empty() {
            return Err(missing_field_error(FieldName::new("items")));
        }
        let lines = value
            .items
            .into_iter()
            .map(LineRequest::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let shipping_address = value
            .shipping_address
            .ok_or_else(|| missing_field_error(FieldName::new("shippingAddress")))?
            .validated()
            .map_err(|err| field_error(FieldName::new("shippingAddress"), err.to_string()))?;
        Ok(Self {
            lines,
            shipping_address,
            billing_address: value.billing_address,
            payment_method: value.payment_method.unwrap_or_default(),
            customer_notes: value.notes,
        })
    }
}

impl TryFrom<TrackingBody> for Shipment {
    type Error = Error;

    fn try_from(value: TrackingBody) -> Result<Self, Self::Error> {
        let field = FieldName::new("estimatedDelivery");
        let estimated = value
            .estimated_delivery
            .ok_or_else(|| missing_field_error(field))?;
        let estimated = parse_rfc3339_timestamp(&estimated, field)?;
        Self::try_new(&value.carrier, &value.tracking_number, estimated)
            .map_err(|err| field_error(FieldName::new("tracking"), err.to_string()))
    }
}

/// Place an order for the signed-in customer.
///
/// Stock is reserved with the order; a line exceeding the remaining stock
/// fails the whole order with 409.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Invalid order", body = Error),
        (status = 403, description = "Customer access required", body = Error),
        (status = 404, description = "Product not available", body = Error),
        (status = 409, description = "Insufficient stock", body = Error)
    ),
    tags = ["orders"],
    operation_id = "placeOrder"
)]
#[post("")]
pub async fn place_order(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    payload: web::Json<PlaceOrderRequest>,
) -> ApiResult<HttpResponse> {
    let request = OrderRequest::try_from(payload.into_inner())?;
    let order = state.orders.place(&actor, request).await?;
    Ok(HttpResponse::Created().json(order))
}

/// Every order, newest first. Admin only.
#[utoipa::path(
    get,
    path = "/api/orders",
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "Orders", body = OrderPage),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 403, description = "Admin access required", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    query: web::Query<ListOrdersQuery>,
) -> ApiResult<web::Json<Page<Order>>> {
    let query = query.into_inner();
    let page = page_request(query.page, query.limit, PageDefaults::STANDARD)?;
    let filter = OrderQuery {
        status: parse_status(query.status.as_deref())?,
        customer: optional_user(query.customer.as_deref(), "customer")?,
        artisan: optional_user(query.artisan.as_deref(), "artisan")?,
    };
    state
        .orders
        .list(&actor, &filter, page)
        .await
        .map(web::Json)
}

#[utoipa::path(
    get,
    path = "/api/orders/customer/my-orders",
    params(MyOrdersQuery),
    responses(
        (status = 200, description = "Orders placed by the caller", body = OrderPage),
        (status = 403, description = "Customer access required", body = Error)
    ),
    tags = ["orders"],
    operation_id = "customerOrders"
)]
#[get("/customer/my-orders")]
pub async fn customer_orders(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    query: web::Query<MyOrdersQuery>,
) -> ApiResult<web::Json<Page<Order>>> {
    let query = query.into_inner();
    let page = page_request(query.page, query.limit, PageDefaults::STANDARD)?;
    let status = parse_status(query.status.as_deref())?;
    state
        .orders
        .customer_orders(&actor, status, page)
        .await
        .map(web::Json)
}

/// Orders containing at least one of the caller's products.
#[utoipa::path(
    get,
    path = "/api/orders/artisan/my-orders",
    params(MyOrdersQuery),
    responses(
        (status = 200, description = "Orders to fulfil", body = OrderPage),
        (status = 403, description = "Artisan access required", body = Error)
    ),
    tags = ["orders"],
    operation_id = "artisanOrders"
)]
#[get("/artisan/my-orders")]
pub async fn artisan_orders(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    query: web::Query<MyOrdersQuery>,
) -> ApiResult<web::Json<Page<Order>>> {
    let query = query.into_inner();
    let page = page_request(query.page, query.limit, PageDefaults::STANDARD)?;
    let status = parse_status(query.status.as_deref())?;
    state
        .orders
        .artisan_orders(&actor, status, page)
        .await
        .map(web::Json)
}

/// Visible to the customer, any artisan with a line in it, and admins.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 403, description = "Access denied", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<Order>> {
    let id = order_id(&path)?;
    state.orders.get(&actor, &id).await.map(web::Json)
}

/// Admin override: any status may be set.
#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(("id" = String, Path, description = "Order identifier")),
    request_body = StatusOverrideRequest,
    responses(
        (status = 200, description = "Updated order", body = Order),
        (status = 400, description = "Invalid status", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Order changed concurrently", body = Error)
    ),
    tags = ["orders"],
    operation_id = "overrideOrderStatus"
)]
#[put("/{id}/status")]
pub async fn override_status(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
    payload: web::Json<StatusOverrideRequest>,
) -> ApiResult<web::Json<Order>> {
    let id = order_id(&path)?;
    let StatusOverrideRequest { status, note } = payload.into_inner();
    let status = required_status(status.as_deref())?;
    state
        .orders
        .override_status(&actor, &id, status, note)
        .await
        .map(web::Json)
}

/// Artisan fulfilment step.
///
/// `pending → confirmed → processing → shipped → delivered`; moving to
/// `shipped` needs tracking details.
#[utoipa::path(
    put,
    path = "/api/orders/{id}/status/artisan",
    params(("id" = String, Path, description = "Order identifier")),
    request_body = ArtisanStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = Order),
        (status = 400, description = "Transition not allowed or tracking missing", body = Error),
        (status = 403, description = "Approved artisan access required", body = Error),
        (status = 404, description = "Not found or not involved", body = Error)
    ),
    tags = ["orders"],
    operation_id = "advanceOrderStatus"
)]
#[put("/{id}/status/artisan")]
pub async fn artisan_status(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
    payload: web::Json<ArtisanStatusRequest>,
) -> ApiResult<web::Json<Order>> {
    let id = order_id(&path)?;
    let ArtisanStatusRequest {
        status,
        note,
        tracking,
    } = payload.into_inner();
    let change = ArtisanStatusChange {
        status: required_status(status.as_deref())?,
        note,
        shipment: tracking.map(Shipment::try_from).transpose()?,
    };
    state
        .orders
        .advance_by_artisan(&actor, &id, change)
        .await
        .map(web::Json)
}

#[cfg(test)]
mod tests;

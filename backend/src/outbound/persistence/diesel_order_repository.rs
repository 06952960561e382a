//! PostgreSQL-backed `OrderRepository` implementation using Diesel ORM.
//!
//! Placing an order reserves stock for every line and inserts the order in
//! one transaction. Status changes are compare-and-set on the stored status
//! and timeline length, and append the new timeline entry in SQL.

use std::collections::BTreeMap;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{OrderQuery, OrderRepository, OrderRepositoryError};
use crate::domain::{Order, OrderId, OrderNumber, OrderStatus, UserId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::diesel_helpers::{jsonb_array_length, page_window, total_from_count};
use super::json_serializers::{
    from_json, from_optional_json, timeline_append, to_json, to_optional_json,
};
use super::models::{NewOrderRow, OrderRow};
use super::pool::{DbPool, PoolError};
use super::schema::{orders, products};

/// Diesel-backed implementation of the order repository port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    map_basic_pool_error(error, OrderRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    map_basic_diesel_error(
        error,
        OrderRepositoryError::query,
        OrderRepositoryError::connection,
    )
}

/// Why a placement transaction rolled back.
enum PlaceFailure {
    Database(diesel::result::Error),
    Short(Uuid),
    Missing(Uuid),
}

impl From<diesel::result::Error> for PlaceFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

fn map_place_failure(failure: PlaceFailure, order: &Order) -> OrderRepositoryError {
    match failure {
        PlaceFailure::Short(product) => OrderRepositoryError::insufficient_stock(product.to_string()),
        PlaceFailure::Missing(product) => OrderRepositoryError::product_missing(product.to_string()),
        PlaceFailure::Database(error) => match unique_violation(&error) {
            Some(constraint) if constraint.contains("order_number") => {
                OrderRepositoryError::duplicate_order_number(order.order_number.as_str())
            }
            _ => map_diesel_error(error),
        },
    }
}

/// Units requested per product across all lines.
fn reservations(order: &Order) -> Result<BTreeMap<Uuid, i32>, OrderRepositoryError> {
    let mut wanted: BTreeMap<Uuid, i64> = BTreeMap::new();
    for item in &order.items {
        *wanted.entry(*item.product.as_uuid()).or_default() += i64::from(item.quantity);
    }
    wanted
        .into_iter()
        .map(|(product, quantity)| {
            i32::try_from(quantity)
                .map(|quantity| (product, quantity))
                .map_err(|_| OrderRepositoryError::insufficient_stock(product.to_string()))
        })
        .collect()
}

/// Take `quantity` units off `product`, failing when fewer are in stock.
async fn reserve(
    conn: &mut AsyncPgConnection,
    product: Uuid,
    quantity: i32,
) -> Result<(), PlaceFailure> {
    let reserved = diesel::update(
        products::table
            .filter(products::id.eq(product))
            .filter(products::stock.ge(quantity)),
    )
    .set((
        products::stock.eq(products::stock - quantity),
        products::sales.eq(products::sales + i64::from(quantity)),
    ))
    .execute(conn)
    .await?;
    if reserved > 0 {
        return Ok(());
    }
    let exists: bool = diesel::select(diesel::dsl::exists(products::table.find(product)))
        .get_result(conn)
        .await?;
    if exists {
        Err(PlaceFailure::Short(product))
    } else {
        Err(PlaceFailure::Missing(product))
    }
}

struct EncodedOrder {
    items: serde_json::Value,
    shipping_address: serde_json::Value,
    billing_address: Option<serde_json::Value>,
    pricing: serde_json::Value,
    payment: serde_json::Value,
    tracking: Option<serde_json::Value>,
    notes: serde_json::Value,
    timeline: serde_json::Value,
}

fn encode(order: &Order) -> Result<EncodedOrder, OrderRepositoryError> {
    let query = OrderRepositoryError::query;
    Ok(EncodedOrder {
        items: to_json(&order.items, "items").map_err(query)?,
        shipping_address: to_json(&order.shipping_address, "shipping_address").map_err(query)?,
        billing_address: to_optional_json(order.billing_address.as_ref(), "billing_address")
            .map_err(query)?,
        pricing: to_json(&order.pricing, "pricing").map_err(query)?,
        payment: to_json(&order.payment, "payment").map_err(query)?,
        tracking: to_optional_json(order.tracking.as_ref(), "tracking").map_err(query)?,
        notes: to_json(&order.notes, "notes").map_err(query)?,
        timeline: to_json(&order.timeline, "timeline").map_err(query)?,
    })
}

fn row_to_order(row: OrderRow) -> Result<Order, OrderRepositoryError> {
    let query = OrderRepositoryError::query;
    let OrderRow {
        id,
        order_number,
        customer_id,
        artisan_ids: _,
        status,
        items,
        shipping_address,
        billing_address,
        pricing,
        payment,
        tracking,
        notes,
        timeline,
        created_at,
        updated_at,
    } = row;

    let order_number = OrderNumber::try_from(order_number).map_err(|err| query(err.to_string()))?;
    let status = OrderStatus::parse(&status)
        .ok_or_else(|| query(format!("unknown order status {status}")))?;

    Ok(Order {
        id: OrderId::from_uuid(id),
        order_number,
        customer: UserId::from_uuid(customer_id),
        items: from_json(items, "items").map_err(query)?,
        shipping_address: from_json(shipping_address, "shipping_address").map_err(query)?,
        billing_address: from_optional_json(billing_address, "billing_address").map_err(query)?,
        pricing: from_json(pricing, "pricing").map_err(query)?,
        payment: from_json(payment, "payment").map_err(query)?,
        status,
        tracking: from_optional_json(tracking, "tracking").map_err(query)?,
        notes: from_json(notes, "notes").map_err(query)?,
        timeline: from_json(timeline, "timeline").map_err(query)?,
        created_at,
        updated_at,
    })
}

fn filtered(query: &OrderQuery) -> orders::BoxedQuery<'static, Pg> {
    let mut statement = orders::table.into_boxed();
    if let Some(status) = query.status {
        statement = statement.filter(orders::status.eq(status.as_str()));
    }
    if let Some(customer) = query.customer {
        statement = statement.filter(orders::customer_id.eq(*customer.as_uuid()));
    }
    if let Some(artisan) = query.artisan {
        statement = statement.filter(orders::artisan_ids.contains(vec![*artisan.as_uuid()]));
    }
    statement
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn place(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let encoded = encode(order)?;
        let wanted = reservations(order)?;
        let artisan_ids: Vec<Uuid> = order.artisans().iter().map(|id| *id.as_uuid()).collect();
        let row = NewOrderRow {
            id: *order.id.as_uuid(),
            order_number: order.order_number.as_str(),
            customer_id: *order.customer.as_uuid(),
            artisan_ids: &artisan_ids,
            status: order.status.as_str(),
            items: &encoded.items,
            shipping_address: &encoded.shipping_address,
            billing_address: encoded.billing_address.as_ref(),
            pricing: &encoded.pricing,
            payment: &encoded.payment,
            tracking: encoded.tracking.as_ref(),
            notes: &encoded.notes,
            timeline: &encoded.timeline,
            created_at: order.created_at,
            updated_at: order.updated_at,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                for (product, quantity) in wanted {
                    reserve(conn, product, quantity).await?;
                }
                diesel::insert_into(orders::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                Ok::<_, PlaceFailure>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|failure| map_place_failure(failure, order))
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = orders::table
            .find(id.as_uuid())
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_order).transpose()
    }

    async fn update_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> Result<(), OrderRepositoryError> {
        let query = OrderRepositoryError::query;
        let tracking = to_optional_json(order.tracking.as_ref(), "tracking").map_err(query)?;
        let (appended, earlier) = timeline_append(&order.timeline).map_err(query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            orders::table
                .filter(orders::id.eq(order.id.as_uuid()))
                .filter(orders::status.eq(expected.as_str()))
                .filter(jsonb_array_length(orders::timeline).eq(earlier)),
        )
        .set((
            orders::status.eq(order.status.as_str()),
            orders::tracking.eq(tracking),
            orders::timeline.eq(orders::timeline.concat(appended)),
            orders::updated_at.eq(order.updated_at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if updated > 0 {
            Ok(())
        } else {
            Err(OrderRepositoryError::status_conflict(order.id.to_string()))
        }
    }

    async fn list(
        &self,
        query: &OrderQuery,
        page: PageRequest,
    ) -> Result<Page<Order>, OrderRepositoryError> {
        let (offset, limit) = page_window(page).map_err(OrderRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<OrderRow> = filtered(query)
            .order((orders::created_at.desc(), orders::id.desc()))
            .offset(offset)
            .limit(limit)
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_order)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total_from_count(total)))
    }
}

//! PostgreSQL-backed `CustomizationRepository` implementation using Diesel
//! ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    CustomizationQuery, CustomizationRepository, CustomizationRepositoryError,
};
use crate::domain::{
    Customization, CustomizationId, CustomizationStatus, OrderId, ProductId, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::{jsonb_array_length, page_window, total_from_count};
use super::json_serializers::{
    enum_to_text, from_json, from_optional_json, text_to_enum, timeline_append, to_json,
    to_optional_json,
};
use super::models::{CustomizationRow, CustomizationUpdate, NewCustomizationRow};
use super::pool::{DbPool, PoolError};
use super::schema::customizations;

/// Diesel-backed implementation of the customization repository port.
#[derive(Clone)]
pub struct DieselCustomizationRepository {
    pool: DbPool,
}

impl DieselCustomizationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CustomizationRepositoryError {
    map_basic_pool_error(error, CustomizationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CustomizationRepositoryError {
    map_basic_diesel_error(
        error,
        CustomizationRepositoryError::query,
        CustomizationRepositoryError::connection,
    )
}

fn row_to_customization(
    row: CustomizationRow,
) -> Result<Customization, CustomizationRepositoryError> {
    let query = CustomizationRepositoryError::query;
    let status = CustomizationStatus::parse(&row.status)
        .ok_or_else(|| query(format!("unknown customization status {}", row.status)))?;

    Ok(Customization {
        id: CustomizationId::from_uuid(row.id),
        customer: UserId::from_uuid(row.customer_id),
        artisan: UserId::from_uuid(row.artisan_id),
        product: ProductId::from_uuid(row.product_id),
        request_details: from_json(row.request_details, "request_details").map_err(query)?,
        status,
        artisan_response: from_optional_json(row.artisan_response, "artisan_response")
            .map_err(query)?,
        quote: from_optional_json(row.quote, "quote").map_err(query)?,
        priority: text_to_enum(&row.priority, "priority").map_err(query)?,
        tags: row.tags,
        related_order: row.related_order.map(OrderId::from_uuid),
        timeline: from_json(row.timeline, "timeline").map_err(query)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn filtered(query: &CustomizationQuery) -> customizations::BoxedQuery<'static, Pg> {
    let mut statement = customizations::table.into_boxed();
    if let Some(status) = query.status {
        statement = statement.filter(customizations::status.eq(status.as_str()));
    }
    if let Some(customer) = query.customer {
        statement = statement.filter(customizations::customer_id.eq(*customer.as_uuid()));
    }
    if let Some(artisan) = query.artisan {
        statement = statement.filter(customizations::artisan_id.eq(*artisan.as_uuid()));
    }
    statement
}

#[async_trait]
impl CustomizationRepository for DieselCustomizationRepository {
    async fn insert(&self, request: &Customization) -> Result<(), CustomizationRepositoryError> {
        let query = CustomizationRepositoryError::query;
        let details = to_json(&request.request_details, "request_details").map_err(query)?;
        let response = to_optional_json(request.artisan_response.as_ref(), "artisan_response")
            .map_err(query)?;
        let quote = to_optional_json(request.quote.as_ref(), "quote").map_err(query)?;
        let priority = enum_to_text(&request.priority, "priority").map_err(query)?;
        let timeline = to_json(&request.timeline, "timeline").map_err(query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewCustomizationRow {
            id: *request.id.as_uuid(),
            customer_id: *request.customer.as_uuid(),
            artisan_id: *request.artisan.as_uuid(),
            product_id: *request.product.as_uuid(),
            status: request.status.as_str(),
            priority: &priority,
            request_details: &details,
            artisan_response: response.as_ref(),
            quote: quote.as_ref(),
            tags: &request.tags,
            related_order: request.related_order.map(|id| *id.as_uuid()),
            timeline: &timeline,
            created_at: request.created_at,
            updated_at: request.updated_at,
        };

        diesel::insert_into(customizations::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &CustomizationId,
    ) -> Result<Option<Customization>, CustomizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = customizations::table
            .find(id.as_uuid())
            .select(CustomizationRow::as_select())
            .first::<CustomizationRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_customization).transpose()
    }

    async fn update(&self, request: &Customization) -> Result<bool, CustomizationRepositoryError> {
        let query = CustomizationRepositoryError::query;
        let response = to_optional_json(request.artisan_response.as_ref(), "artisan_response")
            .map_err(query)?;
        let quote = to_optional_json(request.quote.as_ref(), "quote").map_err(query)?;
        let (appended, earlier) = timeline_append(&request.timeline).map_err(query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = CustomizationUpdate {
            status: request.status.as_str(),
            artisan_response: response.as_ref(),
            quote: quote.as_ref(),
            related_order: request.related_order.map(|id| *id.as_uuid()),
            updated_at: request.updated_at,
        };

        let updated = diesel::update(
            customizations::table
                .filter(customizations::id.eq(request.id.as_uuid()))
                .filter(jsonb_array_length(customizations::timeline).eq(earlier)),
        )
        .set((
            &changes,
            customizations::timeline.eq(customizations::timeline.concat(appended)),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(true);
        }

        let exists: bool = diesel::select(diesel::dsl::exists(
            customizations::table.find(request.id.as_uuid()),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if exists {
            Err(CustomizationRepositoryError::conflict(request.id.to_string()))
        } else {
            Ok(false)
        }
    }

    async fn list(
        &self,
        query: &CustomizationQuery,
        page: PageRequest,
    ) -> Result<Page<Customization>, CustomizationRepositoryError> {
        let (offset, limit) = page_window(page).map_err(CustomizationRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<CustomizationRow> = filtered(query)
            .order((customizations::created_at.desc(), customizations::id.desc()))
            .offset(offset)
            .limit(limit)
            .select(CustomizationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_customization)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total_from_count(total)))
    }
}

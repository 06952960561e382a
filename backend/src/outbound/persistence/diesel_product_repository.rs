//! PostgreSQL-backed `ProductRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Array, Text, Timestamptz, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{
    InventoryChange, ProductQuery, ProductRepository, ProductRepositoryError, ProductSortField,
    SortDirection,
};
use crate::domain::{
    Category, Money, Product, ProductId, ProductStats, ProductStatus, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::{
    contains_pattern, from_quantity, page_window, to_count, to_quantity, total_from_count,
};
use super::json_serializers::{from_json, to_json};
use super::models::{NewProductRow, ProductRow, ProductUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::products;

/// Diesel-backed implementation of the product repository port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const APPEND_IMAGES_SQL: &str = r#"
UPDATE products
SET images = images || $1, updated_at = $2
WHERE id = $3
"#;

fn map_pool_error(error: PoolError) -> ProductRepositoryError {
    map_basic_pool_error(error, ProductRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProductRepositoryError {
    map_basic_diesel_error(
        error,
        ProductRepositoryError::query,
        ProductRepositoryError::connection,
    )
}

fn money(minor: i64, column: &str) -> Result<Money, ProductRepositoryError> {
    Money::from_minor(minor)
        .map_err(|err| ProductRepositoryError::query(format!("{column}: {err}")))
}

/// Convert a database row into a domain product.
fn row_to_product(row: ProductRow) -> Result<Product, ProductRepositoryError> {
    let query = ProductRepositoryError::query;
    let stats = ProductStats {
        views: to_count(row.views, "views").map_err(query)?,
        likes: to_count(row.likes, "likes").map_err(query)?,
        sales: to_count(row.sales, "sales").map_err(query)?,
        rating: row.rating,
        review_count: to_count(row.review_count, "review_count").map_err(query)?,
    };
    let category = Category::parse(&row.category)
        .ok_or_else(|| query(format!("unknown category {}", row.category)))?;
    let status = ProductStatus::parse(&row.status)
        .ok_or_else(|| query(format!("unknown product status {}", row.status)))?;

    Ok(Product {
        id: ProductId::from_uuid(row.id),
        artisan: UserId::from_uuid(row.artisan_id),
        title: row.title,
        description: row.description,
        category,
        subcategory: row.subcategory,
        materials: row.materials,
        size: row.size,
        price: money(row.price, "price")?,
        original_price: row
            .original_price
            .map(|minor| money(minor, "original_price"))
            .transpose()?,
        currency: row.currency,
        stock: to_quantity(row.stock, "stock").map_err(query)?,
        images: row.images,
        tags: row.tags,
        customizable: row.customizable,
        customization_options: from_json(row.customization_options, "customization_options")
            .map_err(query)?,
        status,
        rejection_reason: row.rejection_reason,
        featured: row.featured,
        stats,
        slug: row.slug,
        shipping: from_json(row.shipping, "shipping").map_err(query)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn filtered(query: &ProductQuery) -> products::BoxedQuery<'static, Pg> {
    let mut statement = products::table.into_boxed();
    if let Some(artisan) = query.artisan {
        statement = statement.filter(products::artisan_id.eq(*artisan.as_uuid()));
    }
    if !query.statuses.is_empty() {
        let statuses: Vec<&'static str> = query.statuses.iter().map(|s| s.as_str()).collect();
        statement = statement.filter(products::status.eq_any(statuses));
    }
    if let Some(category) = query.category {
        statement = statement.filter(products::category.eq(category.as_str()));
    }
    if let Some(min) = query.min_price {
        statement = statement.filter(products::price.ge(min.minor()));
    }
    if let Some(max) = query.max_price {
        statement = statement.filter(products::price.le(max.minor()));
    }
    if let Some(search) = query.search.as_deref() {
        let pattern = contains_pattern(search);
        let tag = search.trim().to_lowercase();
        statement = statement.filter(
            products::title
                .ilike(pattern.clone())
                .or(products::description.ilike(pattern))
                .or(products::tags.contains(vec![tag])),
        );
    }
    statement
}

fn sorted(
    statement: products::BoxedQuery<'static, Pg>,
    query: &ProductQuery,
) -> products::BoxedQuery<'static, Pg> {
    let statement = match (query.sort_by, query.direction) {
        (ProductSortField::CreatedAt, SortDirection::Ascending) => {
            statement.order(products::created_at.asc())
        }
        (ProductSortField::CreatedAt, SortDirection::Descending) => {
            statement.order(products::created_at.desc())
        }
        (ProductSortField::Price, SortDirection::Ascending) => {
            statement.order(products::price.asc())
        }
        (ProductSortField::Price, SortDirection::Descending) => {
            statement.order(products::price.desc())
        }
        (ProductSortField::Title, SortDirection::Ascending) => {
            statement.order(products::title.asc())
        }
        (ProductSortField::Title, SortDirection::Descending) => {
            statement.order(products::title.desc())
        }
    };
    statement.then_order_by(products::id.desc())
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        let query = ProductRepositoryError::query;
        let options =
            to_json(&product.customization_options, "customization_options").map_err(query)?;
        let shipping = to_json(&product.shipping, "shipping").map_err(query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewProductRow {
            id: *product.id.as_uuid(),
            artisan_id: *product.artisan.as_uuid(),
            title: &product.title,
            description: product.description.as_deref(),
            category: product.category.as_str(),
            subcategory: product.subcategory.as_deref(),
            materials: product.materials.as_deref(),
            size: product.size.as_deref(),
            price: product.price.minor(),
            original_price: product.original_price.map(Money::minor),
            currency: &product.currency,
            stock: from_quantity(product.stock, "stock").map_err(query)?,
            images: &product.images,
            tags: &product.tags,
            customizable: product.customizable,
            customization_options: &options,
            status: product.status.as_str(),
            rejection_reason: product.rejection_reason.as_deref(),
            featured: product.featured,
            slug: &product.slug,
            shipping: &shipping,
            created_at: product.created_at,
            updated_at: product.updated_at,
        };

        diesel::insert_into(products::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = products::table
            .find(id.as_uuid())
            .select(ProductRow::as_select())
            .first::<ProductRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_product).transpose()
    }

    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProductRow> = products::table
            .filter(products::id.eq_any(uuids))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_product).collect()
    }

    async fn record_view(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(products::table.find(id.as_uuid()))
            .set(products::views.eq(products::views + 1))
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_product).transpose()
    }

    async fn update(
        &self,
        product: &Product,
        inventory: &InventoryChange,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let query = ProductRepositoryError::query;
        let options =
            to_json(&product.customization_options, "customization_options").map_err(query)?;
        let shipping = to_json(&product.shipping, "shipping").map_err(query)?;
        let stock = inventory
            .stock
            .map(|stock| from_quantity(stock, "stock"))
            .transpose()
            .map_err(query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = ProductUpdate {
            title: &product.title,
            description: product.description.as_deref(),
            category: product.category.as_str(),
            subcategory: product.subcategory.as_deref(),
            materials: product.materials.as_deref(),
            size: product.size.as_deref(),
            price: product.price.minor(),
            original_price: product.original_price.map(Money::minor),
            tags: &product.tags,
            customizable: product.customizable,
            customization_options: &options,
            status: product.status.as_str(),
            rejection_reason: product.rejection_reason.as_deref(),
            featured: product.featured,
            slug: &product.slug,
            shipping: &shipping,
            updated_at: product.updated_at,
        };

        let row = diesel::update(products::table.find(product.id.as_uuid()))
            .set((
                &changes,
                stock.map(|stock| products::stock.eq(stock)),
                inventory
                    .images
                    .as_deref()
                    .map(|images| products::images.eq(images)),
            ))
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_product).transpose()
    }

    async fn append_images(
        &self,
        id: &ProductId,
        uris: &[String],
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let appended = {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            sql_query(APPEND_IMAGES_SQL)
                .bind::<Array<Text>, _>(uris)
                .bind::<Timestamptz, _>(updated_at)
                .bind::<SqlUuid, _>(id.as_uuid())
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?
        };
        if appended == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(products::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|deleted| deleted > 0)
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductRepositoryError> {
        let (offset, limit) = page_window(page).map_err(ProductRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ProductRow> = sorted(filtered(query), query)
            .offset(offset)
            .limit(limit)
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_product)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total_from_count(total)))
    }
}

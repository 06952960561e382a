//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use super::schema::{chat_rooms, customizations, orders, products, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub profile: Value,
    pub stats: Value,
    pub favorites: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub status: &'a str,
    pub profile: &'a Value,
    pub stats: &'a Value,
    pub favorites: &'a [Uuid],
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Self-service account edit; `None` fields are left out of the statement.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct ProfileChanges<'a> {
    pub name: Option<&'a str>,
    pub profile: Option<&'a Value>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub artisan_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub materials: Option<String>,
    pub size: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub currency: String,
    pub stock: i32,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub customizable: bool,
    pub customization_options: Value,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub featured: bool,
    pub views: i64,
    pub likes: i64,
    pub sales: i64,
    pub rating: f64,
    pub review_count: i64,
    pub slug: String,
    pub shipping: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub(crate) struct NewProductRow<'a> {
    pub id: Uuid,
    pub artisan_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub category: &'a str,
    pub subcategory: Option<&'a str>,
    pub materials: Option<&'a str>,
    pub size: Option<&'a str>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub currency: &'a str,
    pub stock: i32,
    pub images: &'a [String],
    pub tags: &'a [String],
    pub customizable: bool,
    pub customization_options: &'a Value,
    pub status: &'a str,
    pub rejection_reason: Option<&'a str>,
    pub featured: bool,
    pub slug: &'a str,
    pub shipping: &'a Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for listing edits and moderation.
///
/// Stock, images and engagement counters are left out; a stale read must
/// never roll back units reserved or views recorded concurrently.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProductUpdate<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub category: &'a str,
    pub subcategory: Option<&'a str>,
    pub materials: Option<&'a str>,
    pub size: Option<&'a str>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub tags: &'a [String],
    pub customizable: bool,
    pub customization_options: &'a Value,
    pub status: &'a str,
    pub rejection_reason: Option<&'a str>,
    pub featured: bool,
    pub slug: &'a str,
    pub shipping: &'a Value,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub artisan_ids: Vec<Uuid>,
    pub status: String,
    pub items: Value,
    pub shipping_address: Value,
    pub billing_address: Option<Value>,
    pub pricing: Value,
    pub payment: Value,
    pub tracking: Option<Value>,
    pub notes: Value,
    pub timeline: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub id: Uuid,
    pub order_number: &'a str,
    pub customer_id: Uuid,
    pub artisan_ids: &'a [Uuid],
    pub status: &'a str,
    pub items: &'a Value,
    pub shipping_address: &'a Value,
    pub billing_address: Option<&'a Value>,
    pub pricing: &'a Value,
    pub payment: &'a Value,
    pub tracking: Option<&'a Value>,
    pub notes: &'a Value,
    pub timeline: &'a Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Customizations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = customizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CustomizationRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub artisan_id: Uuid,
    pub product_id: Uuid,
    pub status: String,
    pub priority: String,
    pub request_details: Value,
    pub artisan_response: Option<Value>,
    pub quote: Option<Value>,
    pub tags: Vec<String>,
    pub related_order: Option<Uuid>,
    pub timeline: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = customizations)]
pub(crate) struct NewCustomizationRow<'a> {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub artisan_id: Uuid,
    pub product_id: Uuid,
    pub status: &'a str,
    pub priority: &'a str,
    pub request_details: &'a Value,
    pub artisan_response: Option<&'a Value>,
    pub quote: Option<&'a Value>,
    pub tags: &'a [String],
    pub related_order: Option<Uuid>,
    pub timeline: &'a Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = customizations)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CustomizationUpdate<'a> {
    pub status: &'a str,
    pub artisan_response: Option<&'a Value>,
    pub quote: Option<&'a Value>,
    pub related_order: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Chat rooms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = chat_rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChatRoomRow {
    pub room_id: String,
    pub participant_ids: Vec<Uuid>,
    pub participants: Value,
    pub messages: Value,
    pub chat_type: String,
    pub subject: Option<String>,
    pub related_entity: Option<Value>,
    pub status: String,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chat_rooms)]
pub(crate) struct NewChatRoomRow<'a> {
    pub room_id: &'a str,
    pub participant_ids: &'a [Uuid],
    pub participants: &'a Value,
    pub messages: &'a Value,
    pub chat_type: &'a str,
    pub subject: Option<&'a str>,
    pub related_entity: Option<&'a Value>,
    pub status: &'a str,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

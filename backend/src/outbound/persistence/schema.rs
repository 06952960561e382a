//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Sub-documents
//! (profiles, order lines, timelines, chat messages) live in JSONB columns;
//! the columns used for filtering and ordering are stored flat.

diesel::table! {
    /// Registered accounts. `email` is unique case-insensitively.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        role -> Varchar,
        status -> Varchar,
        profile -> Jsonb,
        stats -> Jsonb,
        favorites -> Array<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogue listings. `price` and `stock` are constrained non-negative.
    products (id) {
        id -> Uuid,
        artisan_id -> Uuid,
        title -> Text,
        description -> Nullable<Text>,
        category -> Varchar,
        subcategory -> Nullable<Text>,
        materials -> Nullable<Text>,
        size -> Nullable<Text>,
        price -> Int8,
        original_price -> Nullable<Int8>,
        currency -> Varchar,
        stock -> Int4,
        images -> Array<Text>,
        tags -> Array<Text>,
        customizable -> Bool,
        customization_options -> Jsonb,
        status -> Varchar,
        rejection_reason -> Nullable<Text>,
        featured -> Bool,
        views -> Int8,
        likes -> Int8,
        sales -> Int8,
        rating -> Float8,
        review_count -> Int8,
        slug -> Text,
        shipping -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Placed orders. `artisan_ids` denormalises the sellers of every line.
    orders (id) {
        id -> Uuid,
        order_number -> Varchar,
        customer_id -> Uuid,
        artisan_ids -> Array<Uuid>,
        status -> Varchar,
        items -> Jsonb,
        shipping_address -> Jsonb,
        billing_address -> Nullable<Jsonb>,
        pricing -> Jsonb,
        payment -> Jsonb,
        tracking -> Nullable<Jsonb>,
        notes -> Jsonb,
        timeline -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    customizations (id) {
        id -> Uuid,
        customer_id -> Uuid,
        artisan_id -> Uuid,
        product_id -> Uuid,
        status -> Varchar,
        priority -> Varchar,
        request_details -> Jsonb,
        artisan_response -> Nullable<Jsonb>,
        quote -> Nullable<Jsonb>,
        tags -> Array<Text>,
        related_order -> Nullable<Uuid>,
        timeline -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Chat rooms with their append-only message log.
    chat_rooms (room_id) {
        room_id -> Varchar,
        participant_ids -> Array<Uuid>,
        participants -> Jsonb,
        messages -> Jsonb,
        chat_type -> Varchar,
        subject -> Nullable<Text>,
        related_entity -> Nullable<Jsonb>,
        status -> Varchar,
        last_activity -> Timestamptz,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, products, orders, customizations, chat_rooms);

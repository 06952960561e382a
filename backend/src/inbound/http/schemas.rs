//! OpenAPI schema definitions for types the domain does not annotate.
//!
//! The `pagination` crate stays free of utoipa, so the page envelope is
//! described here once per item type. The wrappers mirror the serialized
//! shape of [`pagination::Page`] and are referenced from `#[utoipa::path]`
//! response bodies only.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ChatRoom, Customization, Order, Product, User};

/// OpenAPI schema for [`pagination::PageInfo`].
#[derive(ToSchema)]
#[schema(as = PageInfo)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PageInfoSchema {
    /// One-based number of the returned page.
    #[schema(example = 1)]
    current: u32,
    /// Total number of pages for the current filter.
    #[schema(example = 3)]
    pages: u64,
    /// Total number of records matching the current filter.
    #[schema(example = 27)]
    total: u64,
}

macro_rules! page_schema {
    ($(#[$meta:meta])* $name:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(ToSchema)]
        #[expect(
            dead_code,
            reason = "Used only for OpenAPI schema generation via utoipa"
        )]
        pub struct $name {
            items: Vec<$item>,
            pagination: PageInfoSchema,
        }
    };
}

page_schema!(
    /// A page of accounts.
    UserPage, User
);
page_schema!(
    /// A page of product listings.
    ProductPage, Product
);
page_schema!(
    /// A page of orders.
    OrderPage, Order
);
page_schema!(
    /// A page of customization requests.
    CustomizationPage, Customization
);
page_schema!(
    /// A page of chat rooms.
    ChatRoomPage, ChatRoom
);

/// Plain acknowledgement body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Logged out successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler plus the schemas utoipa cannot
//! discover from path bodies alone (the page envelopes). The document backs
//! Swagger UI in debug builds and `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::schemas::{
    ChatRoomPage, CustomizationPage, MessageResponse, OrderPage, PageInfoSchema, ProductPage,
    UserPage,
};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Session cookie issued by POST /api/auth/login or /api/auth/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Karigari marketplace API",
        description = "Accounts, listings, orders, customization requests and chat for the Karigari artisan marketplace."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::auth::update_profile,
        crate::inbound::http::auth::change_password,
        crate::inbound::http::auth::create_admin,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::list_favorites,
        crate::inbound::http::users::add_favorite,
        crate::inbound::http::users::remove_favorite,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user_status,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::list_categories,
        crate::inbound::http::products::generate_description,
        crate::inbound::http::products::my_products,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::products::toggle_status,
        crate::inbound::http::products::upload_images,
        crate::inbound::http::products::moderate_product,
        crate::inbound::http::products::admin_delete_product,
        crate::inbound::http::uploads::product_image,
        crate::inbound::http::orders::place_order,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::customer_orders,
        crate::inbound::http::orders::artisan_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::override_status,
        crate::inbound::http::orders::artisan_status,
        crate::inbound::http::customizations::list_customizations,
        crate::inbound::http::customizations::customer_requests,
        crate::inbound::http::customizations::artisan_requests,
        crate::inbound::http::customizations::get_customization,
        crate::inbound::http::customizations::create_customization,
        crate::inbound::http::customizations::set_status,
        crate::inbound::http::customizations::submit_quote,
        crate::inbound::http::chat::list_rooms,
        crate::inbound::http::chat::open_room,
        crate::inbound::http::chat::get_room,
        crate::inbound::http::chat::post_message,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        MessageResponse,
        PageInfoSchema,
        UserPage,
        ProductPage,
        OrderPage,
        CustomizationPage,
        ChatRoomPage,
    )),
    tags(
        (name = "auth", description = "Registration, sign-in and the caller's own account"),
        (name = "users", description = "Account administration and favourites"),
        (name = "products", description = "Catalogue browsing and listing management"),
        (name = "uploads", description = "Stored product images"),
        (name = "orders", description = "Order placement and fulfilment"),
        (name = "customizations", description = "Bespoke order negotiation"),
        (name = "chat", description = "Conversations between participants"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

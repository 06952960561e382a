//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod chat;
pub mod customizations;
pub mod error;
pub mod health;
pub mod orders;
pub mod products;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod users;
pub mod validation;

use actix_web::web;

use crate::domain::PRODUCT_IMAGE_PATH;

pub use error::ApiResult;

/// Register every REST scope plus the product image route.
///
/// Static segments are registered ahead of `/{id}` so `/categories` and
/// `/artisan/...` are never read as identifiers. Callers supply the session
/// middleware, [`state::HttpState`] and the extractor configs from
/// [`validation`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::me)
            .service(auth::update_profile)
            .service(auth::change_password)
            .service(auth::create_admin),
    )
    .service(
        web::scope("/api/users")
            .service(users::list_users)
            .service(users::list_favorites)
            .service(users::add_favorite)
            .service(users::remove_favorite)
            .service(users::get_user)
            .service(users::update_user_status)
            .service(users::delete_user),
    )
    .service(
        web::scope("/api/products")
            .service(products::list_products)
            .service(products::create_product)
            .service(products::list_categories)
            .service(products::generate_description)
            .service(products::my_products)
            .service(products::get_product)
            .service(products::update_product)
            .service(products::delete_product)
            .service(products::toggle_status)
            .service(products::upload_images)
            .service(products::moderate_product)
            .service(products::admin_delete_product),
    )
    .service(
        web::scope("/api/orders")
            .service(orders::place_order)
            .service(orders::list_orders)
            .service(orders::customer_orders)
            .service(orders::artisan_orders)
            .service(orders::get_order)
            .service(orders::override_status)
            .service(orders::artisan_status),
    )
    .service(
        web::scope("/api/customizations")
            .service(customizations::list_customizations)
            .service(customizations::create_customization)
            .service(customizations::customer_requests)
            .service(customizations::artisan_requests)
            .service(customizations::get_customization)
            .service(customizations::set_status)
            .service(customizations::submit_quote),
    )
    .service(
        web::scope("/api/chat")
            .service(chat::list_rooms)
            .service(chat::open_room)
            .service(chat::get_room)
            .service(chat::post_message),
    )
    .service(web::scope(PRODUCT_IMAGE_PATH).service(uploads::product_image));
}

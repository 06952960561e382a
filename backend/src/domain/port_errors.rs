//! Translation of adapter errors into domain errors.
//!
//! Connection failures become 503, query failures 500. Variants carrying a
//! business meaning get the status each use case documents.

use super::Error;
use super::ports::{
    ChatRepositoryError, CustomizationRepositoryError, ImageStoreError, OrderRepositoryError,
    PasswordHasherError, ProductRepositoryError, UserRepositoryError,
};

/// Message returned when registering an email that is already taken.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "User with this email already exists";

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { .. } => Error::invalid_request(DUPLICATE_EMAIL_MESSAGE),
    }
}

pub(crate) fn map_product_error(error: ProductRepositoryError) -> Error {
    match error {
        ProductRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("product repository unavailable: {message}"))
        }
        ProductRepositoryError::Query { message } => {
            Error::internal(format!("product repository error: {message}"))
        }
    }
}

pub(crate) fn map_order_error(error: OrderRepositoryError) -> Error {
    match error {
        OrderRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("order repository unavailable: {message}"))
        }
        OrderRepositoryError::Query { message } => {
            Error::internal(format!("order repository error: {message}"))
        }
        OrderRepositoryError::DuplicateOrderNumber { number } => {
            Error::conflict(format!("order number {number} is already in use, please retry"))
        }
        OrderRepositoryError::InsufficientStock { product } => {
            Error::conflict(format!("Insufficient stock for product {product}"))
        }
        OrderRepositoryError::ProductMissing { product } => {
            Error::not_found(format!("Product {product} not found"))
        }
        OrderRepositoryError::StatusConflict { .. } => {
            Error::conflict("Order was modified by another request, please retry")
        }
    }
}

pub(crate) fn map_customization_error(error: CustomizationRepositoryError) -> Error {
    match error {
        CustomizationRepositoryError::Connection { message } => Error::service_unavailable(
            format!("customization repository unavailable: {message}"),
        ),
        CustomizationRepositoryError::Query { message } => {
            Error::internal(format!("customization repository error: {message}"))
        }
        CustomizationRepositoryError::Conflict { .. } => Error::conflict(
            "Customization request was modified by another request, please retry",
        ),
    }
}

pub(crate) fn map_chat_error(error: ChatRepositoryError) -> Error {
    match error {
        ChatRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("chat repository unavailable: {message}"))
        }
        ChatRepositoryError::Query { message } => {
            Error::internal(format!("chat repository error: {message}"))
        }
        ChatRepositoryError::DuplicateRoom { room_id } => {
            Error::conflict(format!("chat room {room_id} already exists"))
        }
    }
}

pub(crate) fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_image_error(error: ImageStoreError) -> Error {
    Error::internal(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(UserRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(UserRepositoryError::duplicate_email("a@b.co"), ErrorCode::InvalidRequest)]
    fn user_errors_map_to_codes(#[case] error: UserRepositoryError, #[case] code: ErrorCode) {
        assert_eq!(map_user_error(error).code(), code);
    }

    #[rstest]
    fn duplicate_email_uses_documented_message() {
        let error = map_user_error(UserRepositoryError::duplicate_email("a@b.co"));
        assert_eq!(error.message(), DUPLICATE_EMAIL_MESSAGE);
    }

    #[rstest]
    #[case(OrderRepositoryError::insufficient_stock("p1"), ErrorCode::Conflict)]
    #[case(OrderRepositoryError::status_conflict("o1"), ErrorCode::Conflict)]
    #[case(OrderRepositoryError::product_missing("p1"), ErrorCode::NotFound)]
    #[case(OrderRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
    fn order_errors_map_to_codes(#[case] error: OrderRepositoryError, #[case] code: ErrorCode) {
        assert_eq!(map_order_error(error).code(), code);
    }

    #[rstest]
    fn concurrent_customization_edits_are_conflicts() {
        let error = map_customization_error(CustomizationRepositoryError::conflict("c1"));
        assert_eq!(error.code(), ErrorCode::Conflict);
    }
}

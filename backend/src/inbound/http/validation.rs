//! Shared validation helpers for inbound HTTP adapters.
//!
//! Handlers receive raw strings for path segments and query filters and
//! turn them into domain values here, so every rejection carries the same
//! `{ field, code, value? }` details payload.

use std::str::FromStr;

use actix_web::{HttpRequest, web};
use chrono::{DateTime, Utc};
use pagination::{PageDefaults, PageRequest, PageRequestError};
use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidValue,
    InvalidPage,
    MalformedBody,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidPage => "invalid_page",
            ErrorCode::MalformedBody => "malformed_body",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

/// A field that failed a domain rule; `message` is the rule's own wording.
pub(crate) fn field_error(field: FieldName, message: impl Into<String>) -> Error {
    ValidationError::new(field.as_str(), message).with_code(ErrorCode::InvalidValue)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

/// Parse a UUID-backed identifier from a path segment or payload field.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value
        .parse::<T>()
        .map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn invalid_value_error(field: FieldName, value: &str, expected: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be one of: {expected}"))
        .with_value(ErrorCode::InvalidValue, value)
}

/// Parse an optional enumerated filter with the domain's own parser.
///
/// Blank values count as absent so `?status=` behaves like no filter.
pub(crate) fn parse_filter<T>(
    value: Option<&str>,
    field: FieldName,
    expected: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, Error> {
    match value.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse(raw)
            .map(Some)
            .ok_or_else(|| invalid_value_error(field, raw, expected)),
        None => Ok(None),
    }
}

/// Trim a free-text filter, dropping it when blank.
pub(crate) fn search_term(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be an RFC 3339 timestamp"))
        .with_value(ErrorCode::InvalidTimestamp, value)
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| invalid_timestamp_error(field, value))
}

/// Build a page request from `page` and `limit` query values.
pub(crate) fn page_request(
    page: Option<u32>,
    limit: Option<u32>,
    defaults: PageDefaults,
) -> Result<PageRequest, Error> {
    PageRequest::from_query(page, limit, defaults).map_err(|err| {
        let field = match err {
            PageRequestError::ZeroPage => "page",
            PageRequestError::ZeroLimit => "limit",
        };
        ValidationError::new(field, err.to_string()).with_code(ErrorCode::InvalidPage)
    })
}

fn malformed(kind: &str, detail: String) -> actix_web::Error {
    ValidationError::new(kind, detail)
        .with_code(ErrorCode::MalformedBody)
        .into()
}

/// JSON extractor configuration reporting malformed bodies as API errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req: &HttpRequest| malformed("body", err.to_string()))
}

/// Query extractor configuration reporting malformed query strings as API
/// errors.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req: &HttpRequest| malformed("query", err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as ApiErrorCode, OrderStatus, UserId};
    use rstest::rstest;
    use serde_json::Value;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a Value> {
        error.details().and_then(|details| details.get(key))
    }

    #[rstest]
    fn parse_id_reports_field_and_value() {
        let err = parse_id::<UserId>("nope", FieldName::new("id")).expect_err("invalid");

        assert_eq!(err.code(), ApiErrorCode::InvalidRequest);
        assert_eq!(err.message(), "id must be a valid UUID");
        assert_eq!(detail(&err, "value"), Some(&Value::from("nope")));
        assert_eq!(detail(&err, "code"), Some(&Value::from("invalid_uuid")));
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some(" shipped "), Some(OrderStatus::Shipped))]
    fn filters_parse_or_fall_back_to_none(
        #[case] raw: Option<&str>,
        #[case] expected: Option<OrderStatus>,
    ) {
        let parsed = parse_filter(raw, FieldName::new("status"), "…", OrderStatus::parse)
            .expect("valid filter");

        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn unknown_filter_values_are_rejected() {
        let err = parse_filter(
            Some("lost"),
            FieldName::new("status"),
            "pending|shipped",
            OrderStatus::parse,
        )
        .expect_err("unknown status");

        assert_eq!(err.message(), "status must be one of: pending|shipped");
        assert_eq!(detail(&err, "field"), Some(&Value::from("status")));
    }

    #[rstest]
    #[case(Some(0), None, "page")]
    #[case(None, Some(0), "limit")]
    fn zero_pages_are_rejected(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] field: &str,
    ) {
        let err = page_request(page, limit, PageDefaults::STANDARD).expect_err("zero");

        assert_eq!(detail(&err, "field"), Some(&Value::from(field)));
        assert_eq!(detail(&err, "code"), Some(&Value::from("invalid_page")));
    }

    #[rstest]
    fn timestamps_must_be_rfc3339() {
        let field = FieldName::new("estimatedDelivery");

        assert!(parse_rfc3339_timestamp("2025-01-10T12:00:00Z", field).is_ok());
        let err = parse_rfc3339_timestamp("next week", field).expect_err("invalid");
        assert_eq!(err.message(), "estimatedDelivery must be an RFC 3339 timestamp");
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("   "), None)]
    #[case(Some(" vase "), Some("vase"))]
    fn search_terms_are_trimmed(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(
            search_term(raw.map(str::to_owned)).as_deref(),
            expected
        );
    }
}

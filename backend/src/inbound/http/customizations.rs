//! Bespoke customization request handlers.

use actix_web::{HttpResponse, get, post, put, web};
use pagination::{Page, PageDefaults};
use serde::{Deserialize, Serialize};

use crate::domain::ports::CustomizationQuery;
use crate::domain::{
    Customization, CustomizationId, CustomizationRequest, CustomizationStatus, Error, Money,
    Priority, ProductId, QuoteDraft, RequestDetails, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::CustomizationPage;
use crate::inbound::http::session::CurrentActor;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, field_error, missing_field_error, page_request, parse_filter, parse_id,
    parse_rfc3339_timestamp,
};

const CUSTOMIZATION_STATUSES: &str =
    "pending|under-review|quoted|accepted|rejected|in-progress|completed|cancelled";

/// Query string for `GET /api/customizations`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCustomizationsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub customer: Option<String>,
    pub artisan: Option<String>,
}

/// Query string for the participant request lists.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MyRequestsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Body for `POST /api/customizations`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCustomizationRequest {
    pub artisan: Option<String>,
    pub product: Option<String>,
    pub request_details: Option<RequestDetails>,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
}

/// Body for `PUT /api/customizations/{id}/status`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct CustomizationStatusRequest {
    pub status: Option<String>,
    pub note: Option<String>,
}

/// Body for `PUT /api/customizations/{id}/quote`; amounts are minor units.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteRequest {
    pub base_price: Option<i64>,
    pub customization_fee: Option<i64>,
    pub material_cost: Option<i64>,
    pub labor_cost: Option<i64>,
    pub currency: Option<String>,
    /// RFC 3339 timestamp.
    pub valid_until: Option<String>,
    pub terms: Option<String>,
    /// Note for the customer.
    pub message: Option<String>,
}

fn customization_id(raw: &str) -> Result<CustomizationId, Error> {
    parse_id(raw, FieldName::new("id"))
}

fn optional_user(value: Option<&str>, field: &'static str) -> Result<Option<UserId>, Error> {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_id(raw, FieldName::new(field)))
        .transpose()
}

fn amount(value: Option<i64>, field: &'static str) -> Result<Money, Error> {
    Money::from_minor(value.unwrap_or_default())
        .map_err(|_| field_error(FieldName::new(field), format!("{field} must not be negative")))
}

impl TryFrom<CreateCustomizationRequest> for CustomizationRequest {
    type Error = Error;

    fn try_from(value: CreateCustomizationRequest) -> Result<Self, Self::Error> {
        let artisan_field = FieldName::new("artisan");
        let product_field = FieldName::new("product");
        let artisan = value
            .artisan
            .ok_or_else(|| missing_field_error(artisan_field))?;
        let product = value
            .product
            .ok_or_else(|| missing_field_error(product_field))?;
        Ok(Self {
            artisan: parse_id(&artisan, artisan_field)?,
            product: parse_id::<ProductId>(&product, product_field)?,
            request_details: value
                .request_details
                .ok_or_else(|| missing_field_error(FieldName::new("requestDetails")))?,
            priority: value.priority.unwrap_or_default(),
            tags: value.tags,
        })
    }
}

impl QuoteRequest {
    fn into_parts(self) -> Result<(QuoteDraft, Option<String>), Error> {
        let base_field = FieldName::new("basePrice");
        if self.base_price.is_none() {
            return Err(missing_field_error(base_field));
        }
        let valid_until = self
            .valid_until
            .as_deref()
            .map(|raw| parse_rfc3339_timestamp(raw, FieldName::new("validUntil")))
            .transpose()?;
        let draft = QuoteDraft {
            base_price: amount(self.base_price, "basePrice")?,
            customization_fee: amount(self.customization_fee, "customizationFee")?,
            material_cost: amount(self.material_cost, "materialCost")?,
            labor_cost: amount(self.labor_cost, "laborCost")?,
            currency: self.currency,
            valid_until,
            terms: self.terms,
        };
        Ok((draft, self.message))
    }
}

/// Every request, newest first. Admin only.
#[utoipa::path(
    get,
    path = "/api/customizations",
    params(ListCustomizationsQuery),
    responses(
        (status = 200, description = "Requests", body = CustomizationPage),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 403, description = "Admin access required", body = Error)
    ),
    tags = ["customizations"],
    operation_id = "listCustomizations"
)]
#[get("")]
pub async fn list_customizations(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    query: web::Query<ListCustomizationsQuery>,
) -> ApiResult<web::Json<Page<Customization>>> {
    let query = query.into_inner();
    let page = page_request(query.page, query.limit, PageDefaults::STANDARD)?;
    let filter = CustomizationQuery {
        status: parse_filter(
            query.status.as_deref(),
            FieldName::new("status"),
            CUSTOMIZATION_STATUSES,
            CustomizationStatus::parse,
        )?,
        customer: optional_user(query.customer.as_deref(), "customer")?,
        artisan: optional_user(query.artisan.as_deref(), "artisan")?,
    };
    state
        .customizations
        .list(&actor, &filter, page)
        .await
        .map(web::Json)
}

#[utoipa::path(
    get,
    path = "/api/customizations/customer/my-requests",
    params(MyRequestsQuery),
    responses(
        (status = 200, description = "Requests opened by the caller", body = CustomizationPage),
        (status = 403, description = "Customer access required", body = Error)
    ),
    tags = ["customizations"],
    operation_id = "customerCustomizations"
)]
#[get("/customer/my-requests")]
pub async fn customer_requests(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    query: web::Query<MyRequestsQuery>,
) -> ApiResult<web::Json<Page<Customization>>> {
    let page = page_request(query.page, query.limit, PageDefaults::STANDARD)?;
    state
        .customizations
        .customer_requests(&actor, page)
        .await
        .map(web::Json)
}

#[utoipa::path(
    get,
    path = "/api/customizations/artisan/my-requests",
    params(MyRequestsQuery),
    responses(
        (status = 200, description = "Requests addressed to the caller", body = CustomizationPage),
        (status = 403, description = "Artisan access required", body = Error)
    ),
    tags = ["customizations"],
    operation_id = "artisanCustomizations"
)]
#[get("/artisan/my-requests")]
pub async fn artisan_requests(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    query: web::Query<MyRequestsQuery>,
) -> ApiResult<web::Json<Page<Customization>>> {
    let page = page_request(query.page, query.limit, PageDefaults::STANDARD)?;
    state
        .customizations
        .artisan_requests(&actor, page)
        .await
        .map(web::Json)
}

#[utoipa::path(
    get,
    path = "/api/customizations/{id}",
    params(("id" = String, Path, description = "Customization identifier")),
    responses(
        (status = 200, description = "Request", body = Customization),
        (status = 403, description = "Access denied", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["customizations"],
    operation_id = "getCustomization"
)]
#[get("/{id}")]
pub async fn get_customization(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<Customization>> {
    let id = customization_id(&path)?;
    state.customizations.get(&actor, &id).await.map(web::Json)
}

/// Open a request against a listing. Customers only.
#[utoipa::path(
    post,
    path = "/api/customizations",
    request_body = CreateCustomizationRequest,
    responses(
        (status = 201, description = "Request opened", body = Customization),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Only customers can create customization requests", body = Error),
        (status = 404, description = "Product not found", body = Error)
    ),
    tags = ["customizations"],
    operation_id = "createCustomization"
)]
#[post("")]
pub async fn create_customization(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    payload: web::Json<CreateCustomizationRequest>,
) -> ApiResult<HttpResponse> {
    let request = CustomizationRequest::try_from(payload.into_inner())?;
    let customization = state.customizations.create(&actor, request).await?;
    Ok(HttpResponse::Created().json(customization))
}

/// Participants and admins may set any status; each change is logged.
#[utoipa::path(
    put,
    path = "/api/customizations/{id}/status",
    params(("id" = String, Path, description = "Customization identifier")),
    request_body = CustomizationStatusRequest,
    responses(
        (status = 200, description = "Updated request", body = Customization),
        (status = 400, description = "Invalid status", body = Error),
        (status = 403, description = "Access denied", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["customizations"],
    operation_id = "setCustomizationStatus"
)]
#[put("/{id}/status")]
pub async fn set_status(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
    payload: web::Json<CustomizationStatusRequest>,
) -> ApiResult<web::Json<Customization>> {
    let id = customization_id(&path)?;
    let CustomizationStatusRequest { status, note } = payload.into_inner();
    let field = FieldName::new("status");
    let status = parse_filter(
        status.as_deref(),
        field,
        CUSTOMIZATION_STATUSES,
        CustomizationStatus::parse,
    )?
    .ok_or_else(|| missing_field_error(field))?;
    state
        .customizations
        .set_status(&actor, &id, status, note)
        .await
        .map(web::Json)
}

/// The addressed artisan prices the request and marks it quoted.
#[utoipa::path(
    put,
    path = "/api/customizations/{id}/quote",
    params(("id" = String, Path, description = "Customization identifier")),
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Quoted request", body = Customization),
        (status = 400, description = "Invalid quote", body = Error),
        (status = 403, description = "Not the addressed artisan", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["customizations"],
    operation_id = "quoteCustomization"
)]
#[put("/{id}/quote")]
pub async fn submit_quote(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
    payload: web::Json<QuoteRequest>,
) -> ApiResult<web::Json<Customization>> {
    let id = customization_id(&path)?;
    let (draft, message) = payload.into_inner().into_parts()?;
    state
        .customizations
        .quote(&actor, &id, draft, message)
        .await
        .map(web::Json)
}

#[cfg(test)]
mod tests;

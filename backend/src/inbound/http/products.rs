//! Catalogue handlers: public browsing, artisan listing management, image
//! uploads and admin moderation.
//!
//! Prices are integer minor currency units on the wire.
//!
//! ```text
//! GET  /api/products?category=Pottery&minPrice=500&sortBy=price&sortOrder=asc
//! POST /api/products {"title":"Blue vase","description":"...","category":"Pottery","price":1200,"stock":3}
//! POST /api/products/{id}/images   (multipart, field "images")
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use futures_util::TryStreamExt;
use pagination::{Page, PageDefaults};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{ProductQuery, ProductSortField, SortDirection};
use crate::domain::{
    Category, CustomizationOptions, DescriptionRequest, Error, GeneratedDescription, ImageFormat,
    MAX_IMAGE_BYTES, MAX_IMAGES_PER_UPLOAD, MAX_STOCK, Money, Product, ProductDraft, ProductId,
    ProductPatch, ProductStatus, ShippingTerms,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ProductPage;
use crate::inbound::http::session::{CurrentActor, MaybeActor};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, field_error, invalid_value_error, missing_field_error, page_request, parse_filter,
    parse_id, search_term,
};

const CATEGORIES: &str = "Pottery|Textiles|Jewelry|Woodwork|Metalcraft|Paintings|Sculptures|\
                          Home Decor|Handicrafts|Traditional Art|Modern Art";
const PRODUCT_STATUSES: &str =
    "draft|published|pending|approved|rejected|out-of-stock|discontinued";
const SORT_FIELDS: &str = "createdAt|price|title";
const SORT_ORDERS: &str = "asc|desc";
const IMAGE_FIELD: &str = "images";

/// Query string for `GET /api/products`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct CatalogueQuery {
    pub page: Option<u32>,
    /// Defaults to 12.
    pub limit: Option<u32>,
    pub category: Option<String>,
    /// Minor currency units.
    pub min_price: Option<i64>,
    /// Minor currency units.
    pub max_price: Option<i64>,
    pub search: Option<String>,
    /// `createdAt` (default), `price` or `title`.
    pub sort_by: Option<String>,
    /// `desc` (default) or `asc`.
    pub sort_order: Option<String>,
}

/// Query string for `GET /api/products/artisan/my-products`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArtisanProductsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub category: Option<String>,
}

/// Body for `POST /api/products`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub materials: Option<String>,
    pub size: Option<String>,
    /// Minor currency units.
    pub price: Option<i64>,
    pub original_price: Option<i64>,
    pub stock: Option<i64>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub customizable: bool,
    pub customization_options: CustomizationOptions,
    /// Defaults to `published`.
    pub status: Option<String>,
    pub shipping: Option<ShippingTerms>,
}

/// Body for `PUT /api/products/{id}`; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub materials: Option<String>,
    pub size: Option<String>,
    pub price: Option<i64>,
    pub original_price: Option<i64>,
    pub stock: Option<i64>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub customizable: Option<bool>,
    pub customization_options: Option<CustomizationOptions>,
    pub status: Option<String>,
    pub shipping: Option<ShippingTerms>,
}

/// Body for `POST /api/products/generate-description`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct DescriptionBody {
    pub category: String,
    pub materials: String,
    pub title: Option<String>,
}

/// Body for `PUT /api/products/{id}/status`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ModerateProductRequest {
    pub status: Option<String>,
    pub rejection_reason: Option<String>,
}

/// Listing plus a human-readable summary of what changed.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ToggleResponse {
    pub message: String,
    pub product: Product,
}

fn parse_category(value: Option<&str>) -> Result<Option<Category>, Error> {
    parse_filter(value, FieldName::new("category"), CATEGORIES, Category::parse)
}

fn parse_status(value: Option<&str>) -> Result<Option<ProductStatus>, Error> {
    parse_filter(
        value,
        FieldName::new("status"),
        PRODUCT_STATUSES,
        ProductStatus::parse,
    )
}

fn parse_money(value: Option<i64>, field: &'static str) -> Result<Option<Money>, Error> {
    value
        .map(|minor| {
            Money::from_minor(minor)
                .map_err(|_| field_error(FieldName::new(field), format!("{field} must not be negative")))
        })
        .transpose()
}

/// Stock must fit the `INTEGER` column the listing is stored in.
fn parse_stock(value: Option<i64>) -> Result<Option<u32>, Error> {
    value
        .map(|stock| {
            u32::try_from(stock)
                .ok()
                .filter(|stock| *stock <= MAX_STOCK)
                .ok_or_else(|| {
                    field_error(
                        FieldName::new("stock"),
                        format!("stock must be a whole number between 0 and {MAX_STOCK}"),
                    )
                })
        })
        .transpose()
}

fn sort_field(value: Option<&str>) -> Result<ProductSortField, Error> {
    let field = parse_filter(value, FieldName::new("sortBy"), SORT_FIELDS, |raw| match raw {
        "createdAt" => Some(ProductSortField::CreatedAt),
        "price" => Some(ProductSortField::Price),
        "title" => Some(ProductSortField::Title),
        _ => None,
    })?;
    Ok(field.unwrap_or_default())
}

fn sort_direction(value: Option<&str>) -> Result<SortDirection, Error> {
    let direction = parse_filter(value, FieldName::new("sortOrder"), SORT_ORDERS, |raw| {
        match raw {
            "asc" => Some(SortDirection::Ascending),
            "desc" => Some(SortDirection::Descending),
            _ => None,
        }
    })?;
    Ok(direction.unwrap_or_default())
}

fn product_id(raw: &str) -> Result<ProductId, Error> {
    parse_id(raw, FieldName::new("id"))
}

impl TryFrom<CreateProductRequest> for ProductDraft {
    type Error = Error;

    fn try_from(value: CreateProductRequest) -> Result<Self, Self::Error> {
        let required = |field: &'static str| missing_field_error(FieldName::new(field));
        Ok(Self {
            title: value.title.ok_or_else(|| required("title"))?,
            description: value.description,
            category: parse_category(value.category.as_deref())?
                .ok_or_else(|| required("category"))?,
            subcategory: value.subcategory,
            materials: value.materials,
            size: value.size,
            price: parse_money(value.price, "price")?.ok_or_else(|| required("price"))?,
            original_price: parse_money(value.original_price, "originalPrice")?,
            stock: parse_stock(value.stock)?.ok_or_else(|| required("stock"))?,
            images: value.images,
            tags: value.tags,
            customizable: value.customizable,
            customization_options: value.customization_options,
            status: parse_status(value.status.as_deref())?.unwrap_or(ProductStatus::Published),
            shipping: value.shipping.unwrap_or_default(),
        })
    }
}

impl TryFrom<UpdateProductRequest> for ProductPatch {
    type Error = Error;

    fn try_from(value: UpdateProductRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title,
            description: value.description,
            category: parse_category(value.category.as_deref())?,
            subcategory: value.subcategory,
            materials: value.materials,
            size: value.size,
            price: parse_money(value.price, "price")?,
            original_price: parse_money(value.original_price, "originalPrice")?,
            stock: parse_stock(value.stock)?,
            images: value.images,
            tags: value.tags,
            customizable: value.customizable,
            customization_options: value.customization_options,
            status: parse_status(value.status.as_deref())?,
            shipping: value.shipping,
        })
    }
}

/// Public catalogue: published and approved listings only.
#[utoipa::path(
    get,
    path = "/api/products",
    params(CatalogueQuery),
    responses(
        (status = 200, description = "Listings", body = ProductPage),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["products"],
    operation_id = "browseProducts",
    security([])
)]
#[get("")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<CatalogueQuery>,
) -> ApiResult<web::Json<Page<Product>>> {
    let query = query.into_inner();
    let page = page_request(query.page, query.limit, PageDefaults::CATALOGUE)?;
    let filter = ProductQuery {
        category: parse_category(query.category.as_deref())?,
        min_price: parse_money(query.min_price, "minPrice")?,
        max_price: parse_money(query.max_price, "maxPrice")?,
        search: search_term(query.search),
        sort_by: sort_field(query.sort_by.as_deref())?,
        direction: sort_direction(query.sort_order.as_deref())?,
        ..ProductQuery::default()
    };
    state.catalogue.browse(filter, page).await.map(web::Json)
}

#[utoipa::path(
    get,
    path = "/api/products/categories",
    responses((status = 200, description = "Every category", body = [Category])),
    tags = ["products"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(state: web::Data<HttpState>) -> web::Json<Vec<Category>> {
    web::Json(state.catalogue.categories())
}

/// Suggest a description and tags for a draft listing.
#[utoipa::path(
    post,
    path = "/api/products/generate-description",
    request_body = DescriptionBody,
    responses(
        (status = 200, description = "Generated copy", body = GeneratedDescription),
        (status = 400, description = "Category and materials are required", body = Error),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["products"],
    operation_id = "generateDescription"
)]
#[post("/generate-description")]
pub async fn generate_description(
    state: web::Data<HttpState>,
    _actor: CurrentActor,
    payload: web::Json<DescriptionBody>,
) -> ApiResult<web::Json<GeneratedDescription>> {
    let request =
        DescriptionRequest::try_new(&payload.category, &payload.materials, payload.title.as_deref())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
    Ok(web::Json(state.catalogue.describe(&request)))
}

/// The caller's own listings in any status.
#[utoipa::path(
    get,
    path = "/api/products/artisan/my-products",
    params(ArtisanProductsQuery),
    responses(
        (status = 200, description = "Own listings", body = ProductPage),
        (status = 403, description = "Artisan access required", body = Error)
    ),
    tags = ["products"],
    operation_id = "myProducts"
)]
#[get("/artisan/my-products")]
pub async fn my_products(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    query: web::Query<ArtisanProductsQuery>,
) -> ApiResult<web::Json<Page<Product>>> {
    let query = query.into_inner();
    let page = page_request(query.page, query.limit, PageDefaults::STANDARD)?;
    let filter = ProductQuery {
        statuses: parse_status(query.status.as_deref())?.into_iter().collect(),
        category: parse_category(query.category.as_deref())?,
        ..ProductQuery::default()
    };
    state
        .catalogue
        .artisan_products(&actor, filter, page)
        .await
        .map(web::Json)
}

/// Fetch one listing and count the view.
///
/// Listings outside the public catalogue are only shown to their owner and
/// to admins.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "Listing", body = Product),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "getProduct",
    security([])
)]
#[get("/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    MaybeActor(viewer): MaybeActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<Product>> {
    let id = product_id(&path)?;
    state
        .catalogue
        .view(&id, viewer.as_ref())
        .await
        .map(web::Json)
}

/// Create a listing. Approved artisans only.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Created", body = Product),
        (status = 400, description = "Invalid listing", body = Error),
        (status = 403, description = "Approved artisan access required", body = Error)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("")]
pub async fn create_product(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    payload: web::Json<CreateProductRequest>,
) -> ApiResult<HttpResponse> {
    actor.require_approved_artisan()?;
    let draft = ProductDraft::try_from(payload.into_inner())?;
    let product = state.catalogue.create(&actor, draft).await?;
    Ok(HttpResponse::Created().json(product))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product identifier")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated", body = Product),
        (status = 400, description = "Invalid listing", body = Error),
        (status = 404, description = "Not found or not owned", body = Error)
    ),
    tags = ["products"],
    operation_id = "updateProduct"
)]
#[put("/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
    payload: web::Json<UpdateProductRequest>,
) -> ApiResult<web::Json<Product>> {
    let id = product_id(&path)?;
    let patch = ProductPatch::try_from(payload.into_inner())?;
    state
        .catalogue
        .update(&actor, &id, patch)
        .await
        .map(web::Json)
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found or not owned", body = Error)
    ),
    tags = ["products"],
    operation_id = "deleteProduct"
)]
#[delete("/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = product_id(&path)?;
    state.catalogue.delete(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Flip an owned listing between draft and published.
#[utoipa::path(
    put,
    path = "/api/products/{id}/toggle-status",
    params(("id" = String, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "Toggled", body = ToggleResponse),
        (status = 400, description = "Listing cannot be published", body = Error),
        (status = 404, description = "Not found or not owned", body = Error)
    ),
    tags = ["products"],
    operation_id = "toggleProductStatus"
)]
#[put("/{id}/toggle-status")]
pub async fn toggle_status(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<ToggleResponse>> {
    let id = product_id(&path)?;
    let outcome = state.catalogue.toggle_publication(&actor, &id).await?;
    Ok(web::Json(ToggleResponse {
        message: outcome.message.to_owned(),
        product: outcome.product,
    }))
}

async fn read_images(mut payload: Multipart) -> Result<Vec<(ImageFormat, Vec<u8>)>, Error> {
    let mut images = Vec::new();
    while let Some(mut field) = payload.try_next().await.map_err(malformed_upload)? {
        let file_name = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(str::to_owned);
        let Some(file_name) = file_name else {
            continue;
        };
        if field.name() != Some(IMAGE_FIELD) {
            return Err(field_error(
                FieldName::new("images"),
                format!("unexpected upload field for {file_name}"),
            ));
        }
        if images.len() == MAX_IMAGES_PER_UPLOAD {
            return Err(field_error(
                FieldName::new("images"),
                format!("at most {MAX_IMAGES_PER_UPLOAD} images per upload"),
            ));
        }
        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_owned())
            .unwrap_or_default();
        let format = ImageFormat::from_upload(&file_name, &content_type).ok_or_else(|| {
            invalid_value_error(FieldName::new("images"), &file_name, "jpeg|jpg|png|webp")
        })?;
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed_upload)? {
            if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(field_error(
                    FieldName::new("images"),
                    format!("{file_name} exceeds {MAX_IMAGE_BYTES} bytes"),
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        debug!(file = %file_name, size = bytes.len(), "received product image");
        images.push((format, bytes));
    }
    Ok(images)
}

fn malformed_upload(err: actix_multipart::MultipartError) -> Error {
    Error::invalid_request(format!("malformed upload: {err}"))
}

/// Attach images to an owned listing.
///
/// Accepts up to six `images` parts of at most 5 MiB each; the file
/// extension and content type must both be JPEG, PNG or WebP.
#[utoipa::path(
    post,
    path = "/api/products/{id}/images",
    params(("id" = String, Path, description = "Product identifier")),
    request_body(content_type = "multipart/form-data", description = "One or more `images` file parts"),
    responses(
        (status = 200, description = "Listing with the new image URIs appended", body = Product),
        (status = 400, description = "Rejected upload", body = Error),
        (status = 404, description = "Not found or not owned", body = Error)
    ),
    tags = ["products"],
    operation_id = "uploadProductImages"
)]
#[post("/{id}/images")]
pub async fn upload_images(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<Product>> {
    let id = product_id(&path)?;
    let images = read_images(payload).await?;
    state
        .catalogue
        .add_images(&actor, &id, images)
        .await
        .map(web::Json)
}

/// Admin moderation; the rejection reason is kept only for rejections.
#[utoipa::path(
    put,
    path = "/api/products/{id}/status",
    params(("id" = String, Path, description = "Product identifier")),
    request_body = ModerateProductRequest,
    responses(
        (status = 200, description = "Moderated", body = Product),
        (status = 400, description = "Invalid status", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "moderateProduct"
)]
#[put("/{id}/status")]
pub async fn moderate_product(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
    payload: web::Json<ModerateProductRequest>,
) -> ApiResult<web::Json<Product>> {
    let id = product_id(&path)?;
    let ModerateProductRequest {
        status,
        rejection_reason,
    } = payload.into_inner();
    let status =
        parse_status(status.as_deref())?.ok_or_else(|| missing_field_error(FieldName::new("status")))?;
    state
        .catalogue
        .moderate(&actor, &id, status, rejection_reason)
        .await
        .map(web::Json)
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/admin",
    params(("id" = String, Path, description = "Product identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "adminDeleteProduct"
)]
#[delete("/{id}/admin")]
pub async fn admin_delete_product(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = product_id(&path)?;
    state.catalogue.admin_delete(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

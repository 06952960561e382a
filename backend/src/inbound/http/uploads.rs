//! Serves stored product images under `/uploads/products`.

use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{HttpResponse, get, web};

use crate::domain::{Error, StoredImageName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Stored names embed a random UUID, so a name never changes content.
const IMMUTABLE: &str = "public, max-age=31536000, immutable";

#[utoipa::path(
    get,
    path = "/uploads/products/{file}",
    params(("file" = String, Path, description = "Stored image name, e.g. product-<uuid>.jpg")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "No such image", body = Error)
    ),
    tags = ["uploads"],
    operation_id = "productImage",
    security([])
)]
#[get("/{file}")]
pub async fn product_image(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let name = StoredImageName::parse(&path).ok_or_else(|| Error::not_found("Image not found"))?;
    let bytes = state.catalogue.image(&name).await?;
    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, name.format().content_type()))
        .insert_header((CACHE_CONTROL, IMMUTABLE))
        .body(bytes))
}

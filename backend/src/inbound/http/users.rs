//! Account administration and favorites handlers.
//!
//! ```text
//! GET    /api/users?role=artisan&status=pending
//! POST   /api/users/favorites {"productId":"..."}
//! PUT    /api/users/{id}/status {"status":"approved"}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::{Page, PageDefaults};
use serde::{Deserialize, Serialize};

use crate::domain::ports::UserQuery;
use crate::domain::{AccountStatus, Error, Product, ProductId, Role, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{MessageResponse, UserPage};
use crate::inbound::http::session::CurrentActor;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, page_request, parse_filter, parse_id, search_term,
};

const ROLES: &str = "customer|artisan|artisan-pending|admin";
const ACCOUNT_STATUSES: &str = "pending|approved|rejected|suspended";

/// Query string for `GET /api/users`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub role: Option<String>,
    pub status: Option<String>,
    /// Case-insensitive match on name or email.
    pub search: Option<String>,
}

/// Body for `POST /api/users/favorites`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    #[serde(default)]
    pub product_id: Option<String>,
}

/// Body for `PUT /api/users/{id}/status`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AccountStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// Favorite products, in the order they were added.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FavoritesResponse {
    pub favorites: Vec<Product>,
}

/// List accounts, newest first. Admin only.
#[utoipa::path(
    get,
    path = "/api/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Accounts", body = UserPage),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Admin access required", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("")]
pub async fn list_users(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<Page<User>>> {
    let ListUsersQuery {
        page,
        limit,
        role,
        status,
        search,
    } = query.into_inner();
    let page = page_request(page, limit, PageDefaults::STANDARD)?;
    let filter = UserQuery {
        role: parse_filter(role.as_deref(), FieldName::new("role"), ROLES, Role::parse)?,
        status: parse_filter(
            status.as_deref(),
            FieldName::new("status"),
            ACCOUNT_STATUSES,
            AccountStatus::parse,
        )?,
        search: search_term(search),
    };
    state.accounts.list(&actor, &filter, page).await.map(web::Json)
}

#[utoipa::path(
    get,
    path = "/api/users/favorites",
    responses(
        (status = 200, description = "Favorite products", body = FavoritesResponse),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "listFavorites"
)]
#[get("/favorites")]
pub async fn list_favorites(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<web::Json<FavoritesResponse>> {
    let favorites = state.accounts.favorites(&actor).await?;
    Ok(web::Json(FavoritesResponse { favorites }))
}

#[utoipa::path(
    post,
    path = "/api/users/favorites",
    request_body = FavoriteRequest,
    responses(
        (status = 200, description = "Added", body = MessageResponse),
        (status = 400, description = "Missing id or already a favorite", body = Error),
        (status = 404, description = "Product not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "addFavorite"
)]
#[post("/favorites")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    payload: web::Json<FavoriteRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let field = FieldName::new("productId");
    let raw = payload
        .into_inner()
        .product_id
        .ok_or_else(|| missing_field_error(field))?;
    let product: ProductId = parse_id(&raw, field)?;
    state.accounts.add_favorite(&actor, product).await?;
    Ok(web::Json(MessageResponse::new("Product added to favorites")))
}

#[utoipa::path(
    delete,
    path = "/api/users/favorites/{product_id}",
    params(("product_id" = String, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "Removed", body = MessageResponse),
        (status = 400, description = "Invalid id", body = Error)
    ),
    tags = ["users"],
    operation_id = "removeFavorite"
)]
#[delete("/favorites/{product_id}")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let product: ProductId = parse_id(&path, FieldName::new("productId"))?;
    state.accounts.remove_favorite(&actor, product).await?;
    Ok(web::Json(MessageResponse::new("Product removed from favorites")))
}

/// Any signed-in account may look another one up.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Account", body = User),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id: UserId = parse_id(&path, FieldName::new("id"))?;
    state.accounts.get(&id).await.map(web::Json)
}

/// Approve, reject, suspend or reinstate an account. Admin only.
#[utoipa::path(
    put,
    path = "/api/users/{id}/status",
    params(("id" = String, Path, description = "User identifier")),
    request_body = AccountStatusRequest,
    responses(
        (status = 200, description = "Updated account", body = User),
        (status = 400, description = "Invalid status", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "moderateUser"
)]
#[put("/{id}/status")]
pub async fn update_user_status(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
    payload: web::Json<AccountStatusRequest>,
) -> ApiResult<web::Json<User>> {
    let id: UserId = parse_id(&path, FieldName::new("id"))?;
    let field = FieldName::new("status");
    let status = parse_filter(
        payload.status.as_deref(),
        field,
        ACCOUNT_STATUSES,
        AccountStatus::parse,
    )?
    .ok_or_else(|| missing_field_error(field))?;
    state
        .accounts
        .moderate(&actor, &id, status)
        .await
        .map(web::Json)
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: UserId = parse_id(&path, FieldName::new("id"))?;
    state.accounts.delete(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;

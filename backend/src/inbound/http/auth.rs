//! Authentication API handlers.
//!
//! ```text
//! POST /api/auth/register {"name":"Asha","email":"asha@example.com","password":"secret1"}
//! POST /api/auth/login    {"email":"asha@example.com","password":"secret1"}
//! GET  /api/auth/me
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AuthValidationError, Error, LoginCredentials, PasswordChange, PersonName, Profile,
    ProfileUpdate, Registration, Role, User, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::session::{CurrentActor, SessionContext};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, missing_field_error};

/// Registration body for `POST /api/auth/register`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `customer` (default) or `artisan`.
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// Login body for `POST /api/auth/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body for `PUT /api/auth/profile`; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// Body for `PUT /api/auth/change-password`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Optional body for `POST /api/auth/create-admin`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    #[serde(default)]
    pub password: Option<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = AuthValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_new(
            &value.name,
            &value.email,
            &value.password,
            value.role,
            value.profile.unwrap_or_default(),
        )
    }
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = AuthValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    let field = match err {
        UserValidationError::EmptyName | UserValidationError::NameTooLong { .. } => "name",
        UserValidationError::EmptyEmail | UserValidationError::InvalidEmail => "email",
        UserValidationError::RatingOutOfRange => "rating",
    };
    field_error(FieldName::new(field), err.to_string())
}

fn map_auth_validation_error(err: AuthValidationError) -> Error {
    match err {
        AuthValidationError::EmptyEmail => missing_field_error(FieldName::new("email")),
        AuthValidationError::EmptyPassword => missing_field_error(FieldName::new("password")),
        AuthValidationError::PasswordTooShort { .. } => {
            field_error(FieldName::new("password"), err.to_string())
        }
        AuthValidationError::RoleNotSelectable { .. } => {
            field_error(FieldName::new("role"), err.to_string())
        }
        AuthValidationError::User(inner) => map_user_validation_error(inner),
    }
}

/// Create a customer or artisan account and sign it in.
///
/// Artisans start `pending` until an admin approves them.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request or email taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_auth_validation_error)?;
    let user = state.accounts.register(registration).await?;
    session.persist_user(&user.id)?;
    Ok(HttpResponse::Created().json(user))
}

/// Check credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid email or password", body = Error),
        (status = 403, description = "Account suspended", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_auth_validation_error)?;
    let user = state.accounts.login(&credentials).await?;
    session.persist_user(&user.id)?;
    Ok(web::Json(user))
}

/// Drop the session. Succeeds whether or not one existed.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Logged out", body = MessageResponse)),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> web::Json<MessageResponse> {
    session.clear();
    web::Json(MessageResponse::new("Logout successful"))
}

/// The signed-in account.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current account", body = User),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Account suspended", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<web::Json<User>> {
    state.accounts.get(&actor.id).await.map(web::Json)
}

/// Update the caller's name and profile.
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["auth"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<User>> {
    let ProfileRequest { name, profile } = payload.into_inner();
    let name = name
        .map(PersonName::new)
        .transpose()
        .map_err(map_user_validation_error)?;
    let user = state
        .accounts
        .update_profile(&actor, ProfileUpdate { name, profile })
        .await?;
    Ok(web::Json(user))
}

/// Replace the caller's password after checking the current one.
#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password wrong or new one too short", body = Error),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["auth"],
    operation_id = "changePassword"
)]
#[put("/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let change = PasswordChange::try_new(&payload.current_password, &payload.new_password)
        .map_err(|err| match err {
            AuthValidationError::EmptyPassword => {
                missing_field_error(FieldName::new("currentPassword"))
            }
            other => field_error(FieldName::new("newPassword"), other.to_string()),
        })?;
    state.accounts.change_password(&actor, change).await?;
    Ok(web::Json(MessageResponse::new("Password changed successfully")))
}

/// Create the initial administrator. Refused once any admin exists.
#[utoipa::path(
    post,
    path = "/api/auth/create-admin",
    request_body(content = CreateAdminRequest, description = "Optional password override"),
    responses(
        (status = 201, description = "Admin created", body = User),
        (status = 400, description = "Admin already exists", body = Error)
    ),
    tags = ["auth"],
    operation_id = "createAdmin",
    security([])
)]
#[post("/create-admin")]
pub async fn create_admin(
    state: web::Data<HttpState>,
    payload: Option<web::Json<CreateAdminRequest>>,
) -> ApiResult<HttpResponse> {
    let password = payload.and_then(|body| body.into_inner().password);
    let admin = state
        .accounts
        .create_initial_admin(password.as_deref())
        .await?;
    Ok(HttpResponse::Created().json(admin))
}

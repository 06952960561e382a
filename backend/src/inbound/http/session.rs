//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! [`SessionContext`] wraps the Actix session so handlers only persist or
//! clear a user id. [`CurrentActor`] and [`MaybeActor`] resolve that id into
//! a freshly loaded [`Actor`] on every request.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Actor, Error, ErrorCode, UserId};

use super::state::HttpState;

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id, rotating the session.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match raw.parse::<UserId>() {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    warn!(%error, "invalid user id in session cookie");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("Not authenticated"))
    }

    /// Drop everything stored in the session.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Pull the session and shared state out of a request.
fn request_parts(
    req: &HttpRequest,
    payload: &mut Payload,
) -> LocalBoxFuture<'static, Result<(SessionContext, web::Data<HttpState>), Error>> {
    let session = SessionContext::from_request(req, payload);
    let state = req.app_data::<web::Data<HttpState>>().cloned();
    Box::pin(async move {
        let session = session
            .await
            .map_err(|error| Error::internal(format!("session unavailable: {error}")))?;
        let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
        Ok((session, state))
    })
}

/// The signed-in account, reloaded for this request.
///
/// Missing or stale sessions yield `401`; suspended accounts yield `403`.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl FromRequest for CurrentActor {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let parts = request_parts(req, payload);
        Box::pin(async move {
            let (session, state) = parts.await?;
            let id = session.require_user_id()?;
            match state.accounts.actor(&id).await {
                Ok(actor) => Ok(Self(actor)),
                Err(error) => {
                    if error.code() == ErrorCode::Unauthorized {
                        session.clear();
                    }
                    Err(error)
                }
            }
        })
    }
}

/// The signed-in account when there is one; anonymous otherwise.
#[derive(Debug, Clone)]
pub struct MaybeActor(pub Option<Actor>);

impl FromRequest for MaybeActor {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let parts = request_parts(req, payload);
        Box::pin(async move {
            let (session, state) = parts.await?;
            let Some(id) = session.user_id()? else {
                return Ok(Self(None));
            };
            match state.accounts.actor(&id).await {
                Ok(actor) => Ok(Self(Some(actor))),
                Err(error)
                    if matches!(error.code(), ErrorCode::Unauthorized | ErrorCode::Forbidden) =>
                {
                    Ok(Self(None))
                }
                Err(error) => Err(error),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountStatus;
    use crate::inbound::http::test_utils::{TestContext, test_session_middleware};
    use actix_web::cookie::Cookie;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};

    const FIXTURE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
        assert_eq!(response.status(), StatusCode::OK);
        response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|cookie| cookie.into_owned())
            .expect("session cookie set")
    }

    #[actix_web::test]
    async fn round_trips_user_id() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        let id: UserId = FIXTURE_ID.parse().expect("fixture id");
                        session.persist_user(&id)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        let id = session.require_user_id()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(id.to_string()))
                    }),
                ),
        )
        .await;

        let cookie = session_cookie(
            &test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await,
        );
        let response = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(test::read_body(response).await, FIXTURE_ID);
    }

    #[actix_web::test]
    async fn tampered_user_id_is_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set-invalid",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(USER_ID_KEY, "not-a-uuid")
                            .expect("set invalid user id");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/require",
                    web::get().to(|session: SessionContext| async move {
                        session.require_user_id()?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                ),
        )
        .await;

        let cookie = session_cookie(
            &test::call_service(&app, test::TestRequest::get().uri("/set-invalid").to_request()).await,
        );
        let response = test::call_service(
            &app,
            test::TestRequest::get().uri("/require").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn current_actor_reflects_moderation() {
        let context = TestContext::new();
        let user = context.customer("buyer@example.com").await;
        let id = user.id;
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(context.state())
                .route(
                    "/login",
                    web::get().to(move |session: SessionContext| async move {
                        session.persist_user(&id)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/whoami",
                    web::get().to(|actor: CurrentActor| async move {
                        HttpResponse::Ok().body(actor.0.id.to_string())
                    }),
                ),
        )
        .await;
        let cookie = session_cookie(
            &test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await,
        );

        let ok = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);

        context.set_status(id, AccountStatus::Suspended).await;
        let refused = test::call_service(
            &app,
            test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(refused.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn anonymous_requests_have_no_actor() {
        let context = TestContext::new();
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(context.state())
                .route(
                    "/",
                    web::get().to(|actor: MaybeActor| async move {
                        HttpResponse::Ok().body(actor.0.is_none().to_string())
                    }),
                ),
        )
        .await;

        let response = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(test::read_body(response).await, "true");
    }
}

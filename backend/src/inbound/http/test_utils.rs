//! Test helpers for inbound HTTP components.

use std::sync::{Arc, LazyLock};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};
use mockable::DefaultClock;
use serde_json::Value;
use tempfile::TempDir;

use crate::domain::ports::UserRepository;
use crate::domain::{
    AccountStatus, Actor, Category, Error, Money, Product, ProductDraft, ProductStatus, Profile,
    Registration, Role, ShippingTerms, User, UserId,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::validation::{json_config, query_config};
use crate::inbound::http::configure;
use crate::outbound::hashing::Argon2PasswordHasher;
use crate::outbound::memory::InMemoryStore;
use crate::outbound::storage::FsImageStore;

/// Password every account created through [`TestContext`] uses.
pub const TEST_PASSWORD: &str = "kiln-fired-7";

static TEST_KEY: LazyLock<Key> = LazyLock::new(Key::generate);

/// Build a session middleware configured for tests.
///
/// - Every instance shares one per-process key, so a cookie minted by
///   [`session_cookie_for`] is accepted by any test app.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), TEST_KEY.clone())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The full REST surface over `state`, as the server mounts it.
pub fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(test_session_middleware())
        .app_data(state)
        .app_data(json_config())
        .app_data(query_config())
        .configure(configure)
}

/// A session cookie signed in as `user`.
pub async fn session_cookie_for(user: UserId) -> Cookie<'static> {
    let app = test::init_service(App::new().wrap(test_session_middleware()).route(
        "/",
        web::get().to(move |session: SessionContext| async move {
            session.persist_user(&user)?;
            Ok::<_, Error>(HttpResponse::Ok().finish())
        }),
    ))
    .await;
    let response = test::call_service(&app, test::TestRequest::get().to_request()).await;
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Deserialize a response body as JSON.
pub async fn json_body(response: ServiceResponse) -> Value {
    let body = test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

/// In-memory services plus direct access to the backing store.
pub struct TestContext {
    store: Arc<InMemoryStore>,
    state: web::Data<HttpState>,
    _uploads: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let uploads = tempfile::tempdir().expect("upload dir");
        let store = Arc::new(InMemoryStore::new());
        let state = HttpState::new(
            HttpStatePorts {
                users: store.clone(),
                products: store.clone(),
                orders: store.clone(),
                customizations: store.clone(),
                chat: store.clone(),
                hasher: Arc::new(Argon2PasswordHasher::new()),
                images: Arc::new(FsImageStore::open(uploads.path()).expect("image store")),
                clock: Arc::new(DefaultClock),
            },
            500,
        );
        Self {
            store,
            state: web::Data::new(state),
            _uploads: uploads,
        }
    }

    pub fn state(&self) -> web::Data<HttpState> {
        self.state.clone()
    }

    /// Register an account with the given role.
    pub async fn register(&self, email: &str, role: Role) -> User {
        let registration =
            Registration::try_new("Test User", email, TEST_PASSWORD, Some(role), Profile::default())
                .expect("valid registration");
        self.state
            .accounts
            .register(registration)
            .await
            .expect("registered")
    }

    pub async fn customer(&self, email: &str) -> User {
        self.register(email, Role::Customer).await
    }

    /// Register an artisan and approve it.
    pub async fn approved_artisan(&self, email: &str) -> User {
        let user = self.register(email, Role::Artisan).await;
        self.set_status(user.id, AccountStatus::Approved).await
    }

    /// Create the initial admin account.
    pub async fn admin(&self) -> User {
        self.state
            .accounts
            .create_initial_admin(Some(TEST_PASSWORD))
            .await
            .expect("admin created")
    }

    /// Overwrite an account's moderation status in the store.
    pub async fn set_status(&self, id: UserId, status: AccountStatus) -> User {
        let user = self
            .store
            .find_by_id(&id)
            .await
            .expect("lookup")
            .expect("user exists");
        self.store
            .set_standing(&id, user.role, status, user.updated_at)
            .await
            .expect("update")
            .expect("user exists")
    }

    /// Publish a listing owned by `artisan`.
    pub async fn listing(&self, artisan: &User, title: &str, price: i64, stock: u32) -> Product {
        let draft = ProductDraft {
            title: title.to_owned(),
            description: Some(format!("{title}, made by hand")),
            category: Category::Pottery,
            subcategory: None,
            materials: Some("clay".to_owned()),
            size: None,
            price: Money::from_minor(price).expect("non-negative price"),
            original_price: None,
            stock,
            images: Vec::new(),
            tags: Vec::new(),
            customizable: true,
            customization_options: Default::default(),
            status: ProductStatus::Published,
            shipping: ShippingTerms::default(),
        };
        self.state
            .catalogue
            .create(&Actor::from(artisan), draft)
            .await
            .expect("listing created")
    }
}

//! Domain primitives, aggregates and use-case services.
//!
//! Purpose: define the strongly typed marketplace entities (accounts,
//! listings, orders, customization requests, chat rooms), the rules that
//! govern them and the services the HTTP layer drives. Persistence and other
//! side effects go through the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and its stable identifier.
//! - Actor: the authenticated account a request acts as.
//! - `*Service`: one service per area; each owns `Arc<dyn Port>` handles.
//! - Aggregates: User, Product, Order, Customization, ChatRoom.

pub mod account_service;
pub mod auth;
pub mod authorization;
pub mod catalogue_service;
pub mod chat;
pub mod chat_service;
pub mod customization;
pub mod customization_service;
pub mod description;
pub mod error;
pub mod ids;
pub mod media;
pub mod money;
pub mod order;
pub mod order_service;
pub(crate) mod port_errors;
pub mod ports;
pub mod product;
pub mod timeline;
pub mod trace_id;
pub mod user;

pub use self::account_service::{
    AccountService, INITIAL_ADMIN_EMAIL, INITIAL_ADMIN_PASSWORD, SeedAccount, SeedOutcome,
};
pub use self::auth::{
    AuthValidationError, LoginCredentials, PASSWORD_MIN, Password, PasswordChange, PasswordHash,
    Registration,
};
pub use self::authorization::Actor;
pub use self::catalogue_service::{CatalogueService, ToggleOutcome};
pub use self::chat::{
    ChatMessage, ChatRoom, ChatStatus, ChatType, ChatValidationError, EntityType, MessageType,
    NewChatRoom, Participant, ParticipantRole, RelatedEntity, RoomId,
};
pub use self::chat_service::{ChatService, OpenRoom, OpenedRoom};
pub use self::customization::{
    ArtisanResponse, Budget, Customization, CustomizationStatus, CustomizationValidationError,
    Dimensions, NewCustomization, Priority, Quote, QuoteDraft, RequestDetails, Specifications,
};
pub use self::customization_service::{CustomizationRequest, CustomizationService};
pub use self::description::{
    DEFAULT_ITEM_TITLE, DescriptionRequest, DescriptionRequestError, GeneratedDescription,
    generate_description,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{CustomizationId, MessageId, OrderId, ProductId, UserId};
pub use self::media::{
    ImageFormat, MAX_IMAGE_BYTES, MAX_IMAGES_PER_UPLOAD, PRODUCT_IMAGE_PATH, StoredImageName,
};
pub use self::money::{Money, NegativeAmount};
pub use self::order::{
    BillingAddress, ItemCustomizations, ItemStatus, MalformedOrderNumber, NewOrder, Order,
    OrderItem, OrderNotes, OrderNumber, OrderStatus, OrderTransitionError, OrderValidationError,
    Payment, PaymentMethod, PaymentStatus, Pricing, PricingError, Shipment, ShippingAddress,
    Tracking,
};
pub use self::order_service::{ArtisanStatusChange, LineRequest, OrderRequest, OrderService};
pub use self::port_errors::DUPLICATE_EMAIL_MESSAGE;
pub use self::product::{
    Category, CustomizationOptions, DEFAULT_CURRENCY, DEFAULT_PROCESSING_TIME, MAX_STOCK,
    Product, ProductDraft, ProductPatch, ProductStats, ProductStatus, ProductValidationError,
    ShippingTerms, slugify,
};
pub use self::timeline::{Timeline, TimelineEntry};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    AccountStatus, Address, EmailAddress, NAME_MAX, PersonName, Profile, ProfileUpdate, Role,
    SocialLinks, User, UserStats, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use karigari::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;

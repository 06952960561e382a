//! Tests for the customization service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockCustomizationRepository, MockProductRepository};
use crate::domain::{
    AccountStatus, Category, ErrorCode, Money, PersonName, Product, ProductDraft, ProductStatus,
    Role, Specifications,
};
use chrono::{DateTime, TimeZone, Utc};
use mockable::MockClock;
use rstest::{fixture, rstest};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 15, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn clock(now: DateTime<Utc>) -> Arc<MockClock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(now);
    Arc::new(clock)
}

fn actor(role: Role) -> Actor {
    Actor {
        id: UserId::random(),
        name: PersonName::new("Ravi").expect("valid name"),
        role,
        status: AccountStatus::Approved,
    }
}

fn details() -> RequestDetails {
    RequestDetails {
        title: "Engraved box".to_owned(),
        description: "Rosewood with initials".to_owned(),
        specifications: Specifications::default(),
        reference_images: Vec::new(),
        deadline: None,
        notes: None,
    }
}

fn product_of(artisan: UserId, now: DateTime<Utc>) -> Product {
    Product::create(
        ProductId::random(),
        artisan,
        ProductDraft {
            title: "Rosewood box".to_owned(),
            description: Some("Carved".to_owned()),
            category: Category::Woodwork,
            subcategory: None,
            materials: None,
            size: None,
            price: Money::from_minor(3_000).expect("non-negative"),
            original_price: None,
            stock: 2,
            images: Vec::new(),
            tags: Vec::new(),
            customizable: true,
            customization_options: Default::default(),
            status: ProductStatus::Published,
            shipping: Default::default(),
        },
        now,
    )
    .expect("valid product")
}

fn stored(customer: UserId, artisan: UserId, now: DateTime<Utc>) -> Customization {
    Customization::open(
        CustomizationId::random(),
        NewCustomization {
            customer,
            artisan,
            product: ProductId::random(),
            request_details: details(),
            priority: Priority::High,
            tags: Vec::new(),
        },
        now,
    )
    .expect("valid request")
}

fn service_with(
    requests: MockCustomizationRepository,
    products: MockProductRepository,
    now: DateTime<Utc>,
) -> CustomizationService {
    CustomizationService::new(Arc::new(requests), Arc::new(products), clock(now))
}

#[rstest]
#[tokio::test]
async fn customer_opens_request_for_artisans_product(now: DateTime<Utc>) {
    let customer = actor(Role::Customer);
    let artisan = UserId::random();
    let product = product_of(artisan, now);
    let product_id = product.id;
    let mut products = MockProductRepository::new();
    products
        .expect_find_by_id()
        .returning(move |_| Ok(Some(product.clone())));
    let mut requests = MockCustomizationRepository::new();
    requests.expect_insert().times(1).returning(|_| Ok(()));
    let service = service_with(requests, products, now);

    let created = service
        .create(
            &customer,
            CustomizationRequest {
                artisan,
                product: product_id,
                request_details: details(),
                priority: Priority::default(),
                tags: vec!["gift".to_owned()],
            },
        )
        .await
        .expect("created");
    assert_eq!(created.customer, customer.id);
    assert_eq!(created.status, CustomizationStatus::Pending);
}

#[rstest]
#[tokio::test]
async fn request_must_target_the_products_artisan(now: DateTime<Utc>) {
    let product = product_of(UserId::random(), now);
    let product_id = product.id;
    let mut products = MockProductRepository::new();
    products
        .expect_find_by_id()
        .returning(move |_| Ok(Some(product.clone())));
    let mut requests = MockCustomizationRepository::new();
    requests.expect_insert().never();
    let service = service_with(requests, products, now);

    let err = service
        .create(
            &actor(Role::Customer),
            CustomizationRequest {
                artisan: UserId::random(),
                product: product_id,
                request_details: details(),
                priority: Priority::default(),
                tags: Vec::new(),
            },
        )
        .await
        .expect_err("mismatched artisan");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn artisans_cannot_open_requests(now: DateTime<Utc>) {
    let service = service_with(
        MockCustomizationRepository::new(),
        MockProductRepository::new(),
        now,
    );

    let err = service
        .create(
            &actor(Role::Artisan),
            CustomizationRequest {
                artisan: UserId::random(),
                product: ProductId::random(),
                request_details: details(),
                priority: Priority::default(),
                tags: Vec::new(),
            },
        )
        .await
        .expect_err("artisan");
    assert_eq!(err.message(), "Only customers can create customization requests");
}

#[rstest]
#[case(Role::Customer)]
#[case(Role::Artisan)]
#[case(Role::Admin)]
#[tokio::test]
async fn status_changes_are_open_to_participants_and_admins(
    now: DateTime<Utc>,
    #[case] role: Role,
) {
    let caller = actor(role);
    let request = match role {
        Role::Customer => stored(caller.id, UserId::random(), now),
        Role::Artisan => stored(UserId::random(), caller.id, now),
        _ => stored(UserId::random(), UserId::random(), now),
    };
    let id = request.id;
    let mut requests = MockCustomizationRepository::new();
    requests
        .expect_find_by_id()
        .returning(move |_| Ok(Some(request.clone())));
    requests.expect_update().returning(|_| Ok(true));
    let service = service_with(requests, MockProductRepository::new(), now);

    let updated = service
        .set_status(&caller, &id, CustomizationStatus::InProgress, None)
        .await
        .expect("updated");
    assert_eq!(updated.status, CustomizationStatus::InProgress);
    assert_eq!(updated.timeline.len(), 2);
}

#[rstest]
#[tokio::test]
async fn outsiders_cannot_change_status(now: DateTime<Utc>) {
    let request = stored(UserId::random(), UserId::random(), now);
    let id = request.id;
    let mut requests = MockCustomizationRepository::new();
    requests
        .expect_find_by_id()
        .returning(move |_| Ok(Some(request.clone())));
    requests.expect_update().never();
    let service = service_with(requests, MockProductRepository::new(), now);

    let err = service
        .set_status(&actor(Role::Customer), &id, CustomizationStatus::Cancelled, None)
        .await
        .expect_err("outsider");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn only_addressed_artisan_quotes(now: DateTime<Utc>) {
    let request = stored(UserId::random(), UserId::random(), now);
    let id = request.id;
    let mut requests = MockCustomizationRepository::new();
    requests
        .expect_find_by_id()
        .returning(move |_| Ok(Some(request.clone())));
    requests.expect_update().never();
    let service = service_with(requests, MockProductRepository::new(), now);

    let err = service
        .quote(&actor(Role::Artisan), &id, QuoteDraft::default(), None)
        .await
        .expect_err("other artisan");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn quoting_marks_request_quoted(now: DateTime<Utc>) {
    let artisan = actor(Role::Artisan);
    let request = stored(UserId::random(), artisan.id, now);
    let id = request.id;
    let mut requests = MockCustomizationRepository::new();
    requests
        .expect_find_by_id()
        .returning(move |_| Ok(Some(request.clone())));
    requests
        .expect_update()
        .withf(|request| request.status == CustomizationStatus::Quoted)
        .times(1)
        .returning(|_| Ok(true));
    let service = service_with(requests, MockProductRepository::new(), now);

    let quoted = service
        .quote(
            &artisan,
            &id,
            QuoteDraft {
                base_price: Money::from_minor(5_000).expect("non-negative"),
                labor_cost: Money::from_minor(1_000).expect("non-negative"),
                ..QuoteDraft::default()
            },
            None,
        )
        .await
        .expect("quoted");
    let quote = quoted.quote.expect("quote stored");
    assert_eq!(quote.total_price, Money::from_minor(6_000).expect("non-negative"));
}

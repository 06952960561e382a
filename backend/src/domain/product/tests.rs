//! Listing validation, edits and moderation.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

fn price(minor: i64) -> Money {
    Money::from_minor(minor).expect("non-negative price")
}

fn draft(status: ProductStatus) -> ProductDraft {
    ProductDraft {
        title: "  Blue Pottery Vase ".to_owned(),
        description: Some("Hand thrown and glazed".to_owned()),
        category: Category::Pottery,
        subcategory: None,
        materials: Some("clay, cobalt glaze".to_owned()),
        size: None,
        price: price(2_500),
        original_price: None,
        stock: 4,
        images: Vec::new(),
        tags: vec!["Vase".to_owned(), "vase".to_owned(), " ".to_owned()],
        customizable: false,
        customization_options: CustomizationOptions::default(),
        status,
        shipping: ShippingTerms::default(),
    }
}

fn listing(now: DateTime<Utc>) -> Product {
    Product::create(
        ProductId::random(),
        UserId::random(),
        draft(ProductStatus::Published),
        now,
    )
    .expect("valid listing")
}

#[rstest]
#[case("Blue Pottery Vase!", "blue-pottery-vase")]
#[case("Hand -- woven   rug", "hand-woven-rug")]
#[case("Brass Lamp (Large) 2024", "brass-lamp-large-2024")]
#[case("  Trailing  ", "trailing")]
fn slugify_normalises_titles(#[case] title: &str, #[case] expected: &str) {
    assert_eq!(slugify(title), expected);
}

#[rstest]
fn create_trims_title_and_derives_slug(now: DateTime<Utc>) {
    let product = listing(now);
    assert_eq!(product.title, "Blue Pottery Vase");
    assert_eq!(product.slug, "blue-pottery-vase");
    assert_eq!(product.currency, DEFAULT_CURRENCY);
    assert_eq!(product.tags, vec!["vase".to_owned()]);
    assert_eq!(product.stats, ProductStats::default());
}

#[rstest]
fn create_requires_description_unless_draft(now: DateTime<Utc>) {
    let mut published = draft(ProductStatus::Published);
    published.description = Some("   ".to_owned());
    let err = Product::create(ProductId::random(), UserId::random(), published, now)
        .expect_err("description required");
    assert_eq!(err, ProductValidationError::MissingDescription);

    let mut unpublished = draft(ProductStatus::Draft);
    unpublished.description = None;
    assert!(Product::create(ProductId::random(), UserId::random(), unpublished, now).is_ok());
}

#[rstest]
#[case(ProductStatus::Approved)]
#[case(ProductStatus::Pending)]
#[case(ProductStatus::Rejected)]
fn create_refuses_moderation_statuses(now: DateTime<Utc>, #[case] status: ProductStatus) {
    let err = Product::create(ProductId::random(), UserId::random(), draft(status), now)
        .expect_err("moderation status");
    assert_eq!(err, ProductValidationError::StatusNotSelectable { status });
}

#[rstest]
fn failed_patch_leaves_listing_untouched(now: DateTime<Utc>) {
    let mut product = listing(now);
    let before = product.clone();
    let patch = ProductPatch {
        price: Some(price(10)),
        title: Some("   ".to_owned()),
        ..ProductPatch::default()
    };
    assert_eq!(
        product.apply_patch(patch, now),
        Err(ProductValidationError::EmptyTitle)
    );
    assert_eq!(product, before);
}

#[rstest]
fn patch_updates_slug_with_title(now: DateTime<Utc>) {
    let mut product = listing(now);
    let later = now + chrono::Duration::minutes(5);
    let patch = ProductPatch {
        title: Some("Indigo Dhurrie".to_owned()),
        stock: Some(0),
        ..ProductPatch::default()
    };
    product.apply_patch(patch, later).expect("valid patch");
    assert_eq!(product.slug, "indigo-dhurrie");
    assert_eq!(product.stock, 0);
    assert_eq!(product.updated_at, later);
}

#[rstest]
fn toggle_flips_between_published_and_draft(now: DateTime<Utc>) {
    let mut product = listing(now);
    product.toggle_publication(now).expect("toggle");
    assert_eq!(product.status, ProductStatus::Draft);
    product.toggle_publication(now).expect("toggle");
    assert_eq!(product.status, ProductStatus::Published);
}

#[rstest]
fn rejection_reason_only_kept_when_rejected(now: DateTime<Utc>) {
    let mut product = listing(now);
    product.moderate(
        ProductStatus::Rejected,
        Some("Blurry photos".to_owned()),
        now,
    );
    assert_eq!(product.rejection_reason.as_deref(), Some("Blurry photos"));
    product.moderate(ProductStatus::Approved, Some("ignored".to_owned()), now);
    assert_eq!(product.rejection_reason, None);
    assert!(product.status.is_public());
}

#[rstest]
fn free_shipping_charges_nothing() {
    let terms = ShippingTerms {
        free_shipping: true,
        shipping_cost: price(500),
        ..ShippingTerms::default()
    };
    assert_eq!(terms.charge(), Money::ZERO);
}

#[rstest]
fn categories_use_display_names_on_the_wire() {
    let value = serde_json::to_value(Category::HomeDecor).expect("serialise category");
    assert_eq!(value, "Home Decor");
    assert_eq!(Category::parse("Traditional Art"), Some(Category::TraditionalArt));
    assert_eq!(Category::parse("traditional art"), None);
}

#[rstest]
fn statuses_use_kebab_case() {
    let value = serde_json::to_value(ProductStatus::OutOfStock).expect("serialise status");
    assert_eq!(value, "out-of-stock");
    assert_eq!(ProductStatus::parse("out-of-stock"), Some(ProductStatus::OutOfStock));
}

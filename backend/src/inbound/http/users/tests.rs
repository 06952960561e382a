//! Tests for account administration and favorites handlers.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::json;

use crate::domain::{Role, UserId};
use crate::inbound::http::test_utils::{TestContext, json_body, session_cookie_for, test_app};

#[actix_web::test]
async fn admins_list_accounts_with_filters() {
    let context = TestContext::new();
    let admin = context.admin().await;
    context.register("potter@example.com", Role::Artisan).await;
    context.customer("buyer@example.com").await;
    let app = test::init_service(test_app(context.state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/users?role=artisan&status=pending&limit=5")
            .cookie(session_cookie_for(admin.id).await)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["items"][0]["email"], "potter@example.com");
    assert_eq!(body["pagination"], json!({ "current": 1, "pages": 1, "total": 1 }));
}

#[rstest]
#[case("/api/users?role=wizard")]
#[case("/api/users?status=dormant")]
#[case("/api/users?page=0")]
#[actix_web::test]
async fn invalid_list_filters_are_rejected(#[case] uri: &str) {
    let context = TestContext::new();
    let admin = context.admin().await;
    let app = test::init_service(test_app(context.state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(uri)
            .cookie(session_cookie_for(admin.id).await)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn customers_cannot_list_accounts() {
    let context = TestContext::new();
    let customer = context.customer("nosy@example.com").await;
    let app = test::init_service(test_app(context.state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/users")
            .cookie(session_cookie_for(customer.id).await)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn approving_an_artisan_lets_them_list_products() {
    let context = TestContext::new();
    let admin = context.admin().await;
    let artisan = context.register("weaver@example.com", Role::Artisan).await;
    let app = test::init_service(test_app(context.state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/users/{}/status", artisan.id))
            .cookie(session_cookie_for(admin.id).await)
            .set_json(json!({ "status": "approved" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "approved");
    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/products")
            .cookie(session_cookie_for(artisan.id).await)
            .set_json(json!({
                "title": "Ikat shawl",
                "description": "Hand-dyed silk",
                "category": "Textiles",
                "price": 4500,
                "stock": 2
            }))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
}

#[rstest]
#[case(json!({ "status": "frozen" }))]
#[case(json!({}))]
#[actix_web::test]
async fn moderation_requires_a_known_status(#[case] payload: serde_json::Value) {
    let context = TestContext::new();
    let admin = context.admin().await;
    let customer = context.customer("someone@example.com").await;
    let app = test::init_service(test_app(context.state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/users/{}/status", customer.id))
            .cookie(session_cookie_for(admin.id).await)
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn favorites_round_trip() {
    let context = TestContext::new();
    let artisan = context.approved_artisan("maker@example.com").await;
    let product = context.listing(&artisan, "Brass lamp", 2_500, 4).await;
    let customer = context.customer("fan@example.com").await;
    let app = test::init_service(test_app(context.state())).await;
    let cookie = session_cookie_for(customer.id).await;

    let added = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/users/favorites")
            .cookie(cookie.clone())
            .set_json(json!({ "productId": product.id.to_string() }))
            .to_request(),
    )
    .await;
    assert_eq!(added.status(), StatusCode::OK);

    let again = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/users/favorites")
            .cookie(cookie.clone())
            .set_json(json!({ "productId": product.id.to_string() }))
            .to_request(),
    )
    .await;
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);

    let listed = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/users/favorites")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body = json_body(listed).await;
    assert_eq!(body["favorites"][0]["title"], "Brass lamp");

    let removed = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/users/favorites/{}", product.id))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(removed.status(), StatusCode::OK);
    let listed = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/users/favorites")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(json_body(listed).await["favorites"], json!([]));
}

#[actix_web::test]
async fn favorites_need_a_product_id() {
    let context = TestContext::new();
    let customer = context.customer("fan@example.com").await;
    let app = test::init_service(test_app(context.state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/users/favorites")
            .cookie(session_cookie_for(customer.id).await)
            .set_json(json!({}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["details"]["code"], "missing_field");
}

#[rstest]
#[case("not-a-uuid", StatusCode::BAD_REQUEST)]
#[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", StatusCode::NOT_FOUND)]
#[actix_web::test]
async fn user_lookup_validates_the_id(#[case] id: &str, #[case] expected: StatusCode) {
    let context = TestContext::new();
    let customer = context.customer("reader@example.com").await;
    let app = test::init_service(test_app(context.state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/users/{id}"))
            .cookie(session_cookie_for(customer.id).await)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), expected);
}

#[actix_web::test]
async fn admins_delete_other_accounts_but_not_their_own() {
    let context = TestContext::new();
    let admin = context.admin().await;
    let customer = context.customer("gone@example.com").await;
    let app = test::init_service(test_app(context.state())).await;
    let cookie = session_cookie_for(admin.id).await;

    let deleted = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/users/{}", customer.id))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let own = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/users/{}", admin.id))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(own.status(), StatusCode::BAD_REQUEST);
    let missing: UserId = customer.id;
    let lookup = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/users/{missing}"))
            .cookie(session_cookie_for(admin.id).await)
            .to_request(),
    )
    .await;
    assert_eq!(lookup.status(), StatusCode::NOT_FOUND);
}

//! Tests for the customization request handlers.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{Product, User};
use crate::inbound::http::test_utils::{TestContext, json_body, session_cookie_for, test_app};

fn request_body(artisan: &User, product: &Product) -> Value {
    json!({
        "artisan": artisan.id.to_string(),
        "product": product.id.to_string(),
        "requestDetails": {
            "title": "Matching teapot",
            "description": "Same glaze as the bowl, holds four cups",
            "specifications": { "color": "celadon", "quantity": 1 }
        },
        "priority": "high"
    })
}

struct Studio {
    context: TestContext,
    artisan: User,
    customer: User,
    product: Product,
}

async fn studio() -> Studio {
    let context = TestContext::new();
    let artisan = context.approved_artisan("glaze@example.com").await;
    let product = context.listing(&artisan, "Celadon bowl", 1_800, 4).await;
    let customer = context.customer("tea@example.com").await;
    Studio {
        context,
        artisan,
        customer,
        product,
    }
}

async fn open_request(studio: &Studio) -> String {
    let app = test::init_service(test_app(studio.context.state())).await;
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/customizations")
            .cookie(session_cookie_for(studio.customer.id).await)
            .set_json(request_body(&studio.artisan, &studio.product))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["id"]
        .as_str()
        .expect("customization id")
        .to_owned()
}

#[actix_web::test]
async fn customers_open_requests() {
    let studio = studio().await;
    let app = test::init_service(test_app(studio.context.state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/customizations")
            .cookie(session_cookie_for(studio.customer.id).await)
            .set_json(request_body(&studio.artisan, &studio.product))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["priority"], "high");
    assert_eq!(body["requestDetails"]["specifications"]["color"], "celadon");
    assert_eq!(body["timeline"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn artisans_cannot_open_requests() {
    let studio = studio().await;
    let app = test::init_service(test_app(studio.context.state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/customizations")
            .cookie(session_cookie_for(studio.artisan.id).await)
            .set_json(request_body(&studio.artisan, &studio.product))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        json_body(response).await["message"],
        "Only customers can create customization requests"
    );
}

#[rstest]
#[case("artisan")]
#[case("product")]
#[case("requestDetails")]
#[actix_web::test]
async fn requests_need_every_reference(#[case] field: &str) {
    let studio = studio().await;
    let app = test::init_service(test_app(studio.context.state())).await;
    let mut body = request_body(&studio.artisan, &studio.product);
    if let Some(object) = body.as_object_mut() {
        object.remove(field);
    }

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/customizations")
            .cookie(session_cookie_for(studio.customer.id).await)
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["details"]["field"], field);
}

#[actix_web::test]
async fn artisans_quote_requests_addressed_to_them() {
    let studio = studio().await;
    let id = open_request(&studio).await;
    let other = studio.context.approved_artisan("other@example.com").await;
    let app = test::init_service(test_app(studio.context.state())).await;
    let quote = json!({
        "basePrice": 2_000,
        "customizationFee": 300,
        "materialCost": 150,
        "laborCost": 550,
        "validUntil": "2026-12-01T00:00:00Z",
        "message": "Ready in three weeks"
    });

    let foreign = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/customizations/{id}/quote"))
            .cookie(session_cookie_for(other.id).await)
            .set_json(quote.clone())
            .to_request(),
    )
    .await;
    assert_eq!(foreign.status(), StatusCode::FORBIDDEN);

    let quoted = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/customizations/{id}/quote"))
            .cookie(session_cookie_for(studio.artisan.id).await)
            .set_json(quote)
            .to_request(),
    )
    .await;
    assert_eq!(quoted.status(), StatusCode::OK);
    let body = json_body(quoted).await;
    assert_eq!(body["status"], "quoted");
    assert_eq!(body["quote"]["totalPrice"], 3_000);
    assert_eq!(body["artisanResponse"]["message"], "Ready in three weeks");
}

#[rstest]
#[case(json!({ "customizationFee": 10 }), "basePrice")]
#[case(json!({ "basePrice": -1 }), "basePrice")]
#[case(json!({ "basePrice": 10, "validUntil": "next week" }), "validUntil")]
#[actix_web::test]
async fn quotes_are_validated(#[case] quote: Value, #[case] field: &str) {
    let studio = studio().await;
    let id = open_request(&studio).await;
    let app = test::init_service(test_app(studio.context.state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/customizations/{id}/quote"))
            .cookie(session_cookie_for(studio.artisan.id).await)
            .set_json(quote)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["details"]["field"], field);
}

#[actix_web::test]
async fn participants_update_status_and_strangers_are_denied() {
    let studio = studio().await;
    let id = open_request(&studio).await;
    let stranger = studio.context.customer("nosy@example.com").await;
    let app = test::init_service(test_app(studio.context.state())).await;

    let accepted = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/customizations/{id}/status"))
            .cookie(session_cookie_for(studio.customer.id).await)
            .set_json(json!({ "status": "accepted", "note": "Go ahead" }))
            .to_request(),
    )
    .await;
    assert_eq!(accepted.status(), StatusCode::OK);
    let body = json_body(accepted).await;
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["timeline"][1]["note"], "Go ahead");

    let denied = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/customizations/{id}"))
            .cookie(session_cookie_for(stranger.id).await)
            .to_request(),
    )
    .await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let unknown = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/customizations/{id}/status"))
            .cookie(session_cookie_for(studio.artisan.id).await)
            .set_json(json!({ "status": "shelved" }))
            .to_request(),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn participant_lists_are_scoped_by_role() {
    let studio = studio().await;
    open_request(&studio).await;
    let admin = studio.context.admin().await;
    let app = test::init_service(test_app(studio.context.state())).await;

    for (uri, user, total) in [
        ("/api/customizations/customer/my-requests", studio.customer.id, 1),
        ("/api/customizations/artisan/my-requests", studio.artisan.id, 1),
        ("/api/customizations?status=pending", admin.id, 1),
        ("/api/customizations?status=quoted", admin.id, 0),
    ] {
        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(uri)
                .cookie(session_cookie_for(user).await)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(json_body(response).await["pagination"]["total"], total, "{uri}");
    }

    let not_admin = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/customizations")
            .cookie(session_cookie_for(studio.customer.id).await)
            .to_request(),
    )
    .await;
    assert_eq!(not_admin.status(), StatusCode::FORBIDDEN);
}

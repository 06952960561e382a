//! Tests for the order handlers.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{Product, ProductId};
use crate::inbound::http::test_utils::{TestContext, json_body, session_cookie_for, test_app};

fn address() -> Value {
    json!({
        "name": "Meera Shah",
        "street": "12 Lake Road",
        "city": "Udaipur",
        "state": "Rajasthan",
        "zipCode": "313001",
        "country": "India"
    })
}

fn order_body(product: &ProductId, quantity: i64) -> Value {
    json!({
        "items": [{ "product": product.to_string(), "quantity": quantity }],
        "shippingAddress": address(),
        "paymentMethod": "cash-on-delivery"
    })
}

fn place(cookie: Cookie<'static>, body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/orders")
        .cookie(cookie)
        .set_json(body)
}

struct Shop {
    context: TestContext,
    product: Product,
    artisan: Cookie<'static>,
    customer: Cookie<'static>,
}

async fn shop(stock: u32) -> Shop {
    let context = TestContext::new();
    let artisan = context.approved_artisan("potter@example.com").await;
    let product = context.listing(&artisan, "Tea bowl", 900, stock).await;
    let customer = context.customer("buyer@example.com").await;
    Shop {
        artisan: session_cookie_for(artisan.id).await,
        customer: session_cookie_for(customer.id).await,
        product,
        context,
    }
}

#[actix_web::test]
async fn customers_place_orders_priced_from_the_listing() {
    let shop = shop(5).await;
    let app = test::init_service(test_app(shop.context.state())).await;

    let response = test::call_service(
        &app,
        place(shop.customer.clone(), order_body(&shop.product.id, 2)).to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["items"][0]["price"], 900);
    assert_eq!(body["pricing"]["subtotal"], 1_800);
    assert_eq!(body["pricing"]["tax"], 90);
    assert_eq!(body["payment"]["method"], "cash-on-delivery");
    assert!(
        body["orderNumber"]
            .as_str()
            .is_some_and(|number| number.starts_with("KAR"))
    );

    let product = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/products/{}", shop.product.id))
            .to_request(),
    )
    .await;
    assert_eq!(json_body(product).await["stock"], 3);
}

#[actix_web::test]
async fn orders_beyond_stock_conflict() {
    let shop = shop(1).await;
    let app = test::init_service(test_app(shop.context.state())).await;

    let response = test::call_service(
        &app,
        place(shop.customer.clone(), order_body(&shop.product.id, 2)).to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[rstest]
#[case(json!({ "shippingAddress": address() }), "items")]
#[case(json!({ "items": [{ "product": "nope", "quantity": 1 }], "shippingAddress": address() }), "items")]
#[case(json!({ "items": [{ "product": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "quantity": 0 }], "shippingAddress": address() }), "items")]
#[case(json!({ "items": [{ "product": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "quantity": 1 }] }), "shippingAddress")]
#[actix_web::test]
async fn malformed_orders_are_rejected(#[case] body: Value, #[case] field: &str) {
    let shop = shop(3).await;
    let app = test::init_service(test_app(shop.context.state())).await;

    let response =
        test::call_service(&app, place(shop.customer.clone(), body).to_request()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["details"]["field"], field);
}

#[actix_web::test]
async fn artisans_cannot_place_orders() {
    let shop = shop(3).await;
    let app = test::init_service(test_app(shop.context.state())).await;

    let response = test::call_service(
        &app,
        place(shop.artisan.clone(), order_body(&shop.product.id, 1)).to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn artisans_advance_orders_one_step_at_a_time() {
    let shop = shop(3).await;
    let app = test::init_service(test_app(shop.context.state())).await;
    let placed = json_body(
        test::call_service(
            &app,
            place(shop.customer.clone(), order_body(&shop.product.id, 1)).to_request(),
        )
        .await,
    )
    .await;
    let id = placed["id"].as_str().expect("order id").to_owned();
    let advance = |status: &'static str, extra: Value| {
        let mut body = json!({ "status": status });
        if let (Some(target), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            target.extend(extra.clone());
        }
        test::TestRequest::put()
            .uri(&format!("/api/orders/{id}/status/artisan"))
            .cookie(shop.artisan.clone())
            .set_json(body)
            .to_request()
    };

    let skipped = test::call_service(&app, advance("shipped", json!({}))).await;
    assert_eq!(skipped.status(), StatusCode::BAD_REQUEST);

    let confirmed = test::call_service(&app, advance("confirmed", json!({}))).await;
    assert_eq!(confirmed.status(), StatusCode::OK);
    let processing = test::call_service(&app, advance("processing", json!({}))).await;
    assert_eq!(processing.status(), StatusCode::OK);

    let untracked = test::call_service(&app, advance("shipped", json!({}))).await;
    assert_eq!(untracked.status(), StatusCode::BAD_REQUEST);

    let shipped = test::call_service(
        &app,
        advance(
            "shipped",
            json!({ "tracking": {
                "carrier": "India Post",
                "trackingNumber": "EE123456789IN",
                "estimatedDelivery": "2026-11-02T10:00:00Z"
            }}),
        ),
    )
    .await;
    assert_eq!(shipped.status(), StatusCode::OK);
    let body = json_body(shipped).await;
    assert_eq!(body["status"], "shipped");
    assert_eq!(body["tracking"]["trackingNumber"], "EE123456789IN");
    assert_eq!(body["timeline"].as_array().map(Vec::len), Some(4));
}

#[actix_web::test]
async fn tracking_needs_an_rfc3339_delivery_estimate() {
    let shop = shop(3).await;
    let app = test::init_service(test_app(shop.context.state())).await;
    let placed = json_body(
        test::call_service(
            &app,
            place(shop.customer.clone(), order_body(&shop.product.id, 1)).to_request(),
        )
        .await,
    )
    .await;
    let id = placed["id"].as_str().expect("order id").to_owned();

    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/orders/{id}/status/artisan"))
            .cookie(shop.artisan.clone())
            .set_json(json!({
                "status": "shipped",
                "tracking": { "carrier": "DTDC", "trackingNumber": "X1", "estimatedDelivery": "soon" }
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["details"]["code"],
        "invalid_timestamp"
    );
}

#[actix_web::test]
async fn order_visibility_follows_involvement() {
    let shop = shop(3).await;
    let stranger = shop.context.customer("stranger@example.com").await;
    let admin = shop.context.admin().await;
    let app = test::init_service(test_app(shop.context.state())).await;
    let placed = json_body(
        test::call_service(
            &app,
            place(shop.customer.clone(), order_body(&shop.product.id, 1)).to_request(),
        )
        .await,
    )
    .await;
    let uri = format!("/api/orders/{}", placed["id"].as_str().expect("order id"));

    for (cookie, expected) in [
        (shop.customer.clone(), StatusCode::OK),
        (shop.artisan.clone(), StatusCode::OK),
        (session_cookie_for(admin.id).await, StatusCode::OK),
        (session_cookie_for(stranger.id).await, StatusCode::FORBIDDEN),
    ] {
        let response = test::call_service(
            &app,
            test::TestRequest::get().uri(&uri).cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(response.status(), expected);
    }
}

#[actix_web::test]
async fn role_scoped_lists_only_show_own_orders() {
    let shop = shop(5).await;
    let app = test::init_service(test_app(shop.context.state())).await;
    test::call_service(
        &app,
        place(shop.customer.clone(), order_body(&shop.product.id, 1)).to_request(),
    )
    .await;

    let mine = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/orders/customer/my-orders")
            .cookie(shop.customer.clone())
            .to_request(),
    )
    .await;
    assert_eq!(json_body(mine).await["pagination"]["total"], 1);

    let to_fulfil = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/orders/artisan/my-orders?status=pending")
            .cookie(shop.artisan.clone())
            .to_request(),
    )
    .await;
    assert_eq!(json_body(to_fulfil).await["pagination"]["total"], 1);

    let wrong_role = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/orders/customer/my-orders")
            .cookie(shop.artisan.clone())
            .to_request(),
    )
    .await;
    assert_eq!(wrong_role.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admins_override_and_filter_orders() {
    let shop = shop(5).await;
    let admin = shop.context.admin().await;
    let app = test::init_service(test_app(shop.context.state())).await;
    let cookie = session_cookie_for(admin.id).await;
    let placed = json_body(
        test::call_service(
            &app,
            place(shop.customer.clone(), order_body(&shop.product.id, 1)).to_request(),
        )
        .await,
    )
    .await;
    let id = placed["id"].as_str().expect("order id").to_owned();

    let refunded = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/orders/{id}/status"))
            .cookie(cookie.clone())
            .set_json(json!({ "status": "refunded", "note": "Damaged in transit" }))
            .to_request(),
    )
    .await;
    assert_eq!(refunded.status(), StatusCode::OK);
    let body = json_body(refunded).await;
    assert_eq!(body["status"], "refunded");
    assert_eq!(body["timeline"][1]["note"], "Damaged in transit");

    let filtered = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/orders?status=refunded")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(json_body(filtered).await["pagination"]["total"], 1);

    let bad_filter = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/orders?customer=someone")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(bad_filter.status(), StatusCode::BAD_REQUEST);
}

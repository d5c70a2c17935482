//! End-to-end HTTP tests: router + services + in-memory SQLite + simulated gateway.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use musicstore_hex::inbound::{HttpServer, ServerSettings};
use musicstore_repo::SqliteRepo;
use musicstore_types::Currency;
use payment_gateway::{SimulatedGateway, TOKEN_DECLINED, TOKEN_UNAVAILABLE};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn create_app() -> Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    repo.seed_sample_data().await.unwrap();
    let settings = ServerSettings {
        payment_credential: "sk_test_simulated".into(),
        currency: Currency::AUD,
    };
    HttpServer::new(repo, SimulatedGateway::new(), settings).router()
}

/// Sends a request and returns the status and the JSON body (`Null` when empty).
async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn first_two_albums(app: &Router) -> (i64, i64, i64, i64) {
    let (_, albums) = send(app, Method::GET, "/api/albums", None).await;
    let a = &albums[0];
    let b = &albums[1];
    (
        a["id"].as_i64().unwrap(),
        a["price"].as_i64().unwrap(),
        b["id"].as_i64().unwrap(),
        b["price"].as_i64().unwrap(),
    )
}

async fn add(app: &Router, cart: &str, album_id: i64) -> StatusCode {
    let uri = format!("/api/carts/{}/items", cart);
    send(app, Method::POST, &uri, Some(json!({ "album_id": album_id })))
        .await
        .0
}

fn checkout_body(token: &str) -> Value {
    json!({
        "first_name": "Jane",
        "last_name": "Citizen",
        "email": "jane@example.com",
        "address": "1 George St",
        "city": "Sydney",
        "payment_token": token
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_catalog_endpoints() {
    let app = create_app().await;

    let (status, genres) = send(&app, Method::GET, "/api/genres", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(genres.as_array().unwrap().len(), 10);

    let jazz = genres
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["name"] == "Jazz")
        .unwrap();
    let uri = format!("/api/albums?genre_id={}", jazz["id"]);
    let (status, albums) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(albums.as_array().unwrap().len(), 2);

    let id = albums[0]["id"].as_i64().unwrap();
    let (status, album) = send(&app, Method::GET, &format!("/api/albums/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(album["genre_id"], jazz["id"]);
}

#[tokio::test]
async fn test_album_errors() {
    let app = create_app().await;

    let (status, body) = send(&app, Method::GET, "/api/albums/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, body) = send(&app, Method::GET, "/api/albums/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

// ─────────────────────────────────────────────────────────────────────────────
// Cart
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_remove_and_empty_cart() {
    let app = create_app().await;
    let (album_a, price_a, album_b, _) = first_two_albums(&app).await;

    assert_eq!(add(&app, "cart-1", album_a).await, StatusCode::NO_CONTENT);
    assert_eq!(add(&app, "cart-1", album_a).await, StatusCode::NO_CONTENT);
    assert_eq!(add(&app, "cart-1", album_b).await, StatusCode::NO_CONTENT);

    let (status, cart) = send(&app, Method::GET, "/api/carts/cart-1", None).await;
    assert_eq!(status, StatusCode::OK);
    let lines = cart["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    let line_a = lines
        .iter()
        .find(|l| l["item"]["album_id"] == album_a)
        .unwrap();
    assert_eq!(line_a["item"]["count"], 2);

    let item_id = line_a["item"]["id"].as_i64().unwrap();
    let uri = format!("/api/cart-items/{}", item_id);
    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (_, cart) = send(&app, Method::GET, "/api/carts/cart-1", None).await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 2);
    assert!(cart["total"].as_i64().unwrap() >= price_a);

    let (status, _) = send(&app, Method::DELETE, "/api/carts/cart-1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, cart) = send(&app, Method::GET, "/api/carts/cart-1", None).await;
    assert!(cart["lines"].as_array().unwrap().is_empty());
    assert_eq!(cart["total"], 0);
}

#[tokio::test]
async fn test_cart_errors() {
    let app = create_app().await;

    assert_eq!(add(&app, "cart-1", 9999).await, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/cart-items/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/cart-items/nope", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Emptying an unknown cart is fine
    let (status, _) = send(&app, Method::DELETE, "/api/carts/never-used", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkout
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_checkout_creates_order_and_empties_cart() {
    let app = create_app().await;
    let (album_a, price_a, album_b, price_b) = first_two_albums(&app).await;
    add(&app, "cart-1", album_a).await;
    add(&app, "cart-1", album_a).await;
    add(&app, "cart-1", album_b).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/carts/cart-1/checkout",
        Some(checkout_body("tok_visa")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = body["order_id"].as_i64().unwrap();

    let (status, order) = send(&app, Method::GET, &format!("/api/orders/{}", order_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["total"], price_a * 2 + price_b);
    assert_eq!(order["first_name"], "Jane");
    assert_eq!(order["city"], "Sydney");
    assert!(order["transaction_id"].as_str().unwrap().starts_with("ch_"));
    assert_eq!(order["details"].as_array().unwrap().len(), 2);

    let (_, cart) = send(&app, Method::GET, "/api/carts/cart-1", None).await;
    assert!(cart["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_declined_checkout_keeps_cart() {
    let app = create_app().await;
    let (album_a, _, _, _) = first_two_albums(&app).await;
    add(&app, "cart-1", album_a).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/carts/cart-1/checkout",
        Some(checkout_body(TOKEN_DECLINED)),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"], "Your card was declined.");

    let (_, cart) = send(&app, Method::GET, "/api/carts/cart-1", None).await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/api/orders/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unavailable_gateway_is_bad_gateway() {
    let app = create_app().await;
    let (album_a, _, _, _) = first_two_albums(&app).await;
    add(&app, "cart-1", album_a).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/carts/cart-1/checkout",
        Some(checkout_body(TOKEN_UNAVAILABLE)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_checkout_of_empty_cart_is_bad_request() {
    let app = create_app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/carts/cart-1/checkout",
        Some(checkout_body("tok_visa")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = create_app().await;

    let (status, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "Music Store API");
    assert!(doc["paths"]["/api/carts/{cart_id}/checkout"].is_object());
}

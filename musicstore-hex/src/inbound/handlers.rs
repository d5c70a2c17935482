//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use musicstore_types::{
    AddToCartRequest, AlbumFilter, AlbumId, AppError, CartId, CartItemId, CheckoutRequest,
    CheckoutResponse, OrderId, PaymentGateway, RemoveCartItemResponse, Store,
};

use crate::{CartService, CatalogService};

/// Application state shared across handlers.
pub struct AppState<S: Store, G: PaymentGateway> {
    pub cart: CartService<S, G>,
    pub catalog: CatalogService<S>,
    /// Secret key sent to the payment gateway on every charge
    pub payment_credential: String,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::PaymentDeclined(msg) => (StatusCode::PAYMENT_REQUIRED, msg.clone()),
            AppError::PaymentUnavailable(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_cart_id(raw: String) -> Result<CartId, AppError> {
    CartId::parse(raw).map_err(AppError::from)
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// List all genres.
#[tracing::instrument(skip(state))]
pub async fn list_genres<S: Store, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
) -> Result<impl IntoResponse, ApiError> {
    let genres = state.catalog.list_genres().await?;
    Ok(Json(genres))
}

/// List albums, optionally by genre.
#[tracing::instrument(skip(state))]
pub async fn list_albums<S: Store, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    Query(filter): Query<AlbumFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let albums = state.catalog.list_albums(filter).await?;
    Ok(Json(albums))
}

/// Get album by ID.
#[tracing::instrument(skip(state), fields(album_id = %id))]
pub async fn get_album<S: Store, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let album_id: AlbumId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid album ID".into()))?;

    let album = state.catalog.get_album(album_id).await?;
    Ok(Json(album))
}

// ─────────────────────────────────────────────────────────────────────────────
// Cart
// ─────────────────────────────────────────────────────────────────────────────

/// Show a cart with current prices.
#[tracing::instrument(skip(state), fields(cart_id = %cart_id))]
pub async fn get_cart<S: Store, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(cart_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cart_id = parse_cart_id(cart_id)?;
    let view = state.cart.get_cart(&cart_id).await?;
    Ok(Json(view))
}

/// Add one copy of an album to a cart.
#[tracing::instrument(skip(state), fields(cart_id = %cart_id, album_id = %req.album_id))]
pub async fn add_to_cart<S: Store, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(cart_id): Path<String>,
    Json(req): Json<AddToCartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cart_id = parse_cart_id(cart_id)?;
    state.cart.add_to_cart(&cart_id, req.album_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove every item from a cart.
#[tracing::instrument(skip(state), fields(cart_id = %cart_id))]
pub async fn empty_cart<S: Store, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(cart_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cart_id = parse_cart_id(cart_id)?;
    state.cart.empty_cart(&cart_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Take one copy out of a cart item.
#[tracing::instrument(skip(state), fields(cart_item_id = %id))]
pub async fn remove_cart_item<S: Store, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item_id: CartItemId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid cart item ID".into()))?;

    let count = state.cart.remove_cart_item(item_id).await?;
    Ok(Json(RemoveCartItemResponse { count }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkout and orders
// ─────────────────────────────────────────────────────────────────────────────

/// Pay for a cart and turn it into an order.
#[tracing::instrument(skip(state, req), fields(cart_id = %cart_id))]
pub async fn checkout<S: Store, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(cart_id): Path<String>,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cart_id = parse_cart_id(cart_id)?;
    let order_id = state
        .cart
        .create_order_from_cart(
            &cart_id,
            req.customer,
            &req.payment_token,
            &state.payment_credential,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse { order_id })))
}

/// Get order by ID.
#[tracing::instrument(skip(state), fields(order_id = %id))]
pub async fn get_order<S: Store, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id: OrderId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid order ID".into()))?;

    let order = state.catalog.get_order(order_id).await?;
    Ok(Json(order))
}

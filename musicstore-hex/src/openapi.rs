//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use musicstore_types::domain::{
    Album, AlbumId, CartId, CartItem, CartItemId, CartLine, CartView, Currency, CustomerDetails,
    Genre, GenreId, Order, OrderDetail, OrderId,
};
use musicstore_types::dto::{
    AddToCartRequest, CheckoutRequest, CheckoutResponse, RemoveCartItemResponse,
};
use musicstore_types::ports::AlbumFilter;
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// List all genres
#[utoipa::path(
    get,
    path = "/api/genres",
    tag = "catalog",
    responses(
        (status = 200, description = "Genres ordered by name", body = Vec<Genre>)
    )
)]
async fn list_genres() {}

/// List albums
#[utoipa::path(
    get,
    path = "/api/albums",
    tag = "catalog",
    params(AlbumFilter),
    responses(
        (status = 200, description = "Albums ordered by title", body = Vec<Album>)
    )
)]
async fn list_albums() {}

/// Get album by ID
#[utoipa::path(
    get,
    path = "/api/albums/{id}",
    tag = "catalog",
    params(
        ("id" = i64, Path, description = "Album ID")
    ),
    responses(
        (status = 200, description = "Album details", body = Album),
        (status = 404, description = "Album not found")
    )
)]
async fn get_album() {}

/// Show a cart priced at current album prices
#[utoipa::path(
    get,
    path = "/api/carts/{cart_id}",
    tag = "cart",
    params(
        ("cart_id" = String, Path, description = "Opaque cart identifier")
    ),
    responses(
        (status = 200, description = "Cart contents; unknown carts are empty", body = CartView),
        (status = 400, description = "Invalid cart identifier")
    )
)]
async fn get_cart() {}

/// Add one copy of an album to a cart
#[utoipa::path(
    post,
    path = "/api/carts/{cart_id}/items",
    tag = "cart",
    request_body = AddToCartRequest,
    params(
        ("cart_id" = String, Path, description = "Opaque cart identifier")
    ),
    responses(
        (status = 204, description = "Album added"),
        (status = 404, description = "Album not found")
    )
)]
async fn add_to_cart() {}

/// Remove every item from a cart
#[utoipa::path(
    delete,
    path = "/api/carts/{cart_id}",
    tag = "cart",
    params(
        ("cart_id" = String, Path, description = "Opaque cart identifier")
    ),
    responses(
        (status = 204, description = "Cart emptied")
    )
)]
async fn empty_cart() {}

/// Take one copy out of a cart item
#[utoipa::path(
    delete,
    path = "/api/cart-items/{id}",
    tag = "cart",
    params(
        ("id" = i64, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Copies left; 0 means the item was removed", body = RemoveCartItemResponse),
        (status = 404, description = "Cart item not found")
    )
)]
async fn remove_cart_item() {}

/// Pay for a cart and turn it into an order
#[utoipa::path(
    post,
    path = "/api/carts/{cart_id}/checkout",
    tag = "checkout",
    request_body = CheckoutRequest,
    params(
        ("cart_id" = String, Path, description = "Opaque cart identifier")
    ),
    responses(
        (status = 201, description = "Order created", body = CheckoutResponse),
        (status = 400, description = "Empty cart or invalid customer details"),
        (status = 402, description = "Payment declined"),
        (status = 502, description = "Payment gateway unavailable")
    )
)]
async fn checkout() {}

/// Get order by ID
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "checkout",
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with its details", body = Order),
        (status = 404, description = "Order not found")
    )
)]
async fn get_order() {}

/// OpenAPI documentation for the Music Store API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Music Store API",
        version = "1.0.0",
        description = "Catalog browsing, shopping carts and checkout for the music store.\n\nAll amounts are integers in minor currency units (cents).",
        license(name = "MIT"),
    ),
    paths(
        health,
        list_genres,
        list_albums,
        get_album,
        get_cart,
        add_to_cart,
        empty_cart,
        remove_cart_item,
        checkout,
        get_order,
    ),
    components(
        schemas(
            Genre,
            Album,
            CartItem,
            CartLine,
            CartView,
            CustomerDetails,
            Order,
            OrderDetail,
            AddToCartRequest,
            RemoveCartItemResponse,
            CheckoutRequest,
            CheckoutResponse,
            Currency,
            AlbumId,
            GenreId,
            CartId,
            CartItemId,
            OrderId,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Genres and albums"),
        (name = "cart", description = "Shopping cart operations"),
        (name = "checkout", description = "Checkout and orders"),
    )
)]
pub struct ApiDoc;

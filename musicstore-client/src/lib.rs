//! # Music Store Client SDK
//!
//! A typed Rust client for the Music Store API.

use musicstore_types::{
    AddToCartRequest, Album, AlbumId, CartItemId, CartView, CheckoutRequest, CheckoutResponse,
    CustomerDetails, Genre, GenreId, Order, OrderId, RemoveCartItemResponse,
};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// HTTP status of an API error, if the server answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Music Store API client.
pub struct MusicStoreClient {
    base_url: String,
    http: Client,
}

impl MusicStoreClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self.http.get(self.url(&["health"])?).send().await?;
        Ok(resp.status().is_success())
    }

    // ── Catalog ──────────────────────────────────────────────────────────────

    /// Lists all genres.
    pub async fn list_genres(&self) -> Result<Vec<Genre>, ClientError> {
        self.json(self.http.get(self.url(&["api", "genres"])?)).await
    }

    /// Lists albums, optionally only those of one genre.
    pub async fn list_albums(&self, genre_id: Option<GenreId>) -> Result<Vec<Album>, ClientError> {
        let mut req = self.http.get(self.url(&["api", "albums"])?);
        if let Some(genre_id) = genre_id {
            req = req.query(&[("genre_id", genre_id.as_i64())]);
        }
        self.json(req).await
    }

    /// Gets an album by ID.
    pub async fn get_album(&self, id: AlbumId) -> Result<Album, ClientError> {
        let id = id.to_string();
        self.json(self.http.get(self.url(&["api", "albums", &id])?))
            .await
    }

    // ── Cart ─────────────────────────────────────────────────────────────────

    /// Shows a cart; unknown carts come back empty.
    pub async fn get_cart(&self, cart_id: &str) -> Result<CartView, ClientError> {
        self.json(self.http.get(self.url(&["api", "carts", cart_id])?))
            .await
    }

    /// Adds one copy of an album to a cart.
    pub async fn add_to_cart(&self, cart_id: &str, album_id: AlbumId) -> Result<(), ClientError> {
        let url = self.url(&["api", "carts", cart_id, "items"])?;
        self.empty(self.http.post(url).json(&AddToCartRequest { album_id }))
            .await
    }

    /// Removes one copy of a cart item and returns how many are left.
    pub async fn remove_cart_item(&self, id: CartItemId) -> Result<i32, ClientError> {
        let id = id.to_string();
        let resp: RemoveCartItemResponse = self
            .json(self.http.delete(self.url(&["api", "cart-items", &id])?))
            .await?;
        Ok(resp.count)
    }

    /// Removes every item from a cart.
    pub async fn empty_cart(&self, cart_id: &str) -> Result<(), ClientError> {
        self.empty(self.http.delete(self.url(&["api", "carts", cart_id])?))
            .await
    }

    // ── Checkout ─────────────────────────────────────────────────────────────

    /// Pays for a cart and returns the new order's ID.
    pub async fn checkout(
        &self,
        cart_id: &str,
        customer: CustomerDetails,
        payment_token: &str,
    ) -> Result<OrderId, ClientError> {
        let req = CheckoutRequest {
            customer,
            payment_token: payment_token.to_string(),
        };
        let url = self.url(&["api", "carts", cart_id, "checkout"])?;
        let resp: CheckoutResponse = self.json(self.http.post(url).json(&req)).await?;
        Ok(resp.order_id)
    }

    /// Gets an order with its details.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ClientError> {
        let id = id.to_string();
        self.json(self.http.get(self.url(&["api", "orders", &id])?))
            .await
    }

    // ── Plumbing ─────────────────────────────────────────────────────────────

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let body = self.send(req).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn empty(&self, req: RequestBuilder) -> Result<(), ClientError> {
        self.send(req).await?;
        Ok(())
    }

    async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or(body);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_with_trailing_slash() {
        let client = MusicStoreClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_url_encodes_cart_id() {
        let client = MusicStoreClient::new("http://localhost:3000");
        let url = client.url(&["api", "carts", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/carts/a%20b%2Fc");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = MusicStoreClient::new("http://localhost:3000/store/");
        let url = client.url(&["api", "genres"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/store/api/genres");
    }

    #[test]
    fn test_invalid_base_url() {
        let client = MusicStoreClient::new("not a url");
        assert!(matches!(
            client.url(&["health"]),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_api_error_status() {
        let err = ClientError::Api {
            status: 402,
            message: "Your card was declined.".into(),
        };
        assert_eq!(err.status(), Some(402));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let client = MusicStoreClient::new("http://127.0.0.1:1");

        let err = client.list_genres().await.unwrap_err();

        assert!(matches!(err, ClientError::Http(_)));
        assert_eq!(err.status(), None);
    }
}

//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AlbumId, CustomerDetails, OrderId};

// ─────────────────────────────────────────────────────────────────────────────
// Cart DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to add one copy of an album to a cart.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    /// Album to add
    #[schema(value_type = i64, example = 1)]
    pub album_id: AlbumId,
}

/// Response after removing one copy of a cart item.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RemoveCartItemResponse {
    /// Copies left in the cart; 0 means the item was removed
    #[schema(example = 1)]
    pub count: i32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkout DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to turn a cart into a paid order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub customer: CustomerDetails,
    /// Tokenized payment source from the client-side payment SDK
    #[schema(example = "tok_visa")]
    pub payment_token: String,
}

/// Response after a successful checkout.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    /// Identifier of the newly created order
    #[schema(value_type = i64, example = 1)]
    pub order_id: OrderId,
}

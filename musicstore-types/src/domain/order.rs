//! Order domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::album::{Album, AlbumId};
use super::money::Money;
use super::store_id;
use crate::error::DomainError;

store_id!(
    /// Unique identifier for an Order.
    OrderId
);

/// Who placed the order and where it ships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomerDetails {
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Citizen")]
    pub last_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[schema(example = "jane@example.com")]
    pub email: String,
}

impl CustomerDetails {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "First and last name are required".into(),
            ));
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::ValidationError(
                "A valid email address is required".into(),
            ));
        }
        Ok(())
    }
}

/// An order that has been registered for persistence but not stored yet.
///
/// `total` and `transaction_id` are filled in during checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer: CustomerDetails,
    pub order_date: DateTime<Utc>,
    pub total: Money,
    pub transaction_id: Option<String>,
}

impl NewOrder {
    pub fn new(customer: CustomerDetails) -> Result<Self, DomainError> {
        customer.validate()?;
        Ok(Self {
            customer,
            order_date: Utc::now(),
            total: Money::zero(),
            transaction_id: None,
        })
    }
}

/// A purchased line captured at checkout, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderDetail {
    pub album_id: AlbumId,
    pub unit_price: Money,
    pub quantity: i32,
}

impl NewOrderDetail {
    /// Snapshots the album's current price so later catalog changes don't
    /// rewrite history.
    pub fn snapshot(album: &Album, quantity: i32) -> Result<Self, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity(quantity));
        }
        Ok(Self {
            album_id: album.id,
            unit_price: album.price,
            quantity,
        })
    }

    pub fn line_total(&self) -> Result<Money, DomainError> {
        self.unit_price.times(self.quantity)
    }
}

/// A stored line of an order. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    pub order_id: OrderId,
    pub album_id: AlbumId,
    /// Unit price at time of purchase in minor currency units
    #[schema(value_type = i64, example = 1000)]
    pub unit_price: Money,
    #[schema(example = 2)]
    pub quantity: i32,
}

/// A paid order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: OrderId,
    #[serde(flatten)]
    pub customer: CustomerDetails,
    pub order_date: DateTime<Utc>,
    /// Order total in minor currency units
    #[schema(value_type = i64, example = 2500)]
    pub total: Money,
    /// Payment gateway transaction identifier
    #[schema(example = "ch_3MmlLrLkdIwHu7ix0snN0B15")]
    pub transaction_id: String,
    pub details: Vec<OrderDetail>,
}

//! Shopping cart domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::album::{Album, AlbumId};
use super::money::Money;
use super::store_id;
use crate::error::DomainError;

/// Longest cart identifier the store accepts.
pub const MAX_CART_ID_LEN: usize = 128;

/// Opaque cart identifier (session or user token) chosen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CartId(String);

impl CartId {
    /// Validates and wraps a client-supplied cart identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Cart id cannot be empty".into(),
            ));
        }
        if raw.trim().len() != raw.len() {
            return Err(DomainError::ValidationError(
                "Cart id cannot start or end with whitespace".into(),
            ));
        }
        if raw.len() > MAX_CART_ID_LEN {
            return Err(DomainError::ValidationError(format!(
                "Cart id cannot be longer than {} characters",
                MAX_CART_ID_LEN
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CartId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

store_id!(
    /// Unique identifier for a CartItem.
    CartItemId
);

/// A cart. Created lazily the first time something is added to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(id: CartId) -> Self {
        Self {
            id,
            created_at: Utc::now(),
        }
    }
}

/// One line of a cart: an album and how many copies of it.
///
/// There is at most one item per (cart, album) pair; adding the same album
/// again bumps `count` instead of creating a second row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub album_id: AlbumId,
    #[schema(example = 1)]
    pub count: i32,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    /// Reconstructs a cart item from stored fields.
    pub fn from_parts(
        id: CartItemId,
        cart_id: CartId,
        album_id: AlbumId,
        count: i32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if count < 1 {
            return Err(DomainError::InvalidQuantity(count));
        }
        Ok(Self {
            id,
            cart_id,
            album_id,
            count,
            created_at,
        })
    }

    /// Adds one more copy.
    pub fn increment(&mut self) -> Result<(), DomainError> {
        self.count = self
            .count
            .checked_add(1)
            .ok_or(DomainError::InvalidQuantity(i32::MAX))?;
        Ok(())
    }

    /// Takes one copy out and returns how many remain.
    ///
    /// A return of 0 means the item must be deleted; `count` itself never
    /// drops below 1.
    pub fn decrement(&mut self) -> i32 {
        if self.count > 1 {
            self.count -= 1;
            self.count
        } else {
            0
        }
    }
}

/// A cart item that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub cart_id: CartId,
    pub album_id: AlbumId,
    pub count: i32,
    pub created_at: DateTime<Utc>,
}

impl NewCartItem {
    /// First copy of an album in a cart.
    pub fn first(cart_id: CartId, album_id: AlbumId) -> Self {
        Self {
            cart_id,
            album_id,
            count: 1,
            created_at: Utc::now(),
        }
    }
}

/// A cart item joined with its album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub item: CartItem,
    pub album: Album,
}

impl CartLine {
    /// Current album price times quantity.
    pub fn line_total(&self) -> Result<Money, DomainError> {
        self.album.price.times(self.item.count)
    }
}

/// Read model of a cart with its total at current prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartView {
    pub cart_id: CartId,
    pub lines: Vec<CartLine>,
    /// Sum of all lines in minor currency units
    #[schema(value_type = i64, example = 2500)]
    pub total: Money,
}

impl CartView {
    pub fn from_lines(cart_id: CartId, lines: Vec<CartLine>) -> Result<Self, DomainError> {
        let mut total = Money::zero();
        for line in &lines {
            total = total.checked_add(line.line_total()?)?;
        }
        Ok(Self {
            cart_id,
            lines,
            total,
        })
    }

    /// Number of album copies across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.item.count)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GenreId;

    fn item(count: i32) -> CartItem {
        CartItem::from_parts(
            CartItemId::from_i64(1),
            CartId::parse("abc").unwrap(),
            AlbumId::from_i64(7),
            count,
            Utc::now(),
        )
        .unwrap()
    }

    fn album(id: i64, price: i64) -> Album {
        Album {
            id: AlbumId::from_i64(id),
            genre_id: GenreId::from_i64(1),
            artist: "Artist".into(),
            title: format!("Album {}", id),
            price: Money::from_minor(price).unwrap(),
            album_art_url: None,
        }
    }

    #[test]
    fn test_cart_id_kept_verbatim() {
        let id = CartId::parse("session 42").unwrap();
        assert_eq!(id.as_str(), "session 42");
    }

    #[test]
    fn test_cart_id_with_surrounding_whitespace_fails() {
        assert!(matches!(
            CartId::parse("abc "),
            Err(DomainError::ValidationError(_))
        ));
        assert!(CartId::parse("\tabc").is_err());
    }

    #[test]
    fn test_empty_cart_id_fails() {
        assert!(matches!(
            CartId::parse("   "),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn test_overlong_cart_id_fails() {
        let raw = "x".repeat(MAX_CART_ID_LEN + 1);
        assert!(CartId::parse(raw).is_err());
    }

    #[test]
    fn test_zero_count_rejected() {
        let result = CartItem::from_parts(
            CartItemId::from_i64(1),
            CartId::parse("abc").unwrap(),
            AlbumId::from_i64(7),
            0,
            Utc::now(),
        );
        assert!(matches!(result, Err(DomainError::InvalidQuantity(0))));
    }

    #[test]
    fn test_increment_then_decrement() {
        let mut item = item(1);
        item.increment().unwrap();
        assert_eq!(item.count, 2);
        assert_eq!(item.decrement(), 1);
        assert_eq!(item.count, 1);
    }

    #[test]
    fn test_decrement_last_copy_returns_zero() {
        let mut item = item(1);
        assert_eq!(item.decrement(), 0);
        assert_eq!(item.count, 1);
    }

    #[test]
    fn test_cart_view_total() {
        let cart_id = CartId::parse("abc").unwrap();
        let mut a = item(2);
        a.album_id = AlbumId::from_i64(1);
        let mut b = item(1);
        b.album_id = AlbumId::from_i64(2);

        let view = CartView::from_lines(
            cart_id,
            vec![
                CartLine {
                    item: a,
                    album: album(1, 1000),
                },
                CartLine {
                    item: b,
                    album: album(2, 500),
                },
            ],
        )
        .unwrap();

        assert_eq!(view.total.amount(), 2500);
        assert_eq!(view.item_count(), 3);
    }
}

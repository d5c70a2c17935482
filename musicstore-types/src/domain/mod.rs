//! Domain models for the music store.

/// Declares a store-assigned integer identifier.
///
/// The database hands these out on insert, so there is no `new()`.
macro_rules! store_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
            utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn from_i64(id: i64) -> Self {
                Self(id)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

pub(crate) use store_id;

pub mod album;
pub mod cart;
pub mod money;
pub mod order;

pub use album::{Album, AlbumId, Genre, GenreId};
pub use cart::{Cart, CartId, CartItem, CartItemId, CartLine, CartView, NewCartItem};
pub use money::{Currency, Money};
pub use order::{CustomerDetails, NewOrder, NewOrderDetail, Order, OrderDetail, OrderId};

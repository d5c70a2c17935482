//! Catalog domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::money::Money;
use super::store_id;

store_id!(
    /// Unique identifier for a Genre.
    GenreId
);

store_id!(
    /// Unique identifier for an Album.
    AlbumId
);

/// A music genre albums are filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Genre {
    pub id: GenreId,
    #[schema(example = "Rock")]
    pub name: String,
    pub description: Option<String>,
}

/// A catalog item. Read-only from the cart's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Album {
    pub id: AlbumId,
    pub genre_id: GenreId,
    #[schema(example = "AC/DC")]
    pub artist: String,
    #[schema(example = "Let There Be Rock")]
    pub title: String,
    /// Current unit price in minor currency units
    #[schema(value_type = i64, example = 899)]
    pub price: Money,
    pub album_art_url: Option<String>,
}

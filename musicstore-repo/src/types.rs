//! Shared database types with feature-gated fields for SQLite and PostgreSQL.

use sqlx::FromRow;

use musicstore_types::{
    Album, AlbumId, Cart, CartId, CartItem, CartItemId, CartLine, CustomerDetails, Genre, GenreId,
    Money, Order, OrderDetail, OrderId, RepoError,
};

// ─────────────────────────────────────────────────────────────────────────────
// Feature-gated imports
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(not(feature = "sqlite"))]
use chrono::{DateTime, Utc};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Genre row from database.
#[derive(FromRow)]
pub struct DbGenre {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Album row from database.
#[derive(FromRow)]
pub struct DbAlbum {
    pub id: i64,
    pub genre_id: i64,
    pub artist: String,
    pub title: String,
    pub price: i64,
    pub album_art_url: Option<String>,
}

/// Cart row from database.
#[derive(FromRow)]
pub struct DbCart {
    pub id: String,

    #[cfg(not(feature = "sqlite"))]
    pub created_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub created_at: String,
}

/// Cart item row from database.
#[derive(FromRow)]
pub struct DbCartItem {
    pub id: i64,
    pub cart_id: String,
    pub album_id: i64,
    pub count: i32,

    #[cfg(not(feature = "sqlite"))]
    pub created_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub created_at: String,
}

/// Cart item joined with its album.
#[derive(FromRow)]
pub struct DbCartLine {
    #[sqlx(flatten)]
    pub item: DbCartItem,
    pub genre_id: i64,
    pub artist: String,
    pub title: String,
    pub price: i64,
    pub album_art_url: Option<String>,
}

/// Order header row from database.
#[derive(FromRow)]
pub struct DbOrder {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: String,

    #[cfg(not(feature = "sqlite"))]
    pub order_date: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub order_date: String,

    pub total: i64,
    pub transaction_id: String,
}

/// Order detail row from database.
#[derive(FromRow)]
pub struct DbOrderDetail {
    pub order_id: i64,
    pub album_id: i64,
    pub unit_price: i64,
    pub quantity: i32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
pub fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, RepoError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| RepoError::Database(e.to_string()))
}

fn parse_cart_id(s: String) -> Result<CartId, RepoError> {
    CartId::parse(s).map_err(RepoError::Domain)
}

/// Maps a driver error, surfacing unique-constraint violations as conflicts.
pub fn db_error(e: sqlx::Error) -> RepoError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => RepoError::Conflict(db.message().to_string()),
        _ => RepoError::Database(e.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion (feature-gated implementations)
// ─────────────────────────────────────────────────────────────────────────────

impl DbGenre {
    pub fn into_domain(self) -> Genre {
        Genre {
            id: GenreId::from_i64(self.id),
            name: self.name,
            description: self.description,
        }
    }
}

impl DbAlbum {
    pub fn into_domain(self) -> Result<Album, RepoError> {
        Ok(Album {
            id: AlbumId::from_i64(self.id),
            genre_id: GenreId::from_i64(self.genre_id),
            artist: self.artist,
            title: self.title,
            price: Money::from_minor(self.price)?,
            album_art_url: self.album_art_url,
        })
    }
}

impl DbCart {
    pub fn into_domain(self) -> Result<Cart, RepoError> {
        #[cfg(not(feature = "sqlite"))]
        let created_at = self.created_at;
        #[cfg(feature = "sqlite")]
        let created_at = parse_timestamp(&self.created_at)?;

        Ok(Cart {
            id: parse_cart_id(self.id)?,
            created_at,
        })
    }
}

impl DbCartItem {
    /// Convert database row to domain CartItem.
    pub fn into_domain(self) -> Result<CartItem, RepoError> {
        #[cfg(not(feature = "sqlite"))]
        let created_at = self.created_at;
        #[cfg(feature = "sqlite")]
        let created_at = parse_timestamp(&self.created_at)?;

        let item = CartItem::from_parts(
            CartItemId::from_i64(self.id),
            parse_cart_id(self.cart_id)?,
            AlbumId::from_i64(self.album_id),
            self.count,
            created_at,
        )?;
        Ok(item)
    }
}

impl DbCartLine {
    pub fn into_domain(self) -> Result<CartLine, RepoError> {
        let album = DbAlbum {
            id: self.item.album_id,
            genre_id: self.genre_id,
            artist: self.artist,
            title: self.title,
            price: self.price,
            album_art_url: self.album_art_url,
        }
        .into_domain()?;

        Ok(CartLine {
            item: self.item.into_domain()?,
            album,
        })
    }
}

impl DbOrderDetail {
    pub fn into_domain(self) -> Result<OrderDetail, RepoError> {
        Ok(OrderDetail {
            order_id: OrderId::from_i64(self.order_id),
            album_id: AlbumId::from_i64(self.album_id),
            unit_price: Money::from_minor(self.unit_price)?,
            quantity: self.quantity,
        })
    }
}

impl DbOrder {
    /// Convert the order header plus its detail rows to a domain Order.
    pub fn into_domain(self, details: Vec<DbOrderDetail>) -> Result<Order, RepoError> {
        #[cfg(not(feature = "sqlite"))]
        let order_date = self.order_date;
        #[cfg(feature = "sqlite")]
        let order_date = parse_timestamp(&self.order_date)?;

        let details = details
            .into_iter()
            .map(DbOrderDetail::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Order {
            id: OrderId::from_i64(self.id),
            customer: CustomerDetails {
                first_name: self.first_name,
                last_name: self.last_name,
                address: self.address,
                city: self.city,
                state: self.state,
                postal_code: self.postal_code,
                country: self.country,
                phone: self.phone,
                email: self.email,
            },
            order_date,
            total: Money::from_minor(self.total)?,
            transaction_id: self.transaction_id,
            details,
        })
    }
}

//! Unit of work port.
//!
//! Every cart operation runs inside exactly one unit of work. Adapters back
//! it with a database transaction: everything done through one instance is
//! persisted by `commit`, and dropping it without committing discards all of
//! it.

use crate::domain::{
    Album, AlbumId, Cart, CartId, CartItem, CartItemId, CartLine, NewCartItem, NewOrder,
    NewOrderDetail, OrderId,
};
use crate::error::RepoError;

/// A scoped transactional handle exposing per-entity repository operations.
#[async_trait::async_trait]
pub trait UnitOfWork: Send {
    // ─────────────────────────────────────────────────────────────────────────────
    // Catalog (read-only)
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets an album by ID, reading its current price.
    async fn album(&mut self, id: AlbumId) -> Result<Option<Album>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Carts
    // ─────────────────────────────────────────────────────────────────────────────

    async fn cart(&mut self, id: &CartId) -> Result<Option<Cart>, RepoError>;

    async fn add_cart(&mut self, cart: &Cart) -> Result<(), RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Cart items
    // ─────────────────────────────────────────────────────────────────────────────

    async fn cart_item(&mut self, id: CartItemId) -> Result<Option<CartItem>, RepoError>;

    /// Finds the single item for a (cart, album) pair.
    async fn cart_item_for_album(
        &mut self,
        cart_id: &CartId,
        album_id: AlbumId,
    ) -> Result<Option<CartItem>, RepoError>;

    /// Lists a cart's items joined with their albums, oldest first.
    async fn cart_lines(&mut self, cart_id: &CartId) -> Result<Vec<CartLine>, RepoError>;

    async fn add_cart_item(&mut self, item: NewCartItem) -> Result<CartItem, RepoError>;

    /// Stores the item's current count.
    async fn update_cart_item(&mut self, item: &CartItem) -> Result<(), RepoError>;

    async fn delete_cart_item(&mut self, id: CartItemId) -> Result<(), RepoError>;

    /// Deletes a set of cart items, returning how many rows went away.
    async fn delete_cart_items(&mut self, ids: &[CartItemId]) -> Result<u64, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────────────

    /// Inserts an order; the store assigns its identifier.
    async fn add_order(&mut self, order: &NewOrder) -> Result<OrderId, RepoError>;

    async fn add_order_detail(
        &mut self,
        order_id: OrderId,
        detail: &NewOrderDetail,
    ) -> Result<(), RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Completion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Persists everything done through this unit of work atomically.
    async fn commit(self: Box<Self>) -> Result<(), RepoError>;

    /// Discards everything and releases the underlying transaction now,
    /// instead of whenever the handle happens to be dropped.
    async fn rollback(self: Box<Self>) -> Result<(), RepoError>;
}

/// Hands out a fresh unit of work per operation.
#[async_trait::async_trait]
pub trait UnitOfWorkFactory: Send + Sync + 'static {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepoError>;
}

//! Read-side repository ports for the catalog and stored orders.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Album, AlbumId, Genre, GenreId, Order, OrderId};
use crate::error::RepoError;

/// Filter for album listings.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct AlbumFilter {
    /// Only albums filed under this genre
    pub genre_id: Option<GenreId>,
}

#[async_trait::async_trait]
pub trait CatalogRepository: Send + Sync + 'static {
    /// Lists all genres ordered by name.
    async fn list_genres(&self) -> Result<Vec<Genre>, RepoError>;

    /// Lists albums matching the filter ordered by title.
    async fn list_albums(&self, filter: AlbumFilter) -> Result<Vec<Album>, RepoError>;

    async fn get_album(&self, id: AlbumId) -> Result<Option<Album>, RepoError>;
}

#[async_trait::async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// Gets a committed order together with its details.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepoError>;
}

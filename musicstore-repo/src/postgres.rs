//! PostgreSQL repository adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use musicstore_types::{
    Album, AlbumFilter, AlbumId, Cart, CartId, CartItem, CartItemId, CartLine, CatalogRepository,
    DomainError, Genre, NewCartItem, NewOrder, NewOrderDetail, Order, OrderId, OrderRepository,
    RepoError, UnitOfWork, UnitOfWorkFactory,
};

use crate::sample_data;
use crate::types::{DbAlbum, DbCart, DbCartItem, DbCartLine, DbGenre, DbOrder, DbOrderDetail, db_error};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository; cart items are read with row-level locks inside a
/// unit of work.
#[derive(Clone)]
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_catalog_pg.sql"),
        "0001",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0002_create_carts_orders_pg.sql"),
        "0002",
    )
    .await?;

    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }

    /// Loads the sample catalog when no genres exist yet.
    pub async fn seed_sample_data(&self) -> Result<bool, RepoError> {
        let (genres,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        if genres > 0 {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let mut genre_ids = HashMap::new();
        for (name, description) in sample_data::GENRES {
            let (id,): (i64,) = sqlx::query_as(
                "INSERT INTO genres (name, description) VALUES ($1, $2) RETURNING id",
            )
            .bind(*name)
            .bind(*description)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?;
            genre_ids.insert(*name, id);
        }

        for album in sample_data::ALBUMS {
            let genre_id = genre_ids.get(album.genre).copied().ok_or_else(|| {
                RepoError::Domain(DomainError::ValidationError(format!(
                    "Unknown sample genre {}",
                    album.genre
                )))
            })?;
            sqlx::query(
                r#"INSERT INTO albums (genre_id, artist, title, price, album_art_url)
                   VALUES ($1, $2, $3, $4, $5)"#,
            )
            .bind(genre_id)
            .bind(album.artist)
            .bind(album.title)
            .bind(album.price)
            .bind(sample_data::ALBUM_ART_URL)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        tracing::info!(
            genres = sample_data::GENRES.len(),
            albums = sample_data::ALBUMS.len(),
            "Seeded sample catalog"
        );
        Ok(true)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog and order queries
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CatalogRepository for PostgresRepo {
    async fn list_genres(&self) -> Result<Vec<Genre>, RepoError> {
        let rows: Vec<DbGenre> =
            sqlx::query_as(r#"SELECT id, name, description FROM genres ORDER BY name"#)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(DbGenre::into_domain).collect())
    }

    async fn list_albums(&self, filter: AlbumFilter) -> Result<Vec<Album>, RepoError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, genre_id, artist, title, price, album_art_url FROM albums",
        );
        if let Some(genre_id) = filter.genre_id {
            query.push(" WHERE genre_id = ").push_bind(genre_id.as_i64());
        }
        query.push(" ORDER BY title, id");

        let rows: Vec<DbAlbum> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbAlbum::into_domain).collect()
    }

    async fn get_album(&self, id: AlbumId) -> Result<Option<Album>, RepoError> {
        let row: Option<DbAlbum> = sqlx::query_as(
            r#"SELECT id, genre_id, artist, title, price, album_art_url FROM albums WHERE id = $1"#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbAlbum::into_domain).transpose()
    }
}

#[async_trait]
impl OrderRepository for PostgresRepo {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepoError> {
        let row: Option<DbOrder> = sqlx::query_as(
            r#"SELECT id, first_name, last_name, address, city, state, postal_code, country, phone,
                      email, order_date, total, transaction_id
               FROM orders WHERE id = $1"#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let details: Vec<DbOrderDetail> = sqlx::query_as(
            r#"SELECT order_id, album_id, unit_price, quantity
               FROM order_details WHERE order_id = $1 ORDER BY id"#,
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.into_domain(details).map(Some)
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresRepo {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepoError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit of work
// ─────────────────────────────────────────────────────────────────────────────

/// A unit of work backed by one PostgreSQL transaction.
pub struct PostgresUnitOfWork {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn album(&mut self, id: AlbumId) -> Result<Option<Album>, RepoError> {
        let row: Option<DbAlbum> = sqlx::query_as(
            r#"SELECT id, genre_id, artist, title, price, album_art_url FROM albums WHERE id = $1"#,
        )
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbAlbum::into_domain).transpose()
    }

    async fn cart(&mut self, id: &CartId) -> Result<Option<Cart>, RepoError> {
        let row: Option<DbCart> =
            sqlx::query_as(r#"SELECT id, created_at FROM carts WHERE id = $1"#)
                .bind(id.as_str())
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbCart::into_domain).transpose()
    }

    async fn add_cart(&mut self, cart: &Cart) -> Result<(), RepoError> {
        sqlx::query(r#"INSERT INTO carts (id, created_at) VALUES ($1, $2)"#)
            .bind(cart.id.as_str())
            .bind(cart.created_at)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn cart_item(&mut self, id: CartItemId) -> Result<Option<CartItem>, RepoError> {
        let row: Option<DbCartItem> = sqlx::query_as(
            r#"SELECT id, cart_id, album_id, count, created_at
               FROM cart_items WHERE id = $1 FOR UPDATE"#,
        )
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbCartItem::into_domain).transpose()
    }

    async fn cart_item_for_album(
        &mut self,
        cart_id: &CartId,
        album_id: AlbumId,
    ) -> Result<Option<CartItem>, RepoError> {
        let row: Option<DbCartItem> = sqlx::query_as(
            r#"SELECT id, cart_id, album_id, count, created_at
               FROM cart_items WHERE cart_id = $1 AND album_id = $2 FOR UPDATE"#,
        )
        .bind(cart_id.as_str())
        .bind(album_id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbCartItem::into_domain).transpose()
    }

    async fn cart_lines(&mut self, cart_id: &CartId) -> Result<Vec<CartLine>, RepoError> {
        let rows: Vec<DbCartLine> = sqlx::query_as(
            r#"SELECT ci.id, ci.cart_id, ci.album_id, ci.count, ci.created_at,
                      a.genre_id, a.artist, a.title, a.price, a.album_art_url
               FROM cart_items ci
               JOIN albums a ON a.id = ci.album_id
               WHERE ci.cart_id = $1
               ORDER BY ci.created_at, ci.id"#,
        )
        .bind(cart_id.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbCartLine::into_domain).collect()
    }

    async fn add_cart_item(&mut self, item: NewCartItem) -> Result<CartItem, RepoError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO cart_items (cart_id, album_id, count, created_at)
               VALUES ($1, $2, $3, $4) RETURNING id"#,
        )
        .bind(item.cart_id.as_str())
        .bind(item.album_id.as_i64())
        .bind(item.count)
        .bind(item.created_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error)?;

        let created = CartItem::from_parts(
            CartItemId::from_i64(id),
            item.cart_id,
            item.album_id,
            item.count,
            item.created_at,
        )?;
        Ok(created)
    }

    async fn update_cart_item(&mut self, item: &CartItem) -> Result<(), RepoError> {
        let result = sqlx::query(r#"UPDATE cart_items SET count = $1 WHERE id = $2"#)
            .bind(item.count)
            .bind(item.id.as_i64())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete_cart_item(&mut self, id: CartItemId) -> Result<(), RepoError> {
        let result = sqlx::query(r#"DELETE FROM cart_items WHERE id = $1"#)
            .bind(id.as_i64())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete_cart_items(&mut self, ids: &[CartItemId]) -> Result<u64, RepoError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let raw: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        let result = sqlx::query(r#"DELETE FROM cart_items WHERE id = ANY($1)"#)
            .bind(&raw)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn add_order(&mut self, order: &NewOrder) -> Result<OrderId, RepoError> {
        let transaction_id = order.transaction_id.as_deref().ok_or_else(|| {
            RepoError::Domain(DomainError::ValidationError(
                "Order has no payment transaction".into(),
            ))
        })?;
        let c = &order.customer;

        let (id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO orders (first_name, last_name, address, city, state, postal_code, country,
                                   phone, email, order_date, total, transaction_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING id"#,
        )
        .bind(&c.first_name)
        .bind(&c.last_name)
        .bind(&c.address)
        .bind(&c.city)
        .bind(&c.state)
        .bind(&c.postal_code)
        .bind(&c.country)
        .bind(&c.phone)
        .bind(&c.email)
        .bind(order.order_date)
        .bind(order.total.amount())
        .bind(transaction_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error)?;

        Ok(OrderId::from_i64(id))
    }

    async fn add_order_detail(
        &mut self,
        order_id: OrderId,
        detail: &NewOrderDetail,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO order_details (order_id, album_id, unit_price, quantity)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(order_id.as_i64())
        .bind(detail.album_id.as_i64())
        .bind(detail.unit_price.amount())
        .bind(detail.quantity)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepoError> {
        self.tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepoError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))
    }
}

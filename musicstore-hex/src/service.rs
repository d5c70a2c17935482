//! Music Store Application Services
//!
//! Orchestrate domain operations through the repository and payment ports.
//! Contain NO infrastructure logic - pure business orchestration.

use std::sync::Arc;

use tracing::Instrument;

use musicstore_types::{
    Album, AlbumFilter, AlbumId, AppError, Cart, CartId, CartItemId, CartView, CatalogRepository,
    ChargeRequest, Currency, CustomerDetails, Genre, Money, NewCartItem, NewOrder,
    NewOrderDetail, Order, OrderId, OrderRepository, PaymentGateway, UnitOfWorkFactory,
};

/// Cart commands: every operation runs inside its own unit of work.
///
/// Generic over the unit-of-work factory and the payment gateway, so tests
/// inject an in-memory store and a simulated gateway.
pub struct CartService<U: UnitOfWorkFactory, G: PaymentGateway> {
    uow: Arc<U>,
    gateway: Arc<G>,
    currency: Currency,
}

impl<U: UnitOfWorkFactory, G: PaymentGateway> CartService<U, G> {
    pub fn new(uow: U, gateway: G, currency: Currency) -> Self {
        Self {
            uow: Arc::new(uow),
            gateway: Arc::new(gateway),
            currency,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Cart Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Adds one copy of an album, creating the cart and the cart item as needed.
    #[tracing::instrument(skip_all, fields(cart_id = %cart_id, album_id = %album_id))]
    pub async fn add_to_cart(&self, cart_id: &CartId, album_id: AlbumId) -> Result<(), AppError> {
        let mut uow = self.uow.begin().await?;

        let Some(album) = uow.album(album_id).await? else {
            tracing::warn!("Album with id {} could not be found.", album_id);
            return Err(AppError::NotFound(format!("Album {}", album_id)));
        };

        if uow.cart(cart_id).await?.is_none() {
            uow.add_cart(&Cart::new(cart_id.clone())).await?;
        }

        match uow.cart_item_for_album(cart_id, album.id).await? {
            Some(mut item) => {
                item.increment()?;
                uow.update_cart_item(&item).await?;
                tracing::debug!(cart_item_id = %item.id, count = item.count, "Incremented cart item");
            }
            None => {
                let item = uow
                    .add_cart_item(NewCartItem::first(cart_id.clone(), album.id))
                    .await?;
                tracing::debug!(cart_item_id = %item.id, "Created cart item");
            }
        }

        uow.commit().await?;
        Ok(())
    }

    /// Takes one copy out of a cart item and returns how many remain.
    ///
    /// The item is deleted when its last copy goes, in which case 0 is returned.
    #[tracing::instrument(skip_all, fields(cart_item_id = %id))]
    pub async fn remove_cart_item(&self, id: CartItemId) -> Result<i32, AppError> {
        let mut uow = self.uow.begin().await?;

        let Some(mut item) = uow.cart_item(id).await? else {
            tracing::warn!("Cart item with id {} could not be found.", id);
            return Err(AppError::NotFound(format!("Cart item {}", id)));
        };

        let remaining = item.decrement();
        if remaining > 0 {
            uow.update_cart_item(&item).await?;
        } else {
            uow.delete_cart_item(item.id).await?;
        }

        uow.commit().await?;
        Ok(remaining)
    }

    /// Deletes every item in the cart. Emptying an empty or unknown cart succeeds.
    #[tracing::instrument(skip_all, fields(cart_id = %cart_id))]
    pub async fn empty_cart(&self, cart_id: &CartId) -> Result<(), AppError> {
        let mut uow = self.uow.begin().await?;

        let ids: Vec<CartItemId> = uow
            .cart_lines(cart_id)
            .await?
            .into_iter()
            .map(|line| line.item.id)
            .collect();
        let deleted = uow.delete_cart_items(&ids).await?;

        uow.commit().await?;
        tracing::debug!(deleted, "Emptied cart");
        Ok(())
    }

    /// Reads the cart's lines priced at current album prices.
    #[tracing::instrument(skip_all, fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<CartView, AppError> {
        let mut uow = self.uow.begin().await?;
        let lines = uow.cart_lines(cart_id).await?;
        uow.rollback().await?;

        Ok(CartView::from_lines(cart_id.clone(), lines)?)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Checkout
    // ─────────────────────────────────────────────────────────────────────────────

    /// Turns the cart into a paid order.
    ///
    /// The cart is priced from the catalog in a read-only unit of work that
    /// is rolled back before the gateway is called, so no transaction stays
    /// open across the network call. From the charge onwards the checkout
    /// runs on its own task and finishes even if the caller goes away: the
    /// order, its details and the removal of the charged copies are written
    /// in a second unit of work. A decline or gateway failure writes nothing.
    #[tracing::instrument(skip_all, fields(cart_id = %cart_id))]
    pub async fn create_order_from_cart(
        &self,
        cart_id: &CartId,
        customer: CustomerDetails,
        payment_token: &str,
        credential: &str,
    ) -> Result<OrderId, AppError> {
        let mut order = NewOrder::new(customer)?;
        let mut uow = self.uow.begin().await?;

        let lines = uow.cart_lines(cart_id).await?;
        if lines.is_empty() {
            uow.rollback().await?;
            return Err(AppError::BadRequest(format!("Cart {} is empty", cart_id)));
        }

        let mut details = Vec::with_capacity(lines.len());
        let mut charged = Vec::with_capacity(lines.len());
        let mut total = Money::zero();
        for line in &lines {
            let album = uow.album(line.item.album_id).await?.ok_or_else(|| {
                AppError::NotFound(format!("Album {}", line.item.album_id))
            })?;
            let detail = NewOrderDetail::snapshot(&album, line.item.count)?;
            total = total.checked_add(detail.line_total()?)?;
            details.push(detail);
            charged.push((line.item.id, line.item.count));
        }
        uow.rollback().await?;
        order.total = total;

        let checkout = PendingCheckout {
            uow: Arc::clone(&self.uow),
            gateway: Arc::clone(&self.gateway),
            currency: self.currency,
            order,
            details,
            charged,
            token: payment_token.to_string(),
            credential: credential.to_string(),
        };
        tokio::spawn(checkout.complete().in_current_span())
            .await
            .map_err(|e| AppError::Internal(format!("Checkout task failed: {}", e)))?
    }

    /// Charges `amount` once and returns the gateway's transaction id.
    ///
    /// The charge runs on its own task, so dropping the caller does not
    /// cancel a payment that has already been sent. It is never retried.
    pub async fn execute_transaction(
        &self,
        token: &str,
        credential: &str,
        amount: Money,
    ) -> Result<String, AppError> {
        let gateway = Arc::clone(&self.gateway);
        let currency = self.currency;
        let token = token.to_string();
        let credential = credential.to_string();

        tokio::spawn(
            async move { charge_once(&*gateway, currency, &token, &credential, amount).await }
                .in_current_span(),
        )
        .await
        .map_err(|e| AppError::Internal(format!("Payment task failed: {}", e)))?
    }
}

/// The part of a checkout that must not be abandoned once started.
struct PendingCheckout<U, G> {
    uow: Arc<U>,
    gateway: Arc<G>,
    currency: Currency,
    order: NewOrder,
    details: Vec<NewOrderDetail>,
    /// Cart items and the copies of each that are being paid for
    charged: Vec<(CartItemId, i32)>,
    token: String,
    credential: String,
}

impl<U: UnitOfWorkFactory, G: PaymentGateway> PendingCheckout<U, G> {
    async fn complete(mut self) -> Result<OrderId, AppError> {
        let transaction_id = charge_once(
            &*self.gateway,
            self.currency,
            &self.token,
            &self.credential,
            self.order.total,
        )
        .await?;
        self.order.transaction_id = Some(transaction_id.clone());

        match self.record().await {
            Ok(order_id) => {
                tracing::info!(order_id = %order_id, %transaction_id, total = %self.order.total, "Order created");
                Ok(order_id)
            }
            Err(e) => {
                tracing::error!(%transaction_id, error = %e, "Payment captured but the order was not stored");
                Err(e)
            }
        }
    }

    /// Writes the order and takes the paid-for copies out of the cart.
    ///
    /// Copies added while the charge was in flight stay in the cart.
    async fn record(&self) -> Result<OrderId, AppError> {
        let mut uow = self.uow.begin().await?;

        let order_id = uow.add_order(&self.order).await?;
        for detail in &self.details {
            uow.add_order_detail(order_id, detail).await?;
        }

        for &(id, count) in &self.charged {
            match uow.cart_item(id).await? {
                Some(mut item) if item.count > count => {
                    item.count -= count;
                    uow.update_cart_item(&item).await?;
                }
                Some(_) => uow.delete_cart_item(id).await?,
                None => tracing::debug!(cart_item_id = %id, "Cart item already gone"),
            }
        }

        uow.commit().await?;
        Ok(order_id)
    }
}

/// Sends a single charge; `paid = false` becomes `PaymentDeclined`.
#[tracing::instrument(skip_all, fields(amount = amount.amount(), currency = %currency))]
async fn charge_once<G: PaymentGateway>(
    gateway: &G,
    currency: Currency,
    token: &str,
    credential: &str,
    amount: Money,
) -> Result<String, AppError> {
    let charge = gateway
        .charge(ChargeRequest {
            amount: amount.amount(),
            currency,
            source_token: token.to_string(),
            credential: credential.to_string(),
        })
        .await?;

    if !charge.paid {
        let reason = charge
            .failure_message
            .unwrap_or_else(|| "Payment was not completed".to_string());
        tracing::warn!(transaction_id = %charge.transaction_id, %reason, "Payment declined");
        return Err(AppError::PaymentDeclined(reason));
    }

    tracing::info!(transaction_id = %charge.transaction_id, "Payment captured");
    Ok(charge.transaction_id)
}

/// Catalog and order queries.
pub struct CatalogService<R: CatalogRepository + OrderRepository> {
    repo: R,
}

impl<R: CatalogRepository + OrderRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn list_genres(&self) -> Result<Vec<Genre>, AppError> {
        self.repo.list_genres().await.map_err(Into::into)
    }

    pub async fn list_albums(&self, filter: AlbumFilter) -> Result<Vec<Album>, AppError> {
        self.repo.list_albums(filter).await.map_err(Into::into)
    }

    /// Gets an album by ID.
    pub async fn get_album(&self, id: AlbumId) -> Result<Album, AppError> {
        self.repo
            .get_album(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Album {}", id))))
    }

    /// Gets a committed order with its details.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, AppError> {
        self.repo
            .get_order(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Order {}", id))))
    }
}

//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod catalog;
mod payment;
mod unit_of_work;

pub use catalog::{AlbumFilter, CatalogRepository, OrderRepository};
pub use payment::{Charge, ChargeRequest, PaymentError, PaymentGateway};
pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory};

/// Everything the HTTP adapter needs from a storage backend.
pub trait Store: UnitOfWorkFactory + CatalogRepository + OrderRepository + Clone {}

impl<T> Store for T where T: UnitOfWorkFactory + CatalogRepository + OrderRepository + Clone {}

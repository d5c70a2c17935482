//! # Music Store Types
//!
//! Domain types and port traits for the music store backend.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Money, Album, Cart, Order)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Album, AlbumId, Cart, CartId, CartItem, CartItemId, CartLine, CartView, Currency,
    CustomerDetails, Genre, GenreId, Money, NewCartItem, NewOrder, NewOrderDetail, Order,
    OrderDetail, OrderId,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{
    AlbumFilter, CatalogRepository, Charge, ChargeRequest, OrderRepository, PaymentError,
    PaymentGateway, Store, UnitOfWork, UnitOfWorkFactory,
};

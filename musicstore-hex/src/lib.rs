//! # Music Store Hex
//!
//! Application service layer and HTTP adapter for the music store.
//!
//! ## Architecture
//!
//! - `service/` - Application services (orchestrate domain operations)
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! `CartService` is generic over `U: UnitOfWorkFactory` and
//! `G: PaymentGateway`, allowing different stores and gateways to be
//! injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::{CartService, CatalogService};

//! # storefront-db: Database Layer for the Storefront
//!
//! This crate provides database access for the storefront backend.
//! It uses SQLite for storage with sqlx for async operations, and owns the
//! order placement transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Data Flow                              │
//! │                                                                         │
//! │  Request handler (external): authenticated user, parsed items          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   storefront-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌─────────────────┐  │   │
//! │  │   │   Database    │   │  Repositories │   │ PlacementEngine │  │   │
//! │  │   │   (pool.rs)   │   │ product/order │   │ (placement.rs)  │  │   │
//! │  │   │               │   │               │   │                 │  │   │
//! │  │   │ SqlitePool    │◄──│ reads/writes  │   │ THE transaction │  │   │
//! │  │   │ + migrations  │   │               │   │                 │  │   │
//! │  │   └───────────────┘   └───────────────┘   └─────────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, order)
//! - [`placement`] - The order placement engine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//! use storefront_core::LineRequest;
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//!
//! let placed = db
//!     .placements()
//!     .place_order(user_id, &[LineRequest::new(1, 2)])
//!     .await?;
//!
//! let my_orders = db.orders().list_for_user(user_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod placement;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use placement::{PlaceOrderError, PlacementEngine};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;

//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  db.orders().list_for_user(7)                                   │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── count(&self)                                                      │
//! │  ├── revenue(&self)                                                    │
//! │  ├── list_for_user(&self, user_id)                                     │
//! │  └── mark_paid(&self, order_id)                                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  The one operation that is NOT a repository call is order placement:   │
//! │  it spans several tables in one transaction and lives in               │
//! │  [`crate::placement`].                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Product CRUD and inventory adjustments
//! - [`OrderRepository`] - Order aggregate queries and the paid transition

pub mod order;
pub mod product;

pub use order::OrderRepository;
pub use product::ProductRepository;

//! # Domain Types
//!
//! Core domain types for the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  order_id (FK)  │       │
//! │  │  title          │   │  user_id        │   │  product_id     │       │
//! │  │  price_cents    │   │  total_cents    │   │  quantity       │       │
//! │  │  inventory      │   │  status         │   │  unit_price ❄   │       │
//! │  │  is_deleted     │   │  created_at     │   │  (frozen)       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  An Order exclusively owns its OrderLines: they are created together   │
//! │  in one transaction and no line is ever added afterwards.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Frozen Price Invariant
//! `OrderLine.unit_price_cents` is captured when the order is placed and
//! never re-derived from the product afterwards. Product prices change;
//! order history does not. `Order.total_cents` is always recomputable as
//! the sum of `unit_price_cents * quantity` over its lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available in the catalog.
///
/// Products are never physically deleted: `is_deleted` hides them from
/// listings while historical order lines keep referencing them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (database-assigned).
    pub id: i64,

    /// Display title shown in the storefront.
    pub title: String,

    /// Optional long description.
    pub description: Option<String>,

    /// Unit price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Units currently in stock. Never negative.
    pub inventory: i64,

    /// Optional product image URL.
    pub image: Option<String>,

    /// Soft-delete flag: excluded from listings, kept for order history.
    pub is_deleted: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether this product has at least `quantity` units in stock.
    #[inline]
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.inventory >= quantity
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// Placement always creates orders as `Created`; the payment collaborator
/// moves them to `Paid` after the gateway confirms the charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order exists, stock is reserved, payment not yet confirmed.
    Created,
    /// Payment confirmed by the payment collaborator.
    Paid,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Created
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
///
/// Immutable after creation except for the status transition performed by
/// the payment collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    /// The user who placed the order.
    pub user_id: i64,
    /// Order total in cents. Always equals the sum of line totals.
    pub total_cents: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item in an order.
/// Uses the snapshot pattern to freeze the unit price at placement time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    /// Quantity ordered. Always positive.
    pub quantity: i64,
    /// Unit price in cents at placement time (frozen).
    pub unit_price_cents: i64,
    /// Position of this line in the original request (0-based).
    pub line_no: i64,
}

impl OrderLine {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total (frozen unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Line Request
// =============================================================================

/// One requested entry in a placement call: "quantity units of product".
///
/// Requests are processed in listed order and repeated product ids are NOT
/// merged - each entry is an independent demand on that product's stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub product_id: i64,
    pub quantity: i64,
}

impl LineRequest {
    /// Convenience constructor, mostly for tests and fixtures.
    pub fn new(product_id: i64, quantity: i64) -> Self {
        LineRequest {
            product_id,
            quantity,
        }
    }
}

// =============================================================================
// Product Payloads
// =============================================================================

/// Payload for creating a product.
///
/// Product creation belongs to the product-management side of the system;
/// placement only ever reads products. Kept here because tests and the seed
/// tool need fixtures.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    /// Initial stock. Must not be negative.
    pub inventory: i64,
    pub image: Option<String>,
}

/// Partial update payload for a product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    /// Absolute stock level set by product management (restocks). Must not
    /// be negative. Sales never come through here - they decrement via the
    /// placement engine.
    pub inventory: Option<i64>,
    pub image: Option<String>,
}

// =============================================================================
// Composed Views
// =============================================================================

/// An order together with its lines, as returned by placement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderWithLines {
    pub order: Order,
    /// Lines in original request order.
    pub lines: Vec<OrderLine>,
}

impl OrderWithLines {
    /// Recomputes the total from the frozen line prices.
    ///
    /// Must always equal `order.total()` - tests verify this for every
    /// order the engine produces.
    pub fn recomputed_total(&self) -> Money {
        self.lines.iter().map(|line| line.line_total()).sum()
    }
}

/// A line hydrated with its product, for display consumers.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineDetail {
    pub line: OrderLine,
    /// The referenced product as it looks today (title/image for display;
    /// its current price is NOT the line's price).
    pub product: Product,
}

/// An order with hydrated lines, as returned by the aggregate queries.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLineDetail>,
}

// =============================================================================
// Unit Tests
// =============================================================================

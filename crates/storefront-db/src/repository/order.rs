//! # Order Repository
//!
//! Read-side queries over committed orders, plus the single status
//! transition the payment collaborator is allowed to make.
//!
//! ## Consistency Notes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Everything in this module is read-committed and mutation-free          │
//! │  (except mark_paid, a one-way status flip).                            │
//! │                                                                         │
//! │  Orders only ever appear here fully formed: the placement engine       │
//! │  commits an order and all of its lines in one transaction, so no       │
//! │  query can observe an order without its lines or a half-applied        │
//! │  inventory decrement.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::product::ProductRepository;
use storefront_core::{Money, Order, OrderDetail, OrderLine, OrderLineDetail};

/// Columns selected for every Order read.
const ORDER_COLUMNS: &str = "id, user_id, total_cents, status, created_at";

/// Columns selected for every OrderLine read.
const LINE_COLUMNS: &str = "id, order_id, product_id, quantity, unit_price_cents, line_no";

/// Repository for order reads and the payment status hook.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Counts all orders, regardless of status.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Total revenue: the sum of every order's total, independent of status.
    ///
    /// Zero when no orders exist (SUM over an empty set is NULL in SQL;
    /// mapped here).
    pub async fn revenue(&self) -> DbResult<Money> {
        let total: Option<i64> = sqlx::query_scalar("SELECT SUM(total_cents) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(Money::from_cents(total.unwrap_or(0)))
    }

    /// Gets an order by id, hydrated with lines and their products.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<OrderDetail>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match order {
            Some(order) => Ok(Some(self.hydrate(order).await?)),
            None => Ok(None),
        }
    }

    /// All orders owned by a user, newest first, hydrated for display.
    pub async fn list_for_user(&self, user_id: i64) -> DbResult<Vec<OrderDetail>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate_all(orders).await
    }

    /// Every order in the store, newest first, for administrative consumers.
    pub async fn list_all(&self) -> DbResult<Vec<OrderDetail>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.hydrate_all(orders).await
    }

    /// Lines for one order, in original request order.
    pub async fn lines_for_order(&self, order_id: i64) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = ?1 ORDER BY line_no"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Marks an order as paid.
    ///
    /// The payment collaborator calls this once its gateway confirms the
    /// charge. Guarded on the current status so a replayed webhook or a
    /// payment for an unknown order is a visible error, not a silent write.
    pub async fn mark_paid(&self, order_id: i64) -> DbResult<()> {
        debug!(order_id = %order_id, "Marking order paid");

        let result = sqlx::query(
            "UPDATE orders SET status = 'paid' WHERE id = ?1 AND status = 'created'",
        )
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (created)", order_id));
        }

        Ok(())
    }

    /// Hydrates one order with its lines and each line's product.
    ///
    /// Products referenced by lines always exist (foreign key + soft
    /// deletes only), so a missing product here is data corruption and
    /// surfaces as an error.
    async fn hydrate(&self, order: Order) -> DbResult<OrderDetail> {
        let products = ProductRepository::new(self.pool.clone());
        let lines = self.lines_for_order(order.id).await?;

        let mut detailed = Vec::with_capacity(lines.len());
        for line in lines {
            let product = products
                .get_by_id(line.product_id)
                .await?
                .ok_or_else(|| DbError::not_found("Product", line.product_id))?;
            detailed.push(OrderLineDetail { line, product });
        }

        Ok(OrderDetail {
            order,
            lines: detailed,
        })
    }

    async fn hydrate_all(&self, orders: Vec<Order>) -> DbResult<Vec<OrderDetail>> {
        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            details.push(self.hydrate(order).await?);
        }
        Ok(details)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

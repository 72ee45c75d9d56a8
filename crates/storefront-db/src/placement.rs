//! # Order Placement Engine
//!
//! The one transaction in the system with a genuine consistency problem:
//! turning `(user_id, items)` into a durable order while guaranteeing stock
//! is never oversold and the recorded total always matches the committed
//! line snapshots.
//!
//! ## The Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                place_order(user_id, items)                              │
//! │                                                                         │
//! │  validate_request(items)          ← before ANY storage access          │
//! │       │                                                                 │
//! │  BEGIN ─────────────────────────────────────────────────┐              │
//! │       │                                                  │              │
//! │  1. load each requested product                          │              │
//! │  2. plan_placement (pure): sequential stock checks,      │ one         │
//! │     frozen prices, total from the same read              │ atomic      │
//! │  3. guarded decrements:                                  │ unit        │
//! │       UPDATE products SET inventory = inventory - ?      │              │
//! │       WHERE id = ? AND inventory >= ?                    │              │
//! │  4. INSERT order + its lines                             │              │
//! │       │                                                  │              │
//! │  COMMIT ────────────────────────────────────────────────┘              │
//! │       │                                                                 │
//! │  Any failure → transaction dropped → automatic ROLLBACK                │
//! │  (no decrement, no order, no lines - zero observable side effects)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Control
//! The choice here is optimistic, compare-and-swap style: the decrement
//! carries its own precondition (`AND inventory >= ?`) instead of locking
//! rows up front. Two placements racing for the last units cannot both get
//! past it:
//!
//! - SQLite serializes writers, so one transaction commits first.
//! - The later transaction either re-reads the decremented inventory and
//!   fails its stock check, hits the guard (0 rows affected → re-read the
//!   real availability and report `InsufficientStock`), or gets a busy/
//!   stale-snapshot error from SQLite, surfaced as `TransactionFailed`.
//!
//! `TransactionFailed` is safe to retry from scratch precisely because the
//! rollback left nothing behind. The engine does not retry internally.
//!
//! ## Not Idempotent
//! Placing the identical request twice creates two orders and decrements
//! stock twice. Deduplication (e.g. a client-supplied request id) belongs
//! to a layer above this one.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::DbError;
use storefront_core::placement::{plan_placement, validate_request};
use storefront_core::{CoreError, LineRequest, Order, OrderLine, OrderStatus, OrderWithLines, Product};

// =============================================================================
// Error Type
// =============================================================================

/// Outcome taxonomy for order placement.
///
/// `Rejected` wraps the caller-visible business errors (invalid request,
/// unknown product, insufficient stock) - retrying the identical request is
/// pointless. `TransactionFailed` is the storage-level outcome (conflict,
/// timeout, connection trouble); the whole call may be retried because no
/// partial effect persists.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    #[error(transparent)]
    Rejected(#[from] CoreError),

    #[error("Transaction failed: {0}")]
    TransactionFailed(#[from] DbError),
}

impl PlaceOrderError {
    /// Whether retrying the whole placement call is meaningful.
    ///
    /// Retrying is always *safe* (failures leave zero side effects); this
    /// answers whether it could ever *succeed* without a changed request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlaceOrderError::TransactionFailed(_))
    }
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(err: sqlx::Error) -> Self {
        PlaceOrderError::TransactionFailed(DbError::from(err))
    }
}

// =============================================================================
// Engine
// =============================================================================

/// The order placement engine.
///
/// Stateless: all state lives in the store, every call is one transaction
/// against the pool, and the engine is safe to clone and invoke
/// concurrently from any number of tasks.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    pool: SqlitePool,
}

impl PlacementEngine {
    /// Creates a new PlacementEngine.
    pub fn new(pool: SqlitePool) -> Self {
        PlacementEngine { pool }
    }

    /// Places an order: executes the unit of work diagrammed above.
    ///
    /// On success the returned [`OrderWithLines`] is the committed order,
    /// lines in request order, total equal to the sum of the frozen line
    /// prices times quantities.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let placed = db
    ///     .placements()
    ///     .place_order(7, &[LineRequest::new(1, 2), LineRequest::new(2, 1)])
    ///     .await?;
    /// assert_eq!(placed.order.total_cents, placed.recomputed_total().cents());
    /// ```
    pub async fn place_order(
        &self,
        user_id: i64,
        items: &[LineRequest],
    ) -> Result<OrderWithLines, PlaceOrderError> {
        // Malformed input never touches storage.
        validate_request(items)?;

        debug!(user_id = %user_id, lines = items.len(), "Placing order");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // Step 1: load every requested product inside the transaction, so
        // stock checks and frozen prices come from one consistent view.
        // Soft-deleted products are loadable by id on purpose; only
        // listings hide them.
        let mut catalog: HashMap<i64, Product> = HashMap::new();
        for item in items {
            if catalog.contains_key(&item.product_id) {
                continue;
            }
            let product = sqlx::query_as::<_, Product>(
                "SELECT id, title, description, price_cents, inventory, image, is_deleted, \
                 created_at, updated_at FROM products WHERE id = ?1",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(product) = product {
                catalog.insert(product.id, product);
            }
            // Missing ids are reported by the plan, in request order.
        }

        // Step 2: sequential checks, frozen prices, total - all pure.
        let plan = plan_placement(items, &catalog)?;

        // Step 3: guarded decrements, one per distinct product. The guard
        // re-states the stock check at write time; a miss means a
        // concurrent placement took the stock between our read and this
        // write.
        for (product_id, quantity) in plan.net_demand() {
            let result = sqlx::query(
                "UPDATE products SET inventory = inventory - ?2, updated_at = ?3 \
                 WHERE id = ?1 AND inventory >= ?2",
            )
            .bind(product_id)
            .bind(quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let available: i64 =
                    sqlx::query_scalar("SELECT inventory FROM products WHERE id = ?1")
                        .bind(product_id)
                        .fetch_one(&mut *tx)
                        .await?;

                debug!(
                    product_id = %product_id,
                    requested = %quantity,
                    available = %available,
                    "Lost inventory race, aborting placement"
                );

                // Dropping `tx` rolls back everything, including earlier
                // decrements in this loop.
                return Err(CoreError::InsufficientStock {
                    product_id,
                    requested: quantity,
                    available,
                }
                .into());
            }
        }

        // Step 4: the order and all of its lines, same transaction.
        let result = sqlx::query(
            "INSERT INTO orders (user_id, total_cents, status, created_at) \
             VALUES (?1, ?2, 'created', ?3)",
        )
        .bind(user_id)
        .bind(plan.total.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let order_id = result.last_insert_rowid();

        let mut lines = Vec::with_capacity(plan.lines.len());
        for (line_no, planned) in plan.lines.iter().enumerate() {
            let line_no = line_no as i64;
            let result = sqlx::query(
                "INSERT INTO order_lines (order_id, product_id, quantity, unit_price_cents, line_no) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(order_id)
            .bind(planned.product_id)
            .bind(planned.quantity)
            .bind(planned.unit_price.cents())
            .bind(line_no)
            .execute(&mut *tx)
            .await?;

            lines.push(OrderLine {
                id: result.last_insert_rowid(),
                order_id,
                product_id: planned.product_id,
                quantity: planned.quantity,
                unit_price_cents: planned.unit_price.cents(),
                line_no,
            });
        }

        tx.commit().await?;

        info!(
            order_id = %order_id,
            user_id = %user_id,
            total = %plan.total,
            lines = lines.len(),
            "Order placed"
        );

        Ok(OrderWithLines {
            order: Order {
                id: order_id,
                user_id,
                total_cents: plan.total.cents(),
                status: OrderStatus::Created,
                created_at: now,
            },
            lines,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use storefront_core::NewProduct;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Current inventory for a product, for assertions.
    async fn inventory_of(pool: &SqlitePool, product_id: i64) -> crate::error::DbResult<i64> {
        let inventory: i64 = sqlx::query_scalar("SELECT inventory FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_one(pool)
            .await?;
        Ok(inventory)
    }

    async fn seed_product(db: &Database, title: &str, price_cents: i64, inventory: i64) -> i64 {
        db.products()
            .insert(&NewProduct {
                title: title.to_string(),
                description: None,
                price_cents,
                inventory,
                image: None,
            })
            .await
            .unwrap()
            .id
    }

    /// The happy path: (25.99 × 2) + (79.99 × 1) = 131.97, stock 50→48 and
    /// 30→29.
    #[tokio::test]
    async fn test_successful_placement_scenario() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Wireless Mouse", 2599, 50).await;
        let keyboard = seed_product(&db, "Mechanical Keyboard", 7999, 30).await;

        let placed = db
            .placements()
            .place_order(7, &[LineRequest::new(mouse, 2), LineRequest::new(keyboard, 1)])
            .await
            .unwrap();

        assert_eq!(placed.order.user_id, 7);
        assert_eq!(placed.order.total_cents, 13197); // $131.97
        assert_eq!(placed.order.status, OrderStatus::Created);
        assert_eq!(placed.lines.len(), 2);

        // Lines preserve request order and frozen prices.
        assert_eq!(placed.lines[0].product_id, mouse);
        assert_eq!(placed.lines[0].quantity, 2);
        assert_eq!(placed.lines[0].unit_price_cents, 2599);
        assert_eq!(placed.lines[1].product_id, keyboard);
        assert_eq!(placed.lines[1].unit_price_cents, 7999);

        assert_eq!(inventory_of(db.pool(), mouse).await.unwrap(), 48);
        assert_eq!(inventory_of(db.pool(), keyboard).await.unwrap(), 29);
    }

    /// The total invariant holds for every order the engine produces, both
    /// in the returned value and in what the store committed.
    #[tokio::test]
    async fn test_total_equals_sum_of_frozen_lines() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Wireless Mouse", 2599, 50).await;
        let keyboard = seed_product(&db, "Mechanical Keyboard", 7999, 30).await;
        let headphones = seed_product(&db, "Noise Cancelling Headphones", 19999, 20).await;

        let carts: Vec<Vec<LineRequest>> = vec![
            vec![LineRequest::new(mouse, 2), LineRequest::new(keyboard, 1)],
            vec![LineRequest::new(headphones, 3)],
            vec![
                LineRequest::new(mouse, 1),
                LineRequest::new(mouse, 4),
                LineRequest::new(keyboard, 2),
            ],
        ];
        for (user_id, items) in carts.iter().enumerate() {
            let placed = db
                .placements()
                .place_order(user_id as i64 + 1, items)
                .await
                .unwrap();
            assert_eq!(placed.recomputed_total().cents(), placed.order.total_cents);
        }

        for detail in db.orders().list_all().await.unwrap() {
            let recomputed: i64 = detail
                .lines
                .iter()
                .map(|l| l.line.unit_price_cents * l.line.quantity)
                .sum();
            assert_eq!(recomputed, detail.order.total_cents);
        }
    }

    /// Overdrawn request: 9999 requested against 50 in stock.
    #[tokio::test]
    async fn test_insufficient_stock_reports_and_changes_nothing() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Wireless Mouse", 2599, 50).await;

        let err = db
            .placements()
            .place_order(7, &[LineRequest::new(mouse, 9999)])
            .await
            .unwrap_err();

        match err {
            PlaceOrderError::Rejected(CoreError::InsufficientStock {
                product_id,
                requested,
                available,
            }) => {
                assert_eq!(product_id, mouse);
                assert_eq!(requested, 9999);
                assert_eq!(available, 50);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_eq!(inventory_of(db.pool(), mouse).await.unwrap(), 50);
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    /// All-or-nothing: a failing line anywhere in the cart leaves every
    /// product untouched and creates nothing.
    #[tokio::test]
    async fn test_atomicity_mixed_cart() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Wireless Mouse", 2599, 50).await;
        let keyboard = seed_product(&db, "Mechanical Keyboard", 7999, 30).await;

        let err = db
            .placements()
            .place_order(
                7,
                &[LineRequest::new(mouse, 2), LineRequest::new(keyboard, 31)],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PlaceOrderError::Rejected(CoreError::InsufficientStock { product_id, .. })
                if product_id == keyboard
        ));

        // The valid first line must not have decremented anything.
        assert_eq!(inventory_of(db.pool(), mouse).await.unwrap(), 50);
        assert_eq!(inventory_of(db.pool(), keyboard).await.unwrap(), 30);
        assert_eq!(db.orders().count().await.unwrap(), 0);

        let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_lines")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(lines, 0);
    }

    /// An unknown product anywhere aborts the whole placement.
    #[tokio::test]
    async fn test_unknown_product_aborts() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Wireless Mouse", 2599, 50).await;

        let err = db
            .placements()
            .place_order(7, &[LineRequest::new(mouse, 1), LineRequest::new(999, 1)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PlaceOrderError::Rejected(CoreError::ProductNotFound(999))
        ));
        assert_eq!(inventory_of(db.pool(), mouse).await.unwrap(), 50);
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    /// Malformed requests never reach storage.
    #[tokio::test]
    async fn test_invalid_requests_rejected() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Wireless Mouse", 2599, 50).await;

        let empty = db.placements().place_order(7, &[]).await.unwrap_err();
        assert!(matches!(
            empty,
            PlaceOrderError::Rejected(CoreError::InvalidRequest { .. })
        ));

        for qty in [0, -3] {
            let err = db
                .placements()
                .place_order(7, &[LineRequest::new(mouse, qty)])
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                PlaceOrderError::Rejected(CoreError::InvalidRequest { .. })
            ));
        }

        assert_eq!(inventory_of(db.pool(), mouse).await.unwrap(), 50);
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    /// A repeated product id is two sequential demands on the same stock,
    /// end to end through the database.
    #[tokio::test]
    async fn test_duplicate_product_sequential_demand() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Wireless Mouse", 2599, 5).await;

        let err = db
            .placements()
            .place_order(7, &[LineRequest::new(mouse, 3), LineRequest::new(mouse, 3)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlaceOrderError::Rejected(CoreError::InsufficientStock {
                requested: 3,
                available: 2,
                ..
            })
        ));
        assert_eq!(inventory_of(db.pool(), mouse).await.unwrap(), 5);

        // The exact-fit split passes and lands as two separate lines.
        let placed = db
            .placements()
            .place_order(7, &[LineRequest::new(mouse, 3), LineRequest::new(mouse, 2)])
            .await
            .unwrap();
        assert_eq!(placed.lines.len(), 2);
        assert_eq!(inventory_of(db.pool(), mouse).await.unwrap(), 0);
    }

    /// Placement is deliberately NOT idempotent: the same request twice is
    /// two orders and two decrements.
    #[tokio::test]
    async fn test_not_idempotent_by_design() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Wireless Mouse", 2599, 50).await;

        let items = [LineRequest::new(mouse, 2)];
        let first = db.placements().place_order(7, &items).await.unwrap();
        let second = db.placements().place_order(7, &items).await.unwrap();

        assert_ne!(first.order.id, second.order.id);
        assert_eq!(db.orders().count().await.unwrap(), 2);
        assert_eq!(inventory_of(db.pool(), mouse).await.unwrap(), 46);
    }

    /// Two placements racing for the last unit: exactly one wins, the
    /// loser sees InsufficientStock, and inventory lands at zero - never
    /// below.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_race_for_last_unit() {
        let db = test_db().await;
        let headphones = seed_product(&db, "Noise Cancelling Headphones", 19999, 1).await;

        let engine_a = db.placements();
        let engine_b = db.placements();

        let a = tokio::spawn(async move {
            engine_a
                .place_order(7, &[LineRequest::new(headphones, 1)])
                .await
        });
        let b = tokio::spawn(async move {
            engine_b
                .place_order(8, &[LineRequest::new(headphones, 1)])
                .await
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "exactly one placement must win: {results:?}");

        let loss = results.iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            loss,
            Err(PlaceOrderError::Rejected(CoreError::InsufficientStock {
                requested: 1,
                available: 0,
                ..
            }))
        ));

        assert_eq!(inventory_of(db.pool(), headphones).await.unwrap(), 0);
        assert_eq!(db.orders().count().await.unwrap(), 1);
    }

    /// Soft-deleted products stay orderable by direct id; only listings
    /// hide them.
    #[tokio::test]
    async fn test_soft_deleted_product_still_orderable() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Wireless Mouse", 2599, 50).await;
        db.products().soft_delete(mouse).await.unwrap();

        let placed = db
            .placements()
            .place_order(7, &[LineRequest::new(mouse, 1)])
            .await
            .unwrap();
        assert_eq!(placed.order.total_cents, 2599);
        assert_eq!(inventory_of(db.pool(), mouse).await.unwrap(), 49);
    }

    /// Revenue: zero on an empty store, then exactly the committed totals.
    #[tokio::test]
    async fn test_revenue_follows_placements() {
        let db = test_db().await;
        assert!(db.orders().revenue().await.unwrap().is_zero());

        let mouse = seed_product(&db, "Wireless Mouse", 2599, 50).await;
        let keyboard = seed_product(&db, "Mechanical Keyboard", 7999, 30).await;
        db.placements()
            .place_order(7, &[LineRequest::new(mouse, 2), LineRequest::new(keyboard, 1)])
            .await
            .unwrap();

        assert_eq!(db.orders().revenue().await.unwrap().cents(), 13197);
    }
}

//! # Placement Planning
//!
//! The pure half of order placement: given the requested lines and the
//! products as they stand *right now*, decide whether the order may exist
//! and, if so, exactly what it will contain.
//!
//! ## Where This Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Order Placement, Split in Two                         │
//! │                                                                         │
//! │  storefront-db::PlacementEngine (I/O half)                             │
//! │  ├── opens the transaction                                             │
//! │  ├── loads the requested products            ──┐                       │
//! │  ├── applies the decrements                    │  in-transaction       │
//! │  └── inserts order + lines, commits          ──┘  reads/writes         │
//! │                   │         ▲                                           │
//! │          products │         │ PlacementPlan                             │
//! │                   ▼         │                                           │
//! │  storefront_core::plan_placement (THIS MODULE, pure)                   │
//! │  ├── walks lines in request order                                      │
//! │  ├── checks stock against a running balance                            │
//! │  ├── freezes unit prices                                               │
//! │  └── computes the total from those same prices                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sequential Demand Semantics
//! A repeated product id is NOT merged with its earlier occurrence. Each
//! entry is checked against the stock remaining after the entries before
//! it. With 5 units in stock, `[(A,3), (A,3)]` fails on the second entry
//! even though `[(A,6)]` would also fail and `[(A,3)]` twice across two
//! requests could each succeed. This matches how requests are observably
//! processed; callers that want merging must merge before calling.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{LineRequest, Product};
use crate::MAX_ORDER_LINES;

// =============================================================================
// Plan Types
// =============================================================================

/// One validated line with its price frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedLine {
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price read during validation. This exact value becomes the
    /// line snapshot AND feeds the total - one consistent view, no re-read.
    pub unit_price: Money,
}

impl PlannedLine {
    /// Line total from the frozen price.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A fully validated placement, ready to be applied by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementPlan {
    /// Lines in original request order.
    pub lines: Vec<PlannedLine>,
    /// Order total: sum of line totals over the frozen prices.
    pub total: Money,
}

impl PlacementPlan {
    /// Net stock demand per product, aggregated in first-seen order.
    ///
    /// Checking is sequential per line, but once every line has passed the
    /// decrement per product is just the sum of its quantities - the engine
    /// issues one guarded UPDATE per distinct product.
    pub fn net_demand(&self) -> Vec<(i64, i64)> {
        let mut order: Vec<i64> = Vec::new();
        let mut totals: HashMap<i64, i64> = HashMap::new();

        for line in &self.lines {
            if !totals.contains_key(&line.product_id) {
                order.push(line.product_id);
            }
            *totals.entry(line.product_id).or_insert(0) += line.quantity;
        }

        order
            .into_iter()
            .map(|id| {
                let qty = totals.get(&id).copied().unwrap_or(0);
                (id, qty)
            })
            .collect()
    }
}

// =============================================================================
// Request Validation
// =============================================================================

/// Validates the shape of a placement request.
///
/// Runs before any storage access: a request rejected here has touched
/// nothing and observed nothing.
///
/// ## Rules
/// - At least one line
/// - At most [`MAX_ORDER_LINES`] lines
/// - Every quantity strictly positive
///
/// ## Example
/// ```rust
/// use storefront_core::placement::validate_request;
/// use storefront_core::types::LineRequest;
///
/// assert!(validate_request(&[LineRequest::new(1, 2)]).is_ok());
/// assert!(validate_request(&[]).is_err());
/// assert!(validate_request(&[LineRequest::new(1, 0)]).is_err());
/// ```
pub fn validate_request(items: &[LineRequest]) -> CoreResult<()> {
    if items.is_empty() {
        return Err(CoreError::invalid_request("order must contain at least one item"));
    }

    if items.len() > MAX_ORDER_LINES {
        return Err(CoreError::invalid_request(format!(
            "order cannot contain more than {MAX_ORDER_LINES} items"
        )));
    }

    for item in items {
        if item.quantity <= 0 {
            return Err(CoreError::invalid_request(format!(
                "quantity for product {} must be positive",
                item.product_id
            )));
        }
    }

    Ok(())
}

// =============================================================================
// Placement Planning
// =============================================================================

/// Plans a placement against the given catalog snapshot.
///
/// `catalog` maps product id to the product row as loaded inside the
/// placement transaction. The plan walks `items` in order:
///
/// 1. Missing product id → [`CoreError::ProductNotFound`], whole plan
///    abandoned.
/// 2. Each line is checked against a running balance: the product's
///    inventory minus what earlier lines of this same request already
///    claimed. Shortfall → [`CoreError::InsufficientStock`] carrying the
///    requested quantity and the balance that line actually saw.
/// 3. The unit price is frozen per line and the total is the sum of the
///    frozen line totals.
///
/// The function is deterministic and does no I/O; callers are responsible
/// for `catalog` reflecting one consistent read.
pub fn plan_placement(
    items: &[LineRequest],
    catalog: &HashMap<i64, Product>,
) -> CoreResult<PlacementPlan> {
    validate_request(items)?;

    // Running stock balance per product id, seeded lazily from the catalog.
    let mut remaining: HashMap<i64, i64> = HashMap::new();
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let product = catalog
            .get(&item.product_id)
            .ok_or(CoreError::ProductNotFound(item.product_id))?;

        let available = remaining
            .entry(item.product_id)
            .or_insert(product.inventory);

        if *available < item.quantity {
            return Err(CoreError::InsufficientStock {
                product_id: item.product_id,
                requested: item.quantity,
                available: *available,
            });
        }

        *available -= item.quantity;

        lines.push(PlannedLine {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: product.price(),
        });
    }

    let total = lines.iter().map(PlannedLine::line_total).sum();

    Ok(PlacementPlan { lines, total })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: i64, price_cents: i64, inventory: i64) -> Product {
        Product {
            id,
            title: format!("Product {id}"),
            description: None,
            price_cents,
            inventory,
            image: None,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<i64, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn test_empty_request_rejected() {
        let err = validate_request(&[]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest { .. }));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        for qty in [0, -1, -50] {
            let err = validate_request(&[LineRequest::new(1, qty)]).unwrap_err();
            assert!(matches!(err, CoreError::InvalidRequest { .. }), "qty {qty}");
        }
    }

    #[test]
    fn test_too_many_lines_rejected() {
        let items: Vec<_> = (0..=MAX_ORDER_LINES as i64)
            .map(|i| LineRequest::new(i, 1))
            .collect();
        assert!(validate_request(&items).is_err());
    }

    #[test]
    fn test_plan_freezes_prices_and_totals() {
        let cat = catalog(vec![product(1, 2599, 50), product(2, 7999, 30)]);
        let plan = plan_placement(
            &[LineRequest::new(1, 2), LineRequest::new(2, 1)],
            &cat,
        )
        .unwrap();

        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].unit_price.cents(), 2599);
        assert_eq!(plan.lines[1].unit_price.cents(), 7999);
        assert_eq!(plan.total.cents(), 13197); // $131.97
    }

    #[test]
    fn test_unknown_product_aborts_plan() {
        let cat = catalog(vec![product(1, 2599, 50)]);
        let err = plan_placement(
            &[LineRequest::new(1, 1), LineRequest::new(99, 1)],
            &cat,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(99)));
    }

    #[test]
    fn test_insufficient_stock_reports_counts() {
        let cat = catalog(vec![product(1, 2599, 50)]);
        let err = plan_placement(&[LineRequest::new(1, 9999)], &cat).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                product_id,
                requested,
                available,
            } => {
                assert_eq!(product_id, 1);
                assert_eq!(requested, 9999);
                assert_eq!(available, 50);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    /// A repeated product id is two independent demands: the second sees
    /// the balance the first left behind, even when a different split of
    /// the same total would have fit.
    #[test]
    fn test_duplicate_product_checked_sequentially() {
        let cat = catalog(vec![product(1, 1000, 5)]);

        let err = plan_placement(
            &[LineRequest::new(1, 3), LineRequest::new(1, 3)],
            &cat,
        )
        .unwrap_err();
        match err {
            CoreError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2); // 5 - 3 from the first line
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // An exact-fit split still passes.
        let plan = plan_placement(
            &[LineRequest::new(1, 3), LineRequest::new(1, 2)],
            &cat,
        )
        .unwrap();
        assert_eq!(plan.net_demand(), vec![(1, 5)]);
    }

    #[test]
    fn test_net_demand_aggregates_in_first_seen_order() {
        let cat = catalog(vec![product(1, 1000, 10), product(2, 500, 10)]);
        let plan = plan_placement(
            &[
                LineRequest::new(2, 1),
                LineRequest::new(1, 2),
                LineRequest::new(2, 3),
            ],
            &cat,
        )
        .unwrap();
        assert_eq!(plan.net_demand(), vec![(2, 4), (1, 2)]);
    }

    /// Everything fails or everything passes: a plan with one bad line
    /// yields no partial plan for the good ones.
    #[test]
    fn test_plan_is_all_or_nothing() {
        let cat = catalog(vec![product(1, 2599, 50), product(2, 7999, 30)]);
        let result = plan_placement(
            &[LineRequest::new(1, 1), LineRequest::new(2, 31)],
            &cat,
        );
        assert!(matches!(
            result,
            Err(CoreError::InsufficientStock { product_id: 2, .. })
        ));
    }
}

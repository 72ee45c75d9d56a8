//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Lookup by id (used by the placement engine, inside its transaction)
//! - Listing for the storefront (excludes soft-deleted)
//! - CRUD for the product-management collaborator
//! - Guarded inventory adjustment for restocks
//!
//! ## Soft Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Products are NEVER physically deleted.                                 │
//! │                                                                         │
//! │  soft_delete(id)  →  is_deleted = 1                                     │
//! │                                                                         │
//! │  list()           →  skips deleted products                            │
//! │  get_by_id(id)    →  still returns them (order history and direct      │
//! │                      lookups keep working)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{NewProduct, Product, ProductUpdate};

/// Columns selected for every Product read. One place to keep them in sync
/// with the `Product` struct.
const PRODUCT_COLUMNS: &str =
    "id, title, description, price_cents, inventory, image, is_deleted, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let catalog = repo.list(50).await?;
/// let product = repo.get_by_id(1).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// Deliberately does NOT filter on `is_deleted`: order history and the
    /// placement engine address products by id, and a product hidden from
    /// the listing is still a real product.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products for the storefront, excluding soft-deleted ones.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_deleted = 0 ORDER BY id LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product and returns it with its assigned id.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        debug!(title = %new.title, "Inserting product");

        if new.price_cents < 0 {
            return Err(DbError::CheckViolation {
                message: "price_cents cannot be negative".to_string(),
            });
        }
        if new.inventory < 0 {
            return Err(DbError::CheckViolation {
                message: "inventory cannot be negative".to_string(),
            });
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (title, description, price_cents, inventory, image, is_deleted, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.price_cents)
        .bind(new.inventory)
        .bind(&new.image)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();

        Ok(Product {
            id,
            title: new.title.clone(),
            description: new.description.clone(),
            price_cents: new.price_cents,
            inventory: new.inventory,
            image: new.image.clone(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a partial update to an existing product.
    ///
    /// `None` fields are left unchanged (COALESCE in SQL). An explicit
    /// negative inventory is rejected before touching the database.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, update: &ProductUpdate) -> DbResult<()> {
        debug!(id = %id, "Updating product");

        if matches!(update.price_cents, Some(p) if p < 0) {
            return Err(DbError::CheckViolation {
                message: "price_cents cannot be negative".to_string(),
            });
        }
        if matches!(update.inventory, Some(inv) if inv < 0) {
            return Err(DbError::CheckViolation {
                message: "inventory cannot be negative".to_string(),
            });
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                title = COALESCE(?2, title),
                description = COALESCE(?3, description),
                price_cents = COALESCE(?4, price_cents),
                inventory = COALESCE(?5, inventory),
                image = COALESCE(?6, image),
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.price_cents)
        .bind(update.inventory)
        .bind(&update.image)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Adjusts product stock by a delta (positive for restocks).
    ///
    /// The guard `inventory + delta >= 0` keeps the non-negative invariant
    /// without a read-modify-write race; a miss means the adjustment would
    /// have overdrawn the stock.
    pub async fn adjust_inventory(&self, id: i64, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting inventory");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET inventory = inventory + ?2, updated_at = ?3
            WHERE id = ?1 AND inventory + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product (with sufficient stock)", id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_deleted = 1.
    ///
    /// ## Why Soft Delete?
    /// Historical order lines still reference this product; it only
    /// disappears from listings.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_deleted = 1, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts listed (non-deleted) products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_deleted = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

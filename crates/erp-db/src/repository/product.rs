//! # Product Repository
//!
//! Catalog and stock levels.
//!
//! ## Stock Changes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Who changes products.stock_quantity                                   │
//! │                                                                         │
//! │  restock()                  +qty   writes StockMovement(IN)            │
//! │  OrderRepository::          -qty   writes StockMovement(OUT)           │
//! │    validate_order()                guarded: WHERE stock_quantity >= qty│
//! │                                                                         │
//! │  Nothing else. CHECK(stock_quantity >= 0) backs the guard.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::stock::insert_movement;
use erp_core::validation::{validate_name, validate_price_cents, validate_quantity, validate_sku};
use erp_core::{MovementDirection, Product};

/// Input for a new product.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    pub purchase_price_cents: i64,
    pub stock_quantity: i64,
    pub safety_stock: i64,
}

pub(crate) async fn fetch_product(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, sku, name, price_cents, purchase_price_cents, stock_quantity, safety_stock
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(product)
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        validate_sku(&new.sku)?;
        validate_name("name", &new.name)?;
        validate_price_cents("price", new.price_cents)?;
        validate_price_cents("purchase_price", new.purchase_price_cents)?;

        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: new.sku.trim().to_string(),
            name: new.name.trim().to_string(),
            price_cents: new.price_cents,
            purchase_price_cents: new.purchase_price_cents,
            stock_quantity: new.stock_quantity,
            safety_stock: new.safety_stock,
        };

        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products
                (id, sku, name, price_cents, purchase_price_cents, stock_quantity, safety_stock)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.purchase_price_cents)
        .bind(product.stock_quantity)
        .bind(product.safety_stock)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: product.sku.clone(),
            },
            other => other,
        })?;

        Ok(product)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, price_cents, purchase_price_cents, stock_quantity, safety_stock
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// All products ordered by SKU.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, price_cents, purchase_price_cents, stock_quantity, safety_stock
            FROM products
            ORDER BY sku
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Changes the list price. Existing order items keep their frozen price.
    pub async fn set_price(&self, id: &str, price_cents: i64) -> DbResult<()> {
        validate_price_cents("price", price_cents)?;

        let result = sqlx::query("UPDATE products SET price_cents = ?1 WHERE id = ?2")
            .bind(price_cents)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Adds stock and journals an IN movement, atomically.
    ///
    /// Returns the new stock level.
    pub async fn restock(&self, id: &str, quantity: i64, user_id: Option<&str>) -> DbResult<i64> {
        validate_quantity(quantity)?;

        let mut tx = self.pool.begin().await?;

        let new_stock: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products SET stock_quantity = stock_quantity + ?1
            WHERE id = ?2
            RETURNING stock_quantity
            "#,
        )
        .bind(quantity)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(new_stock) = new_stock else {
            return Err(DbError::not_found("Product", id));
        };

        insert_movement(&mut tx, id, quantity, MovementDirection::In, user_id).await?;
        tx.commit().await?;

        info!(product_id = %id, quantity, new_stock, "Product restocked");
        Ok(new_stock)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn laptop() -> NewProduct {
        NewProduct {
            sku: "EAN001".to_string(),
            name: "Ordinateur Portable".to_string(),
            price_cents: 120_000,
            purchase_price_cents: 80_000,
            stock_quantity: 10,
            safety_stock: 2,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = repo.insert(&laptop()).await.unwrap();

        assert_eq!(repo.get_by_id(&product.id).await.unwrap().unwrap(), product);
        assert_eq!(repo.get_by_sku("EAN001").await.unwrap().unwrap().id, product.id);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_sku() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(&laptop()).await.unwrap();

        let err = repo.insert(&laptop()).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "EAN001"));
    }

    #[tokio::test]
    async fn test_negative_stock_is_rejected_by_schema() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db.products().insert(&laptop()).await.unwrap();

        let result = sqlx::query("UPDATE products SET stock_quantity = -1 WHERE id = ?1")
            .bind(&product.id)
            .execute(db.pool())
            .await;
        assert!(matches!(
            result.map_err(DbError::from),
            Err(DbError::CheckViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_restock_journals_in_movement() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db.products().insert(&laptop()).await.unwrap();

        let stock = db.products().restock(&product.id, 5, Some("u-1")).await.unwrap();
        assert_eq!(stock, 15);

        let movements = db.stock().list_for_product(&product.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].direction, MovementDirection::In);
        assert_eq!(movements[0].quantity, 5);

        assert!(matches!(
            db.products().restock("missing", 1, None).await,
            Err(DbError::NotFound { .. })
        ));
    }
}

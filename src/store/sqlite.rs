//! SQLite-backed implementation of the `PriceStore` trait.
//!
//! Responsible for durable persistence of the tracked catalogue so that:
//!
//!  - registered products survive restarts
//!  - price history accumulates across rounds as an append-only series
//!  - the tracker operates purely in-memory for snapshotting, using the
//!    store as the source of truth

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use super::PriceStore;
use crate::model::{PriceEntry, Product, ProductWithLatestPrice};

pub struct SqlitePriceStore {
    pool: SqlitePool,
}

impl SqlitePriceStore {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceStore for SqlitePriceStore {
    /// Store or update a product.
    ///
    /// Uses upsert semantics: a second registration for the same id
    /// overwrites name and url rather than failing.
    async fn insert_product(&self, product: &Product) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, url)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                url = excluded.url;
        "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.url)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load all products. Called once at startup to rebuild the in-memory
    /// registry.
    async fn all_products(&self) -> anyhow::Result<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name, url FROM products ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            products.push(Product {
                id: row.get("id"),
                name: row.get("name"),
                url: row.get("url"),
            });
        }

        Ok(products)
    }

    async fn products_with_latest_price(&self) -> anyhow::Result<Vec<ProductWithLatestPrice>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.name, p.url, pe.price, pe.timestamp
            FROM products p
            LEFT JOIN (
                SELECT product_id, price, timestamp,
                       ROW_NUMBER() OVER (PARTITION BY product_id ORDER BY timestamp DESC, id DESC) AS rn
                FROM price_entries
            ) pe ON pe.product_id = p.id AND pe.rn = 1
            ORDER BY p.name;
        "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            products.push(ProductWithLatestPrice {
                product: Product {
                    id: row.get("id"),
                    name: row.get("name"),
                    url: row.get("url"),
                },
                latest_price: row.get::<Option<f64>, _>("price"),
                last_updated: row.get::<Option<DateTime<Utc>>, _>("timestamp"),
            });
        }

        Ok(products)
    }

    async fn append_price(
        &self,
        product_id: &str,
        price: f64,
        timestamp: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO price_entries (product_id, price, timestamp) VALUES (?, ?, ?)")
            .bind(product_id)
            .bind(price)
            .bind(timestamp)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn price_history(&self, product_id: &str, limit: u32) -> anyhow::Result<Vec<PriceEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, price, timestamp
            FROM price_entries
            WHERE product_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?;
        "#,
        )
        .bind(product_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(PriceEntry {
                id: row.get("id"),
                product_id: row.get("product_id"),
                price: row.get("price"),
                timestamp: row.get("timestamp"),
            });
        }

        Ok(entries)
    }

    async fn product_exists(&self, product_id: &str) -> anyhow::Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}

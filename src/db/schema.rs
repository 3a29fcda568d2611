use sqlx::SqlitePool;

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    // Products
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS products (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  url TEXT NOT NULL,
  created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
"#,
    )
    .execute(pool)
    .await?;

    // Price entries
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS price_entries (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  product_id TEXT NOT NULL,
  price REAL NOT NULL,
  timestamp DATETIME NOT NULL,
  FOREIGN KEY (product_id) REFERENCES products (id)
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE INDEX IF NOT EXISTS idx_price_entries_product_id ON price_entries (product_id);"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE INDEX IF NOT EXISTS idx_price_entries_timestamp ON price_entries (timestamp);"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

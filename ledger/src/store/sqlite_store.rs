//! SqliteSwapLedger
//! -----------------
//! SQLite-backed implementation of the `SwapLedger` trait. It is responsible
//! for durable persistence of accepted executions so that:
//!
//!  - the audit trail survives restarts
//!  - every accepted execution is recorded exactly once per pipeline run
//!  - the pipelines stay purely in-memory and delegate durability here
use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use super::SwapLedger;
use crate::model::LedgerEntry;

/// SQLite-based append-only ledger.
///
/// Provides:
///   - schema creation on startup
///   - insert-only appends (`record`)
///   - audit readback (`load_all`, `count`)
pub struct SqliteSwapLedger {
    pool: SqlitePool,
}

impl SqliteSwapLedger {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating the file if needed) and ensure schema exists.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // An in-memory database lives and dies with its connection, so the
        // pool must be pinned to one connection to keep the schema visible.
        let max_connections = if url.contains(":memory:") { 1 } else { 8 };
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        // Creates table if it does not exist. Amounts are stored as decimal
        // strings to avoid float drift.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS swap_ledger (
                tx_hash TEXT PRIMARY KEY,

                token_in TEXT NOT NULL,
                token_out TEXT NOT NULL,

                amount_in TEXT NOT NULL,
                amount_out TEXT NOT NULL,

                from_address TEXT NOT NULL,
                timestamp_ms INTEGER NOT NULL
            );
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

fn decode_amount(column: &str, raw: &str) -> anyhow::Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| anyhow::anyhow!("invalid decimal in column {}: '{}': {}", column, raw, e))
}

#[async_trait]
impl SwapLedger for SqliteSwapLedger {
    /// Append one accepted execution.
    ///
    /// The tx hash is the primary key, so a duplicate append for the same
    /// execution surfaces as an error instead of a silent double record.
    async fn record(&self, entry: &LedgerEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO swap_ledger (
                tx_hash, token_in, token_out,
                amount_in, amount_out,
                from_address, timestamp_ms
            )
            VALUES (?, ?, ?, ?, ?, ?, ?);
        "#,
        )
        .bind(&entry.tx_hash)
        .bind(&entry.token_in)
        .bind(&entry.token_out)
        .bind(entry.amount_in.to_string())
        .bind(entry.amount_out.to_string())
        .bind(&entry.from)
        .bind(entry.timestamp_ms as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_all(&self) -> anyhow::Result<Vec<LedgerEntry>> {
        let rows = sqlx::query("SELECT * FROM swap_ledger ORDER BY timestamp_ms ASC")
            .fetch_all(&self.pool)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());

        for row in rows {
            let amount_in: String = row.get("amount_in");
            let amount_out: String = row.get("amount_out");

            entries.push(LedgerEntry {
                tx_hash: row.get("tx_hash"),
                token_in: row.get("token_in"),
                token_out: row.get("token_out"),
                amount_in: decode_amount("amount_in", &amount_in)?,
                amount_out: decode_amount("amount_out", &amount_out)?,
                from: row.get("from_address"),
                timestamp_ms: row.get::<i64, _>("timestamp_ms") as u64,
            });
        }

        Ok(entries)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM swap_ledger")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("n") as u64)
    }
}

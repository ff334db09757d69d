//! Source store access: one table per monitored network element with
//! columns `(Date, indicateur, valeur)`.

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Params, Pool, Value};

use crate::models::CounterRow;
use crate::services::schema::validate_identifier;
use crate::utils::TransformResult;

#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Distinct dates present in a table, as server-rendered strings.
    async fn distinct_dates(&self, table: &str) -> TransformResult<Vec<String>>;

    /// Counter rows of one date whose names start with any of the prefixes.
    async fn rows_matching(
        &self,
        table: &str,
        date: &str,
        prefixes: &[String],
    ) -> TransformResult<Vec<CounterRow>>;
}

pub struct MySqlSourceStore {
    pool: Pool,
}

impl MySqlSourceStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn disconnect(self) {
        if let Err(e) = self.pool.disconnect().await {
            tracing::warn!("Error closing source connection pool: {}", e);
        }
    }
}

#[async_trait]
impl SourceStore for MySqlSourceStore {
    async fn distinct_dates(&self, table: &str) -> TransformResult<Vec<String>> {
        let table = validate_identifier(table)?;
        // CAST keeps the date an opaque string whatever the column type is
        let query = format!("SELECT DISTINCT CAST(Date AS CHAR) FROM {}", table);
        let mut conn = self.pool.get_conn().await?;
        let rows: Vec<(String,)> = conn.query(query).await?;
        let dates: Vec<String> = rows.into_iter().map(|(date,)| date).collect();
        tracing::info!("Extracted {} distinct dates from {}", dates.len(), table);
        Ok(dates)
    }

    async fn rows_matching(
        &self,
        table: &str,
        date: &str,
        prefixes: &[String],
    ) -> TransformResult<Vec<CounterRow>> {
        let table = validate_identifier(table)?;
        if prefixes.is_empty() {
            return Ok(Vec::new());
        }
        let filters = vec!["indicateur LIKE ?"; prefixes.len()].join(" OR ");
        let query =
            format!("SELECT indicateur, valeur FROM {} WHERE Date = ? AND ({})", table, filters);
        let mut params: Vec<Value> = Vec::with_capacity(prefixes.len() + 1);
        params.push(Value::from(date));
        for prefix in prefixes {
            params.push(Value::from(format!("{}%", prefix)));
        }

        let mut conn = self.pool.get_conn().await?;
        let rows: Vec<(String, f64)> = conn.exec(query, Params::Positional(params)).await?;
        Ok(rows.into_iter().map(|(name, value)| CounterRow { name, value }).collect())
    }
}

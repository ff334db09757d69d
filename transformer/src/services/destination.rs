//! Destination store access.
//!
//! Every statement runs under driver autocommit: each summary and detail
//! insert commits immediately and independently, and a failed statement
//! affects only itself before the error propagates.

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Params, Pool, Value};

use crate::services::schema::{validate_identifier, SUMMARY_TABLE};
use crate::utils::TransformResult;

/// Typed cell of one destination row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Id(u64),
    Text(String),
    NullableText(Option<String>),
    Float(Option<f64>),
}

impl From<ColumnValue> for Value {
    fn from(value: ColumnValue) -> Self {
        match value {
            ColumnValue::Id(id) => Value::from(id),
            ColumnValue::Text(text) => Value::from(text),
            ColumnValue::NullableText(Some(text)) => Value::from(text),
            ColumnValue::NullableText(None) => Value::NULL,
            ColumnValue::Float(Some(value)) => Value::from(value),
            ColumnValue::Float(None) => Value::NULL,
        }
    }
}

#[async_trait]
pub trait DestinationStore: Send + Sync {
    /// Execute one idempotent DDL statement.
    async fn execute_ddl(&self, ddl: &str) -> TransformResult<()>;

    /// Insert a summary record and return its generated identity.
    async fn insert_summary(&self, date: &str, node: &str) -> TransformResult<u64>;

    /// Insert one detail row. Columns must already be validated identifiers
    /// in the same order as `values`.
    async fn insert_row(
        &self,
        table: &str,
        columns: &[String],
        values: Vec<ColumnValue>,
    ) -> TransformResult<()>;
}

pub struct MySqlDestinationStore {
    pool: Pool,
}

impl MySqlDestinationStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn disconnect(self) {
        if let Err(e) = self.pool.disconnect().await {
            tracing::warn!("Error closing destination connection pool: {}", e);
        }
    }
}

#[async_trait]
impl DestinationStore for MySqlDestinationStore {
    async fn execute_ddl(&self, ddl: &str) -> TransformResult<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.query_drop(ddl).await?;
        Ok(())
    }

    async fn insert_summary(&self, date: &str, node: &str) -> TransformResult<u64> {
        let mut conn = self.pool.get_conn().await?;
        let query = format!("INSERT INTO {} (Date, Node) VALUES (?, ?)", SUMMARY_TABLE);
        conn.exec_drop(query, (date, node)).await?;
        let id = conn
            .last_insert_id()
            .ok_or_else(|| anyhow::anyhow!("no generated id after summary insert"))?;
        tracing::debug!("Inserted into {}: Date={}, Node={}, Id={}", SUMMARY_TABLE, date, node, id);
        Ok(id)
    }

    async fn insert_row(
        &self,
        table: &str,
        columns: &[String],
        values: Vec<ColumnValue>,
    ) -> TransformResult<()> {
        let table = validate_identifier(table)?;
        for column in columns {
            validate_identifier(column)?;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        let query = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );
        let params: Vec<Value> = values.into_iter().map(Value::from).collect();

        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(query, Params::Positional(params)).await?;
        tracing::debug!("Inserted into {}", table);
        Ok(())
    }
}

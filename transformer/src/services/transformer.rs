//! Per-category orchestration: table loop, date loop, family/KPI loop.
//!
//! One Transformer instance serves one data category and owns its source
//! and destination stores. All processing is strictly sequential; each
//! (table, date) is handled independently and re-running one inserts a new
//! summary row rather than upserting.

use std::collections::BTreeMap;

use regex::Regex;

use crate::models::{Catalog, Category, KpiDefinition, KpiFamily};
use crate::services::destination::{ColumnValue, DestinationStore};
use crate::services::evaluator;
use crate::services::grouper::{self, FamilyBuckets, KpiRoleValues};
use crate::services::schema;
use crate::services::source::SourceStore;
use crate::services::suffix::OperatorMap;
use crate::utils::TransformResult;

/// Load source table names from an external list, one per line.
///
/// Names that would be unsafe as SQL identifiers are a data-quality
/// anomaly: skipped with a warning, never interpolated into a query.
pub fn load_table_list(path: &str) -> TransformResult<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let mut tables = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match schema::validate_identifier(line) {
            Ok(_) => tables.push(line.to_string()),
            Err(_) => tracing::warn!("Skipping unsafe table name in {}: {}", path, line),
        }
    }
    tracing::info!("Loaded {} tables from {}", tables.len(), path);
    Ok(tables)
}

pub struct Transformer<S, D> {
    category: Category,
    catalog: Catalog,
    operators: OperatorMap,
    node_pattern: Regex,
    tables: Vec<String>,
    source: S,
    destination: D,
}

impl<S: SourceStore, D: DestinationStore> Transformer<S, D> {
    pub fn new(
        category: Category,
        catalog: Catalog,
        operators: OperatorMap,
        node_pattern: Regex,
        tables: Vec<String>,
        source: S,
        destination: D,
    ) -> Self {
        Self { category, catalog, operators, node_pattern, tables, source, destination }
    }

    pub fn into_stores(self) -> (S, D) {
        (self.source, self.destination)
    }

    /// Run the full load for this category.
    pub async fn process(&self) -> TransformResult<()> {
        self.create_tables().await?;
        for table in &self.tables {
            let Some(node) = self.extract_node(table) else {
                continue;
            };
            let dates = self.source.distinct_dates(table).await?;
            for date in dates {
                self.process_date(table, &date, &node).await?;
            }
        }
        Ok(())
    }

    async fn create_tables(&self) -> TransformResult<()> {
        for ddl in schema::synthesize(&self.catalog)? {
            self.destination.execute_ddl(&ddl).await?;
        }
        tracing::info!("Tables created for {} in destination database", self.category);
        Ok(())
    }

    fn extract_node(&self, table: &str) -> Option<String> {
        match self.node_pattern.captures(table).and_then(|c| c.get(1)) {
            Some(m) => {
                let node = m.as_str().to_uppercase();
                tracing::debug!("Extracted node '{}' from table '{}'", node, table);
                Some(node)
            },
            None => {
                tracing::warn!("No node found in table name: {}", table);
                None
            },
        }
    }

    async fn process_date(&self, table: &str, date: &str, node: &str) -> TransformResult<()> {
        let summary_id = self.destination.insert_summary(date, node).await?;

        for family in self.catalog.families() {
            self.process_family(table, date, summary_id, family).await?;
        }
        for kpi in self.catalog.standalone_kpis() {
            self.process_standalone(table, date, summary_id, kpi).await?;
        }
        Ok(())
    }

    async fn process_family(
        &self,
        table: &str,
        date: &str,
        summary_id: u64,
        family: &KpiFamily,
    ) -> TransformResult<()> {
        let prefixes = self.catalog.family_prefixes(family);
        let rows = self.source.rows_matching(table, date, &prefixes).await?;
        if rows.is_empty() {
            tracing::warn!("No data found for {} on {} in {}", family.name, date, table);
        }
        let members = self.catalog.family_members(family);
        let grouped = grouper::group_family(&rows, &family.name, &members);
        for (suffix, buckets) in grouped {
            self.write_family_row(summary_id, family, &members, &suffix, &buckets).await?;
        }
        Ok(())
    }

    async fn write_family_row(
        &self,
        summary_id: u64,
        family: &KpiFamily,
        members: &[&KpiDefinition],
        suffix: &str,
        buckets: &FamilyBuckets,
    ) -> TransformResult<()> {
        let kpi_values: Vec<Option<f64>> = members
            .iter()
            .zip(buckets)
            .map(|(kpi, values)| evaluator::evaluate(kpi, values))
            .collect();

        let mut columns: Vec<String> =
            vec!["kpi_id".to_string(), "operator".to_string(), "suffix".to_string()];
        let mut values = vec![
            ColumnValue::Id(summary_id),
            ColumnValue::Text(self.operators.resolve(suffix)),
            ColumnValue::Text(suffix.to_string()),
        ];

        // raw counter totals, fanned out across every member declaring them
        for counter in schema::family_counter_columns(members) {
            let mut total = 0.0;
            for (kpi, bucket) in members.iter().zip(buckets) {
                if let Some((role, slot)) = grouper::role_slot(kpi, &counter) {
                    total += bucket.role(role).at(slot).unwrap_or(0.0);
                }
            }
            columns.push(counter);
            values.push(ColumnValue::Float(Some(total)));
        }

        let by_name: BTreeMap<&str, Option<f64>> = members
            .iter()
            .zip(&kpi_values)
            .map(|(kpi, value)| (kpi.name.as_str(), *value))
            .collect();
        for (name, value) in &by_name {
            columns.push((*name).to_string());
            values.push(ColumnValue::Float(*value));
        }

        let non_null: Vec<f64> = kpi_values.iter().copied().flatten().collect();
        let family_sum =
            if non_null.is_empty() { None } else { Some(non_null.iter().sum::<f64>()) };
        columns.push("family_sum".to_string());
        values.push(ColumnValue::Float(family_sum));

        let table = schema::detail_table_name(&family.name);
        self.destination.insert_row(&table, &columns, values).await?;
        tracing::debug!(
            "Inserted into {}: kpi_id={}, suffix={}, family_sum={:?}",
            table,
            summary_id,
            suffix,
            family_sum
        );
        Ok(())
    }

    async fn process_standalone(
        &self,
        table: &str,
        date: &str,
        summary_id: u64,
        kpi: &KpiDefinition,
    ) -> TransformResult<()> {
        let prefixes = kpi.all_prefixes();
        let rows = self.source.rows_matching(table, date, &prefixes).await?;
        if rows.is_empty() {
            tracing::warn!("No data found for {} on {} in {}", kpi.name, date, table);
        }
        let grouped = grouper::group_standalone(&rows, kpi);
        for (suffix, bucket) in grouped {
            self.write_standalone_row(summary_id, kpi, &suffix, &bucket).await?;
        }
        Ok(())
    }

    async fn write_standalone_row(
        &self,
        summary_id: u64,
        kpi: &KpiDefinition,
        suffix: &str,
        bucket: &KpiRoleValues,
    ) -> TransformResult<()> {
        let value = evaluator::evaluate(kpi, bucket);

        let mut columns = vec!["kpi_id".to_string()];
        let mut values = vec![ColumnValue::Id(summary_id)];
        if kpi.per_suffix {
            columns.push("suffix".to_string());
            values.push(ColumnValue::Text(suffix.to_string()));
            columns.push("operator".to_string());
            values.push(ColumnValue::Text(self.operators.resolve(suffix)));
        } else {
            columns.push("operator".to_string());
            values.push(ColumnValue::NullableText(None));
        }

        // numerator wins over denominator wins over additional when a
        // prefix is declared in more than one role
        for prefix in kpi.all_prefixes() {
            let total = grouper::role_slot(kpi, &prefix)
                .and_then(|(role, slot)| bucket.role(role).at(slot))
                .unwrap_or(0.0);
            columns.push(prefix);
            values.push(ColumnValue::Float(Some(total)));
        }
        columns.push("value".to_string());
        values.push(ColumnValue::Float(value));

        let table = schema::detail_table_name(&kpi.name);
        self.destination.insert_row(&table, &columns, values).await?;
        tracing::debug!(
            "Inserted into {}: kpi_id={}, suffix={}, value={:?}",
            table,
            summary_id,
            suffix,
            value
        );
        Ok(())
    }
}

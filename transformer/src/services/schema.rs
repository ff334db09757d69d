//! Destination schema synthesis.
//!
//! Table and column names are derived from KPI/family names and counter
//! prefixes, so every identifier passes validation before it is embedded in
//! DDL or DML. Column order is part of the contract with downstream
//! consumers and must be deterministic across repeated synthesis.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Catalog, KpiDefinition, KpiFamily};
use crate::utils::{TransformError, TransformResult};

pub const SUMMARY_TABLE: &str = "kpi_summary";

/// MySQL caps identifiers at 64 characters.
const MAX_IDENTIFIER_LEN: usize = 64;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

/// Validate a business name before it becomes a SQL identifier.
///
/// Names are embedded verbatim in DDL and DML, so anything outside
/// alphanumeric/underscore is rejected rather than escaped.
pub fn validate_identifier(name: &str) -> TransformResult<&str> {
    if name.len() > MAX_IDENTIFIER_LEN || !IDENTIFIER_RE.is_match(name) {
        return Err(TransformError::invalid_identifier(name));
    }
    Ok(name)
}

pub fn detail_table_name(base: &str) -> String {
    format!("{}_details", base)
}

pub fn summary_table_ddl() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    \
         Id INT NOT NULL AUTO_INCREMENT PRIMARY KEY,\n    \
         Date DATETIME NOT NULL,\n    \
         Node VARCHAR(50) NOT NULL\n);",
        SUMMARY_TABLE
    )
}

/// Counter columns of a family table: the sorted union of numerator
/// prefixes across all members, then denominator prefixes not already
/// included, then additional prefixes not already included. Collisions
/// resolve by first-occurrence precedence.
pub fn family_counter_columns(members: &[&KpiDefinition]) -> Vec<String> {
    let mut numerator = BTreeSet::new();
    let mut denominator = BTreeSet::new();
    let mut additional = BTreeSet::new();
    for member in members {
        numerator.extend(member.numerator.iter().cloned());
        denominator.extend(member.denominator.iter().cloned());
        additional.extend(member.additional.iter().cloned());
    }

    let mut columns: Vec<String> = numerator.iter().cloned().collect();
    columns.extend(denominator.iter().filter(|c| !numerator.contains(*c)).cloned());
    columns.extend(
        additional.iter().filter(|c| !numerator.contains(*c) && !denominator.contains(*c)).cloned(),
    );
    columns
}

/// Computed-value columns of a family table, alphabetically sorted.
pub fn family_kpi_columns(family: &KpiFamily) -> Vec<String> {
    let mut names: Vec<String> = family.kpis.clone();
    names.sort();
    names
}

pub fn family_table_ddl(catalog: &Catalog, family: &KpiFamily) -> TransformResult<String> {
    let table = detail_table_name(validate_identifier(&family.name)?);
    let members = catalog.family_members(family);

    let mut columns = vec![
        "id INT NOT NULL AUTO_INCREMENT PRIMARY KEY".to_string(),
        "kpi_id INT NOT NULL".to_string(),
        "operator VARCHAR(50)".to_string(),
        "suffix VARCHAR(50)".to_string(),
    ];
    for counter in family_counter_columns(&members) {
        columns.push(format!("{} FLOAT", validate_identifier(&counter)?));
    }
    for kpi in family_kpi_columns(family) {
        columns.push(format!("{} FLOAT", validate_identifier(&kpi)?));
    }
    columns.push("family_sum FLOAT".to_string());

    ensure_unique_columns(&table, &columns)?;
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {},\n    FOREIGN KEY (kpi_id) REFERENCES {}(Id)\n);",
        table,
        columns.join(",\n    "),
        SUMMARY_TABLE
    ))
}

pub fn standalone_table_ddl(kpi: &KpiDefinition) -> TransformResult<String> {
    let table = detail_table_name(validate_identifier(&kpi.name)?);

    let mut columns = vec![
        "id INT NOT NULL AUTO_INCREMENT PRIMARY KEY".to_string(),
        "kpi_id INT NOT NULL".to_string(),
    ];
    if kpi.per_suffix {
        columns.push("suffix VARCHAR(50)".to_string());
    }
    columns.push("operator VARCHAR(50)".to_string());
    for prefix in kpi.all_prefixes() {
        columns.push(format!("{} FLOAT", validate_identifier(&prefix)?));
    }
    columns.push("value FLOAT".to_string());

    ensure_unique_columns(&table, &columns)?;
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {},\n    FOREIGN KEY (kpi_id) REFERENCES {}(Id)\n);",
        table,
        columns.join(",\n    "),
        SUMMARY_TABLE
    ))
}

/// All DDL statements for a catalog, summary table first.
pub fn synthesize(catalog: &Catalog) -> TransformResult<Vec<String>> {
    let mut statements = vec![summary_table_ddl()];
    for family in catalog.families() {
        statements.push(family_table_ddl(catalog, family)?);
    }
    for kpi in catalog.standalone_kpis() {
        statements.push(standalone_table_ddl(kpi)?);
    }
    Ok(statements)
}

fn ensure_unique_columns(table: &str, columns: &[String]) -> TransformResult<()> {
    let mut seen = BTreeSet::new();
    for column in columns {
        let name = column.split_whitespace().next().unwrap_or_default();
        if !seen.insert(name) {
            return Err(TransformError::schema(table, format!("duplicate column {}", name)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Formula;

    fn ratio() -> Formula {
        Formula::RatioOfSums { scale: 100.0, complement: false }
    }

    fn sample_catalog() -> Catalog {
        let kpis = vec![
            KpiDefinition::new("B_Kpi", ratio())
                .numerator(&["Zeta", "Alpha"])
                .denominator(&["Mid", "Alpha"])
                .per_suffix()
                .family("Fam"),
            KpiDefinition::new("A_Kpi", Formula::CapacityMinusRatio)
                .numerator(&["Beta"])
                .denominator(&["Mid"])
                .additional(&["Extra"])
                .per_suffix()
                .family("Fam"),
        ];
        let families = vec![KpiFamily::new("Fam", &["B_Kpi", "A_Kpi"])];
        Catalog::new(kpis, families).unwrap()
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("kpi_summary").is_ok());
        assert!(validate_identifier("TrunkrouteNSCAN").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1abc").is_err());
        assert!(validate_identifier("bad-name").is_err());
        assert!(validate_identifier("a;DROP TABLE x").is_err());
        assert!(validate_identifier(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_family_counter_columns_role_blocks_sorted() {
        let catalog = sample_catalog();
        let family = &catalog.families()[0];
        let members = catalog.family_members(family);
        // numerators sorted, then denominators not already present, then
        // additionals; Alpha appears once in the numerator block
        assert_eq!(
            family_counter_columns(&members),
            vec!["Alpha", "Beta", "Zeta", "Mid", "Extra"]
        );
    }

    #[test]
    fn test_family_ddl_is_deterministic() {
        let catalog = sample_catalog();
        let family = &catalog.families()[0];
        let first = family_table_ddl(&catalog, family).unwrap();
        let second = family_table_ddl(&catalog, family).unwrap();
        assert_eq!(first, second);
        // computed-value columns are alphabetical, family_sum trails
        let a = first.find("A_Kpi FLOAT").unwrap();
        let b = first.find("B_Kpi FLOAT").unwrap();
        let sum = first.find("family_sum FLOAT").unwrap();
        assert!(a < b && b < sum);
    }

    #[test]
    fn test_standalone_ddl_suffix_column_only_when_scoped() {
        let scoped = KpiDefinition::new("Scoped", ratio())
            .numerator(&["N"])
            .denominator(&["D"])
            .per_suffix();
        let ddl = standalone_table_ddl(&scoped).unwrap();
        assert!(ddl.contains("suffix VARCHAR(50)"));

        let global =
            KpiDefinition::new("Global", ratio()).numerator(&["N"]).denominator(&["D"]);
        let ddl = standalone_table_ddl(&global).unwrap();
        assert!(!ddl.contains("suffix VARCHAR(50)"));
        assert!(ddl.contains("operator VARCHAR(50)"));
        assert!(ddl.contains("value FLOAT"));
    }

    #[test]
    fn test_standalone_ddl_deduplicates_shared_prefix() {
        let kpi = KpiDefinition::new("Late", ratio())
            .numerator(&["LatePkts"])
            .denominator(&["LatePkts", "SuccPkts"])
            .per_suffix();
        let ddl = standalone_table_ddl(&kpi).unwrap();
        assert_eq!(ddl.matches("LatePkts FLOAT").count(), 1);
    }

    #[test]
    fn test_unsafe_name_rejected() {
        let kpi = KpiDefinition::new("bad name", ratio()).numerator(&["N"]).denominator(&["D"]);
        assert!(standalone_table_ddl(&kpi).is_err());
    }

    #[test]
    fn test_synthesize_summary_first() {
        let statements = synthesize(&sample_catalog()).unwrap();
        assert!(statements[0].contains("kpi_summary"));
        assert_eq!(statements.len(), 2);
    }
}

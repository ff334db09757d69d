//! Declarative KPI model: definitions, families and the per-category catalog.
//!
//! The catalog is immutable after startup; `Catalog::new` is the single
//! validation point for family references and formula arity.

use crate::models::formula::Formula;
use crate::utils::{TransformError, TransformResult};

/// One raw counter row retrieved from the source store.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterRow {
    pub name: String,
    pub value: f64,
}

impl CounterRow {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), value }
    }
}

/// Data category a worker processes. Each category owns its destination
/// database, table list and node-name pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    FiveMinute,
    FifteenMinute,
    Gateway,
}

impl Category {
    pub const ALL: [Category; 3] =
        [Category::FiveMinute, Category::FifteenMinute, Category::Gateway];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FiveMinute => "5min",
            Category::FifteenMinute => "15min",
            Category::Gateway => "mgw",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one KPI.
///
/// Prefix lists are ordered: positional formulas index into them, and the
/// order also fixes the counter columns of standalone detail tables.
#[derive(Debug, Clone)]
pub struct KpiDefinition {
    pub name: String,
    pub numerator: Vec<String>,
    pub denominator: Vec<String>,
    pub additional: Vec<String>,
    pub per_suffix: bool,
    pub family: Option<String>,
    pub formula: Formula,
}

impl KpiDefinition {
    pub fn new(name: impl Into<String>, formula: Formula) -> Self {
        Self {
            name: name.into(),
            numerator: Vec::new(),
            denominator: Vec::new(),
            additional: Vec::new(),
            per_suffix: false,
            family: None,
            formula,
        }
    }

    pub fn numerator(mut self, prefixes: &[&str]) -> Self {
        self.numerator = prefixes.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn denominator(mut self, prefixes: &[&str]) -> Self {
        self.denominator = prefixes.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn additional(mut self, prefixes: &[&str]) -> Self {
        self.additional = prefixes.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn per_suffix(mut self) -> Self {
        self.per_suffix = true;
        self
    }

    pub fn family(mut self, name: &str) -> Self {
        self.family = Some(name.to_string());
        self
    }

    /// All prefixes of all roles, deduplicated, declaration order preserved.
    pub fn all_prefixes(&self) -> Vec<String> {
        let mut prefixes = Vec::new();
        for prefix in
            self.numerator.iter().chain(self.denominator.iter()).chain(self.additional.iter())
        {
            if !prefixes.contains(prefix) {
                prefixes.push(prefix.clone());
            }
        }
        prefixes
    }

    fn validate(&self) -> Result<(), String> {
        let arity = self.formula.arity();
        if self.numerator.len() < arity.numerator {
            return Err(format!(
                "KPI {} declares {} numerator prefixes but its formula needs {}",
                self.name,
                self.numerator.len(),
                arity.numerator
            ));
        }
        if self.denominator.len() < arity.denominator {
            return Err(format!(
                "KPI {} declares {} denominator prefixes but its formula needs {}",
                self.name,
                self.denominator.len(),
                arity.denominator
            ));
        }
        if self.additional.len() < arity.additional {
            return Err(format!(
                "KPI {} declares {} additional prefixes but its formula needs {}",
                self.name,
                self.additional.len(),
                arity.additional
            ));
        }
        if !self.formula.uses_denominator() && !self.denominator.is_empty() {
            return Err(format!("KPI {} declares an unused denominator", self.name));
        }
        if !self.formula.uses_additional() && !self.additional.is_empty() {
            return Err(format!("KPI {} declares unused additional prefixes", self.name));
        }
        Ok(())
    }
}

/// Ordered group of KPI names sharing one destination table.
#[derive(Debug, Clone)]
pub struct KpiFamily {
    pub name: String,
    pub kpis: Vec<String>,
}

impl KpiFamily {
    pub fn new(name: impl Into<String>, kpis: &[&str]) -> Self {
        Self { name: name.into(), kpis: kpis.iter().map(|k| k.to_string()).collect() }
    }
}

/// Validated, immutable KPI definition set for one category.
#[derive(Debug, Clone)]
pub struct Catalog {
    kpis: Vec<KpiDefinition>,
    families: Vec<KpiFamily>,
}

impl Catalog {
    pub fn new(kpis: Vec<KpiDefinition>, families: Vec<KpiFamily>) -> TransformResult<Self> {
        let catalog = Self { kpis, families };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> TransformResult<()> {
        for kpi in &self.kpis {
            kpi.validate().map_err(TransformError::catalog)?;
        }
        let mut seen = std::collections::HashSet::new();
        for kpi in &self.kpis {
            if !seen.insert(kpi.name.as_str()) {
                return Err(TransformError::catalog(format!("duplicate KPI {}", kpi.name)));
            }
        }
        for family in &self.families {
            for name in &family.kpis {
                let member = self.kpi(name).ok_or_else(|| {
                    TransformError::catalog(format!(
                        "family {} references unknown KPI {}",
                        family.name, name
                    ))
                })?;
                if member.family.as_deref() != Some(family.name.as_str()) {
                    return Err(TransformError::catalog(format!(
                        "KPI {} is listed in family {} but does not declare it",
                        name, family.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.kpis.is_empty() && self.families.is_empty()
    }

    pub fn kpis(&self) -> &[KpiDefinition] {
        &self.kpis
    }

    pub fn families(&self) -> &[KpiFamily] {
        &self.families
    }

    pub fn kpi(&self, name: &str) -> Option<&KpiDefinition> {
        self.kpis.iter().find(|k| k.name == name)
    }

    fn family_names(&self) -> impl Iterator<Item = &str> {
        self.families.iter().map(|f| f.name.as_str())
    }

    /// KPIs written to their own `<kpi>_details` table: those without a
    /// family, or whose declared family is not part of this catalog.
    pub fn standalone_kpis(&self) -> Vec<&KpiDefinition> {
        self.kpis
            .iter()
            .filter(|k| match &k.family {
                Some(family) => !self.family_names().any(|f| f == family),
                None => true,
            })
            .collect()
    }

    /// Member definitions of a family, in family order.
    ///
    /// Membership is validated at construction, so lookups cannot fail here.
    pub fn family_members(&self, family: &KpiFamily) -> Vec<&KpiDefinition> {
        family.kpis.iter().filter_map(|name| self.kpi(name)).collect()
    }

    /// Union of all role prefixes across a family's members, deduplicated,
    /// first occurrence preserved. Used to filter source rows.
    pub fn family_prefixes(&self, family: &KpiFamily) -> Vec<String> {
        let mut prefixes = Vec::new();
        for member in self.family_members(family) {
            for prefix in member.all_prefixes() {
                if !prefixes.contains(&prefix) {
                    prefixes.push(prefix);
                }
            }
        }
        prefixes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio() -> Formula {
        Formula::RatioOfSums { scale: 100.0, complement: false }
    }

    #[test]
    fn test_catalog_rejects_unknown_family_member() {
        let kpis = vec![KpiDefinition::new("A", ratio())
            .numerator(&["N"])
            .denominator(&["D"])
            .family("F")];
        let families = vec![KpiFamily::new("F", &["A", "B"])];
        assert!(Catalog::new(kpis, families).is_err());
    }

    #[test]
    fn test_catalog_rejects_arity_mismatch() {
        // PositionalDifference indexes num[1], one declared prefix is not enough
        let kpis = vec![KpiDefinition::new("A", Formula::PositionalDifference).numerator(&["N"])];
        assert!(Catalog::new(kpis, Vec::new()).is_err());
    }

    #[test]
    fn test_standalone_excludes_family_members() {
        let kpis = vec![
            KpiDefinition::new("A", ratio()).numerator(&["N"]).denominator(&["D"]).family("F"),
            KpiDefinition::new("B", ratio()).numerator(&["N2"]).denominator(&["D2"]),
        ];
        let families = vec![KpiFamily::new("F", &["A"])];
        let catalog = Catalog::new(kpis, families).unwrap();
        let standalone: Vec<_> = catalog.standalone_kpis().iter().map(|k| k.name.clone()).collect();
        assert_eq!(standalone, vec!["B"]);
    }

    #[test]
    fn test_family_prefixes_deduplicate() {
        let kpis = vec![
            KpiDefinition::new("A", ratio()).numerator(&["N"]).denominator(&["SHARED"]).family("F"),
            KpiDefinition::new("B", ratio()).numerator(&["SHARED"]).denominator(&["D"]).family("F"),
        ];
        let families = vec![KpiFamily::new("F", &["A", "B"])];
        let catalog = Catalog::new(kpis, families).unwrap();
        let prefixes = catalog.family_prefixes(&catalog.families()[0].clone());
        assert_eq!(prefixes, vec!["N", "SHARED", "D"]);
    }
}

//! Partitions raw counter rows into per-suffix, per-role accumulators.
//!
//! Grouping is the first of two explicit passes (the evaluator is the
//! second). Values accumulate into slots aligned with the declared prefix
//! positions, so the result never depends on row order: slot `i` of a role
//! holds the sum of all row values whose prefix equals the `i`-th declared
//! prefix, and an untouched slot stays distinguishable from a zero sum.

use std::collections::BTreeMap;

use crate::models::{CounterRow, KpiDefinition};
use crate::services::suffix::{is_excluded_suffix, split_counter, UNASSIGNED_SUFFIX};

/// Role a counter prefix plays in a KPI formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Numerator,
    Denominator,
    Additional,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Numerator => "numerator",
            Role::Denominator => "denominator",
            Role::Additional => "additional",
        })
    }
}

pub fn role_list<'a>(kpi: &'a KpiDefinition, role: Role) -> &'a [String] {
    match role {
        Role::Numerator => &kpi.numerator,
        Role::Denominator => &kpi.denominator,
        Role::Additional => &kpi.additional,
    }
}

/// First role slot a prefix occupies in a KPI, scanning numerator then
/// denominator then additional. First match wins; a prefix declared in a
/// later role as well never accumulates there.
pub fn role_slot(kpi: &KpiDefinition, prefix: &str) -> Option<(Role, usize)> {
    for role in [Role::Numerator, Role::Denominator, Role::Additional] {
        if let Some(slot) = role_list(kpi, role).iter().position(|p| p == prefix) {
            return Some((role, slot));
        }
    }
    None
}

/// Accumulated values for one role, one slot per declared prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleValues {
    slots: Vec<Option<f64>>,
}

impl RoleValues {
    fn with_len(len: usize) -> Self {
        Self { slots: vec![None; len] }
    }

    fn add(&mut self, slot: usize, value: f64) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = Some(entry.unwrap_or(0.0) + value);
        }
    }

    /// Sum of all accumulated values; untouched slots contribute nothing.
    pub fn sum(&self) -> f64 {
        self.slots.iter().flatten().sum()
    }

    /// Accumulated value of one slot, `None` when no row contributed.
    pub fn at(&self, slot: usize) -> Option<f64> {
        self.slots.get(slot).copied().flatten()
    }
}

/// Per-role accumulators for one KPI in one suffix group.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiRoleValues {
    pub numerator: RoleValues,
    pub denominator: RoleValues,
    pub additional: RoleValues,
}

impl KpiRoleValues {
    pub fn for_kpi(kpi: &KpiDefinition) -> Self {
        Self {
            numerator: RoleValues::with_len(kpi.numerator.len()),
            denominator: RoleValues::with_len(kpi.denominator.len()),
            additional: RoleValues::with_len(kpi.additional.len()),
        }
    }

    pub fn role(&self, role: Role) -> &RoleValues {
        match role {
            Role::Numerator => &self.numerator,
            Role::Denominator => &self.denominator,
            Role::Additional => &self.additional,
        }
    }

    fn add(&mut self, role: Role, slot: usize, value: f64) {
        match role {
            Role::Numerator => self.numerator.add(slot, value),
            Role::Denominator => self.denominator.add(slot, value),
            Role::Additional => self.additional.add(slot, value),
        }
    }
}

/// Per-suffix accumulators for every member of a family, aligned with the
/// member order passed to `group_family`.
pub type FamilyBuckets = Vec<KpiRoleValues>;

/// Group rows for a family: every row is examined against every member
/// KPI's prefix lists simultaneously, so a prefix shared by two members
/// fans out into both. Rows matching no member are ignored and never
/// create a suffix bucket.
pub fn group_family(
    rows: &[CounterRow],
    family_name: &str,
    members: &[&KpiDefinition],
) -> BTreeMap<String, FamilyBuckets> {
    let mut grouped: BTreeMap<String, FamilyBuckets> = BTreeMap::new();
    for row in rows {
        let (prefix, suffix) = split_counter(&row.name);
        let Some(suffix) = suffix else {
            tracing::warn!("No suffix found for counter: {}", row.name);
            continue;
        };
        if is_excluded_suffix(suffix) {
            tracing::warn!("Skipping invalid suffix for family {}: {}", family_name, suffix);
            continue;
        }
        let matches: Vec<(usize, Role, usize)> = members
            .iter()
            .enumerate()
            .filter_map(|(i, kpi)| role_slot(kpi, prefix).map(|(role, slot)| (i, role, slot)))
            .collect();
        if matches.is_empty() {
            continue;
        }
        let buckets = grouped
            .entry(suffix.to_string())
            .or_insert_with(|| members.iter().map(|kpi| KpiRoleValues::for_kpi(kpi)).collect());
        for (i, role, slot) in matches {
            buckets[i].add(role, slot, row.value);
        }
    }
    tracing::debug!(
        "Grouped data by suffix for family {}: {:?}",
        family_name,
        grouped.keys().collect::<Vec<_>>()
    );
    grouped
}

/// Group rows for a standalone KPI.
///
/// A globally scoped KPI merges everything into one bucket keyed by the
/// empty suffix and always yields exactly one group, even without rows;
/// counters carrying the unassigned sentinel are still dropped. A
/// suffix-scoped KPI partitions by suffix like the family path.
pub fn group_standalone(rows: &[CounterRow], kpi: &KpiDefinition) -> BTreeMap<String, KpiRoleValues> {
    let mut grouped: BTreeMap<String, KpiRoleValues> = BTreeMap::new();
    if !kpi.per_suffix {
        let mut bucket = KpiRoleValues::for_kpi(kpi);
        for row in rows {
            let (prefix, suffix) = split_counter(&row.name);
            if suffix == Some(UNASSIGNED_SUFFIX) {
                tracing::warn!("Skipping invalid suffix for {}: {}", kpi.name, row.name);
                continue;
            }
            if let Some((role, slot)) = role_slot(kpi, prefix) {
                bucket.add(role, slot, row.value);
            }
        }
        grouped.insert(String::new(), bucket);
        return grouped;
    }

    for row in rows {
        let (prefix, suffix) = split_counter(&row.name);
        let Some(suffix) = suffix else {
            tracing::warn!("No suffix found for counter: {}", row.name);
            continue;
        };
        if is_excluded_suffix(suffix) {
            tracing::warn!("Skipping invalid suffix for {}: {}", kpi.name, suffix);
            continue;
        }
        let Some((role, slot)) = role_slot(kpi, prefix) else {
            continue;
        };
        grouped.entry(suffix.to_string()).or_insert_with(|| KpiRoleValues::for_kpi(kpi)).add(
            role,
            slot,
            row.value,
        );
    }
    tracing::debug!(
        "Grouped data by suffix for {}: {:?}",
        kpi.name,
        grouped.keys().collect::<Vec<_>>()
    );
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Formula;

    fn ratio_kpi(name: &str) -> KpiDefinition {
        KpiDefinition::new(name, Formula::RatioOfSums { scale: 100.0, complement: false })
            .numerator(&["Succ"])
            .denominator(&["Tot"])
            .per_suffix()
    }

    #[test]
    fn test_unassigned_suffix_always_excluded() {
        let kpi = ratio_kpi("A");
        let rows = vec![
            CounterRow::new("Succ.M", 5.0),
            CounterRow::new("Succ.nw", 7.0),
            CounterRow::new("Tot.nw", 10.0),
        ];
        let grouped = group_standalone(&rows, &kpi);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["nw"].numerator.sum(), 7.0);

        // same sentinel is dropped by the ungrouped path as well
        let mut global = ratio_kpi("B");
        global.per_suffix = false;
        let grouped = group_standalone(&rows, &global);
        assert_eq!(grouped[""].numerator.sum(), 7.0);
    }

    #[test]
    fn test_ungrouped_merges_all_suffixes() {
        let mut kpi = ratio_kpi("CPU");
        kpi.per_suffix = false;
        let rows = vec![
            CounterRow::new("Succ.nw", 80.0),
            CounterRow::new("Succ", 20.0),
            CounterRow::new("Tot.mt", 100.0),
        ];
        let grouped = group_standalone(&rows, &kpi);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[""].numerator.sum(), 100.0);
        assert_eq!(grouped[""].denominator.sum(), 100.0);
    }

    #[test]
    fn test_rows_without_suffix_dropped_when_suffix_scoped() {
        let kpi = ratio_kpi("A");
        let rows = vec![CounterRow::new("Succ", 5.0), CounterRow::new("Succ.nw", 1.0)];
        let grouped = group_standalone(&rows, &kpi);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["nw"].numerator.sum(), 1.0);
    }

    #[test]
    fn test_unmatched_rows_never_create_buckets() {
        let kpi = ratio_kpi("A");
        let rows = vec![CounterRow::new("Other.nw", 5.0)];
        assert!(group_standalone(&rows, &kpi).is_empty());

        let members = [&kpi];
        assert!(group_family(&rows, "F", &members).is_empty());
    }

    #[test]
    fn test_slot_alignment_is_order_independent() {
        let kpi = KpiDefinition::new("A", Formula::PositionalDifference)
            .numerator(&["Req", "Rej"])
            .per_suffix();
        let rows = vec![CounterRow::new("Rej.nw", 3.0), CounterRow::new("Req.nw", 10.0)];
        let grouped = group_standalone(&rows, &kpi);
        let bucket = &grouped["nw"];
        assert_eq!(bucket.numerator.at(0), Some(10.0));
        assert_eq!(bucket.numerator.at(1), Some(3.0));
    }

    #[test]
    fn test_family_fanout_and_first_role_wins() {
        // SHARED is a numerator of A and a denominator of B: it fans out
        // into both KPIs, while within B alone the numerator role wins.
        let a = KpiDefinition::new("A", Formula::RatioOfSums { scale: 1.0, complement: false })
            .numerator(&["SHARED"])
            .denominator(&["DenA"])
            .per_suffix()
            .family("F");
        let b = KpiDefinition::new("B", Formula::RatioOfSums { scale: 1.0, complement: false })
            .numerator(&["NumB"])
            .denominator(&["SHARED"])
            .per_suffix()
            .family("F");
        let members = [&a, &b];
        let rows = vec![CounterRow::new("SHARED.nw", 4.0), CounterRow::new("NumB.nw", 2.0)];
        let grouped = group_family(&rows, "F", &members);
        let buckets = &grouped["nw"];
        assert_eq!(buckets[0].numerator.sum(), 4.0);
        assert_eq!(buckets[1].denominator.at(0), Some(4.0));
        assert_eq!(buckets[1].numerator.at(0), Some(2.0));

        let c = KpiDefinition::new("C", Formula::RatioOfSums { scale: 1.0, complement: false })
            .numerator(&["SHARED"])
            .denominator(&["SHARED"])
            .per_suffix()
            .family("G");
        let grouped = group_family(&rows, "G", &[&c]);
        let bucket = &grouped["nw"][0];
        assert_eq!(bucket.numerator.at(0), Some(4.0));
        assert_eq!(bucket.denominator.at(0), None);
    }

    #[test]
    fn test_duplicate_prefix_rows_accumulate() {
        let kpi = ratio_kpi("A");
        let rows = vec![CounterRow::new("Succ.nw", 1.0), CounterRow::new("Succ.nw", 2.0)];
        let grouped = group_standalone(&rows, &kpi);
        assert_eq!(grouped["nw"].numerator.at(0), Some(3.0));
    }
}

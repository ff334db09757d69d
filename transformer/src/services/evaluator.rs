//! Formula evaluation over grouped role values.
//!
//! Every denominator expression is guarded individually and a positional
//! access to a slot no row contributed to yields null. Evaluation never
//! aborts a batch: the worst outcome of bad data is a null KPI value and a
//! warning.

use crate::models::{Formula, KpiDefinition, HI_COUNTER_WRAP};
use crate::services::grouper::{KpiRoleValues, Role};

/// Compute one KPI value from its accumulated role values.
///
/// Returns `None` for any guarded condition (zero denominator, missing
/// positional value); the result is otherwise an unrounded `f64`.
pub fn evaluate(kpi: &KpiDefinition, values: &KpiRoleValues) -> Option<f64> {
    let result = match &kpi.formula {
        Formula::LinearOfSum { scale, offset } => Some(offset + scale * values.numerator.sum()),
        Formula::RatioOfSums { scale, complement } => {
            let den = values.denominator.sum();
            if den == 0.0 {
                warn_zero_denominator(kpi);
                return None;
            }
            let ratio = values.numerator.sum() / den;
            Some(scale * if *complement { 1.0 - ratio } else { ratio })
        },
        Formula::SumOverPositionalProduct { scale } => {
            let d0 = positional(kpi, values, Role::Denominator, 0)?;
            let d1 = positional(kpi, values, Role::Denominator, 1)?;
            if d0 == 0.0 || d1 == 0.0 {
                warn_zero_denominator(kpi);
                return None;
            }
            Some(scale * values.numerator.sum() / (d0 * d1))
        },
        Formula::SumOverPositionalDifference { scale, complement } => {
            let d0 = positional(kpi, values, Role::Denominator, 0)?;
            let d1 = positional(kpi, values, Role::Denominator, 1)?;
            let diff = d0 - d1;
            if diff == 0.0 {
                warn_zero_denominator(kpi);
                return None;
            }
            let ratio = values.numerator.sum() / diff;
            Some(scale * if *complement { 1.0 - ratio } else { ratio })
        },
        Formula::RatioOverAdjustedCapacity { scale } => {
            let den = values.denominator.sum();
            if den == 0.0 {
                warn_zero_denominator(kpi);
                return None;
            }
            let a0 = positional(kpi, values, Role::Additional, 0)?;
            let a1 = positional(kpi, values, Role::Additional, 1)?;
            let capacity = a0 - a1 / den;
            if capacity == 0.0 {
                warn_zero_denominator(kpi);
                return None;
            }
            Some(scale * (values.numerator.sum() / den) / capacity)
        },
        Formula::CapacityMinusRatio => {
            let den = values.denominator.sum();
            if den == 0.0 {
                warn_zero_denominator(kpi);
                return None;
            }
            let a0 = positional(kpi, values, Role::Additional, 0)?;
            Some(a0 - values.numerator.sum() / den)
        },
        Formula::CombineHiLo { scale } => {
            let hi = positional(kpi, values, Role::Numerator, 0)?;
            let lo = positional(kpi, values, Role::Numerator, 1)?;
            Some(scale * (hi * HI_COUNTER_WRAP + lo))
        },
        Formula::PositionalDifference => {
            let n0 = positional(kpi, values, Role::Numerator, 0)?;
            let n1 = positional(kpi, values, Role::Numerator, 1)?;
            Some(n0 - n1)
        },
        Formula::SumOverHiLoTotal { scale } => {
            let d0 = positional(kpi, values, Role::Denominator, 0)?;
            let d1 = positional(kpi, values, Role::Denominator, 1)?;
            let d2 = positional(kpi, values, Role::Denominator, 2)?;
            let total = d0 * HI_COUNTER_WRAP + d1 + d2;
            if total == 0.0 {
                warn_zero_denominator(kpi);
                return None;
            }
            Some(scale * values.numerator.sum() / total)
        },
    };
    tracing::debug!("Calculated {} value: {:?}", kpi.name, result);
    result
}

fn positional(kpi: &KpiDefinition, values: &KpiRoleValues, role: Role, slot: usize) -> Option<f64> {
    match values.role(role).at(slot) {
        Some(value) => Some(value),
        None => {
            tracing::warn!("Missing {} value #{} calculating {}", role, slot, kpi.name);
            None
        },
    }
}

fn warn_zero_denominator(kpi: &KpiDefinition) {
    tracing::warn!("Zero denominator calculating {}", kpi.name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CounterRow;
    use crate::services::grouper::group_standalone;

    fn values_for(kpi: &KpiDefinition, rows: &[CounterRow]) -> KpiRoleValues {
        let mut grouped = group_standalone(rows, kpi);
        grouped.remove("").expect("ungrouped bucket")
    }

    #[test]
    fn test_ratio_of_sums() {
        let kpi = KpiDefinition::new("CPU", Formula::RatioOfSums { scale: 1.0, complement: false })
            .numerator(&["Load"])
            .denominator(&["Scan"]);
        let values =
            values_for(&kpi, &[CounterRow::new("Load", 80.0), CounterRow::new("Scan", 100.0)]);
        assert_eq!(evaluate(&kpi, &values), Some(0.8));
    }

    #[test]
    fn test_zero_summed_denominator_is_null() {
        let kpi = KpiDefinition::new("R", Formula::RatioOfSums { scale: 100.0, complement: false })
            .numerator(&["N"])
            .denominator(&["D"]);
        let values = values_for(&kpi, &[CounterRow::new("N", 5.0), CounterRow::new("D", 0.0)]);
        assert_eq!(evaluate(&kpi, &values), None);

        // no denominator rows at all sums to zero as well
        let values = values_for(&kpi, &[CounterRow::new("N", 5.0)]);
        assert_eq!(evaluate(&kpi, &values), None);
    }

    #[test]
    fn test_complement_ratio() {
        let kpi = KpiDefinition::new("Q", Formula::RatioOfSums { scale: 100.0, complement: true })
            .numerator(&["Bad"])
            .denominator(&["All"]);
        let values =
            values_for(&kpi, &[CounterRow::new("Bad", 25.0), CounterRow::new("All", 100.0)]);
        assert_eq!(evaluate(&kpi, &values), Some(75.0));
    }

    #[test]
    fn test_positional_guards_each_denominator() {
        let kpi = KpiDefinition::new("A", Formula::SumOverPositionalProduct { scale: 100.0 })
            .numerator(&["N"])
            .denominator(&["D0", "D1"]);
        let rows =
            [CounterRow::new("N", 10.0), CounterRow::new("D0", 5.0), CounterRow::new("D1", 0.0)];
        assert_eq!(evaluate(&kpi, &values_for(&kpi, &rows)), None);

        let rows =
            [CounterRow::new("N", 10.0), CounterRow::new("D0", 5.0), CounterRow::new("D1", 2.0)];
        assert_eq!(evaluate(&kpi, &values_for(&kpi, &rows)), Some(100.0));
    }

    #[test]
    fn test_missing_positional_value_is_null() {
        let kpi = KpiDefinition::new("A", Formula::PositionalDifference)
            .numerator(&["Req", "Rej"]);
        let values = values_for(&kpi, &[CounterRow::new("Req", 10.0)]);
        assert_eq!(evaluate(&kpi, &values), None);
    }

    #[test]
    fn test_positional_difference_denominator() {
        let kpi = KpiDefinition::new(
            "ASR",
            Formula::SumOverPositionalDifference { scale: 100.0, complement: false },
        )
        .numerator(&["Ans"])
        .denominator(&["Calls", "Overflow"]);
        let rows = [
            CounterRow::new("Ans", 30.0),
            CounterRow::new("Calls", 110.0),
            CounterRow::new("Overflow", 10.0),
        ];
        assert_eq!(evaluate(&kpi, &values_for(&kpi, &rows)), Some(30.0));

        // equal positional values collapse the denominator to zero
        let rows = [
            CounterRow::new("Ans", 30.0),
            CounterRow::new("Calls", 10.0),
            CounterRow::new("Overflow", 10.0),
        ];
        assert_eq!(evaluate(&kpi, &values_for(&kpi, &rows)), None);
    }

    #[test]
    fn test_combine_hi_lo() {
        let kpi = KpiDefinition::new("Pkts", Formula::CombineHiLo { scale: 1.0 })
            .numerator(&["Hi", "Lo"]);
        let values = values_for(&kpi, &[CounterRow::new("Hi", 2.0), CounterRow::new("Lo", 5.0)]);
        assert_eq!(evaluate(&kpi, &values), Some(2.0 * HI_COUNTER_WRAP + 5.0));
    }

    #[test]
    fn test_linear_of_sum_without_rows() {
        // complement-style linear formulas still produce a value on an
        // empty bucket: the sum of nothing is zero
        let kpi = KpiDefinition::new("S", Formula::LinearOfSum { scale: -100.0, offset: 100.0 })
            .numerator(&["Overflow"]);
        let values = values_for(&kpi, &[]);
        assert_eq!(evaluate(&kpi, &values), Some(100.0));
    }

    #[test]
    fn test_adjusted_capacity_guard() {
        let kpi = KpiDefinition::new("RDT", Formula::RatioOverAdjustedCapacity { scale: 100.0 })
            .numerator(&["Acc"])
            .denominator(&["Scan"])
            .additional(&["Dev", "Bloc"]);
        let rows = [
            CounterRow::new("Acc", 50.0),
            CounterRow::new("Scan", 10.0),
            CounterRow::new("Dev", 2.0),
            CounterRow::new("Bloc", 20.0),
        ];
        // capacity = 2 - 20/10 = 0
        assert_eq!(evaluate(&kpi, &values_for(&kpi, &rows)), None);

        let rows = [
            CounterRow::new("Acc", 50.0),
            CounterRow::new("Scan", 10.0),
            CounterRow::new("Dev", 4.0),
            CounterRow::new("Bloc", 20.0),
        ];
        // (50/10) / (4 - 2) * 100
        assert_eq!(evaluate(&kpi, &values_for(&kpi, &rows)), Some(250.0));
    }
}

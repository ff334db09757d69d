//! Counter-name splitting and operator-label resolution.

use crate::config::OperatorMapping;

/// Suffix value that marks a counter as unassigned on the network element.
pub const UNASSIGNED_SUFFIX: &str = "M";

/// Split a raw counter name into `(prefix, suffix)` at the first `.`.
///
/// Declared prefixes never contain dots, so everything after the first
/// separator belongs to the suffix: `"X.Y.Z"` yields `("X", Some("Y.Z"))`.
/// A missing or empty suffix yields `None`.
pub fn split_counter(name: &str) -> (&str, Option<&str>) {
    match name.split_once('.') {
        Some((prefix, suffix)) if !suffix.is_empty() => (prefix, Some(suffix)),
        Some((prefix, _)) => (prefix, None),
        None => (name, None),
    }
}

/// True for suffixes that must never be aggregated.
pub fn is_excluded_suffix(suffix: &str) -> bool {
    suffix.is_empty() || suffix == UNASSIGNED_SUFFIX
}

/// Ordered suffix-code to operator-label mapping.
///
/// Order is significant: the first code found as a substring of the
/// lower-cased suffix wins, so broader codes must come first.
#[derive(Debug, Clone)]
pub struct OperatorMap {
    entries: Vec<(String, String)>,
}

impl OperatorMap {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        let entries =
            entries.into_iter().map(|(code, label)| (code.to_lowercase(), label)).collect();
        Self { entries }
    }

    pub fn from_config(mappings: &[OperatorMapping]) -> Self {
        Self::new(mappings.iter().map(|m| (m.code.clone(), m.label.clone())).collect())
    }

    /// Resolve the operator label for a suffix.
    ///
    /// International routes of the home operator carry both the `nw` code
    /// and an international code in one suffix and get a fixed label; every
    /// other suffix resolves through the ordered substring scan. Unknown
    /// suffixes are a data-quality anomaly, not an error.
    pub fn resolve(&self, suffix: &str) -> String {
        let normalized = suffix.to_lowercase();
        if normalized.contains("nw") && (normalized.contains("ie") || normalized.contains("is")) {
            return "Inwi International".to_string();
        }
        for (code, label) in &self.entries {
            if normalized.contains(code.as_str()) {
                return label.clone();
            }
        }
        tracing::warn!("No known operator found in suffix: {} (normalized: {})", suffix, normalized);
        "Unknown".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OperatorConfig;

    fn operators() -> OperatorMap {
        OperatorMap::from_config(&OperatorConfig::default().mapping)
    }

    #[test]
    fn test_split_without_separator() {
        assert_eq!(split_counter("LoasACCLOAD"), ("LoasACCLOAD", None));
    }

    #[test]
    fn test_split_single_suffix() {
        assert_eq!(split_counter("X.abc"), ("X", Some("abc")));
    }

    #[test]
    fn test_split_multi_dot_keeps_full_suffix() {
        assert_eq!(split_counter("X.Y.Z"), ("X", Some("Y.Z")));
    }

    #[test]
    fn test_split_trailing_dot_is_no_suffix() {
        assert_eq!(split_counter("X."), ("X", None));
    }

    #[test]
    fn test_excluded_suffixes() {
        assert!(is_excluded_suffix(""));
        assert!(is_excluded_suffix("M"));
        assert!(!is_excluded_suffix("m2"));
        assert!(!is_excluded_suffix("nw01"));
    }

    #[test]
    fn test_resolve_inwi_international() {
        assert_eq!(operators().resolve("nwie"), "Inwi International");
        assert_eq!(operators().resolve("NWIS2"), "Inwi International");
    }

    #[test]
    fn test_resolve_ordered_scan() {
        assert_eq!(operators().resolve("mt05"), "Maroc Telecom");
        assert_eq!(operators().resolve("nw01"), "Inwi");
        assert_eq!(operators().resolve("BS2"), "Orange 2G");
        assert_eq!(operators().resolve("ne1"), "Orange 3G");
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(operators().resolve("zzz"), "Unknown");
    }
}

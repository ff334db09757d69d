//! Built-in KPI catalogs, one module per data category.
//!
//! Each module returns the full declarative definition set for its category;
//! `Catalog::new` validates family references and formula arity, so a bad
//! definition fails the worker at startup instead of mid-run.

mod fifteen_minute;
mod five_minute;
mod gateway;

use crate::models::{Catalog, Category};
use crate::utils::TransformResult;

/// Build the validated catalog for a category.
pub fn for_category(category: Category) -> TransformResult<Catalog> {
    match category {
        Category::FiveMinute => five_minute::catalog(),
        Category::FifteenMinute => fifteen_minute::catalog(),
        Category::Gateway => gateway::catalog(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtin_catalogs_validate() {
        for category in Category::ALL {
            let catalog = for_category(category).unwrap();
            assert!(!catalog.is_empty(), "catalog for {} is empty", category);
        }
    }

    #[test]
    fn test_family_members_are_suffix_scoped() {
        // The family grouping path drops suffix-less rows, so a family whose
        // members are globally scoped could never produce output.
        for category in Category::ALL {
            let catalog = for_category(category).unwrap();
            for family in catalog.families() {
                for member in catalog.family_members(family) {
                    assert!(
                        member.per_suffix,
                        "{}: family {} member {} is not suffix-scoped",
                        category, family.name, member.name
                    );
                }
            }
        }
    }
}

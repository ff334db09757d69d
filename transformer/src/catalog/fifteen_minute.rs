//! 15-minute paging counter catalog.

use crate::models::{Catalog, Formula, KpiDefinition, KpiFamily};
use crate::utils::TransformResult;

pub fn catalog() -> TransformResult<Catalog> {
    let kpis = vec![KpiDefinition::new(
        "TxPaging",
        Formula::RatioOfSums { scale: 100.0, complement: false },
    )
    .numerator(&["PagNPAG1REUSUCC", "PagNPAG1RESUCC", "PagNPAG2RESUCC", "PagNPAG2REUSUCC"])
    .denominator(&["PagNPAG1LOTOT", "PagNPAG1GLTOT", "PagNPAG1LOUTOT"])
    .per_suffix()
    .family("Paging")];

    let families = vec![KpiFamily::new("Paging", &["TxPaging"])];

    Catalog::new(kpis, families)
}

pub mod formula;
pub mod kpi;

pub use formula::{Formula, RoleArity, HI_COUNTER_WRAP};
pub use kpi::{Catalog, Category, CounterRow, KpiDefinition, KpiFamily};

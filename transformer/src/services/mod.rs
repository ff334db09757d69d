pub mod db;
pub mod destination;
pub mod evaluator;
pub mod grouper;
pub mod schema;
pub mod source;
pub mod suffix;
pub mod transformer;

pub use destination::{ColumnValue, DestinationStore, MySqlDestinationStore};
pub use source::{MySqlSourceStore, SourceStore};
pub use suffix::OperatorMap;
pub use transformer::{load_table_list, Transformer};

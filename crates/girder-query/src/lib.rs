mod builder;
mod config;
mod filter;
mod pager;
mod params;
mod query;
mod sort;

pub use builder::{QueryBuilder, QueryError, filters_from_params};
pub use config::QueryConfig;
pub use filter::{FieldFilter, FilterOp, LogicalOp};
pub use pager::{PAGES_PER_SET, Pager};
pub use params::Params;
pub use query::QueryDescriptor;
pub use sort::{Sort, SortDirection};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::QueryConfig;
use crate::filter::{FieldFilter, LogicalOp};
use crate::sort::Sort;

/// Normalized, structured representation of a parsed search request.
///
/// Built fresh per request and handed to the persistence collaborator;
/// `raw_params` keeps the submitted values for form redisplay. When paging
/// is suppressed `limit` and `offset` are both `None`, never zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub logical: LogicalOp,
    pub filters: Vec<FieldFilter>,
    pub sort: Vec<Sort>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub raw_params: BTreeMap<String, Vec<String>>,
}

impl QueryDescriptor {
    /// Render the filter set as a SQL-ish WHERE fragment, joined with the
    /// descriptor's logical operator. Empty when there are no filters.
    pub fn to_sql_where(&self, config: &QueryConfig) -> String {
        let parts: Vec<String> = self.filters.iter().map(|f| f.to_sql(config)).collect();
        parts.join(&format!(" {} ", self.logical.as_str()))
    }

    /// Render the sort specification as an ORDER BY fragment.
    pub fn to_sql_order(&self) -> String {
        let parts: Vec<String> = self.sort.iter().map(Sort::to_sql).collect();
        parts.join(", ")
    }
}

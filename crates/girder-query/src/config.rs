use std::collections::BTreeSet;

/// Query-building configuration. Read-only after construction — per-request
/// behavior comes from the submitted parameters, never from mutating this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Rows per page when the request does not ask for a size.
    pub page_size: u64,
    /// Hard ceiling on rows per page, applied to caller input.
    pub max_page_size: u64,
    /// Token rendered for not-equals conditions.
    pub ne_token: String,
    /// Render wildcard conditions as ILIKE instead of LIKE.
    pub ilike: bool,
    /// Primary-key column, used for the default sort order.
    pub primary_key: String,
    /// Fields where a trailing wildcard means "greater or equal to the
    /// numeric prefix" rather than a pattern match.
    pub integer_fields: BTreeSet<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            max_page_size: 200,
            ne_token: "!=".to_string(),
            ilike: false,
            primary_key: "id".to_string(),
            integer_fields: BTreeSet::new(),
        }
    }
}

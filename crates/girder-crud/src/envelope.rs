use girder_query::{Pager, QueryDescriptor};
use serde::Serialize;

/// Uniform wrapper around one search: the total row count, the pager (absent
/// when paging was suppressed), the rows themselves, and the query that
/// produced them. Built fresh per request and discarded with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope<Obj> {
    pub count: u64,
    pub pager: Option<Pager>,
    pub rows: Vec<Obj>,
    pub query: QueryDescriptor,
}

/// What a search action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<Obj> {
    Envelope(ResultEnvelope<Obj>),
    /// Raw collaborator rows, bypassing the envelope ("naked results").
    Rows(Vec<Obj>),
    /// A uniquely-matching search redirected straight to the one row.
    Redirect(String),
}

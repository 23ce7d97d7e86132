use std::collections::BTreeMap;

use crate::config::QueryConfig;
use crate::filter::{FieldFilter, FilterOp, LogicalOp};
use crate::params::Params;
use crate::query::QueryDescriptor;
use crate::sort::{Sort, SortDirection};

/// Configuration failure while building a query. Parsing itself never
/// fails — malformed or absent parameters degrade to omission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    Config(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::Config(msg) => write!(f, "query configuration error: {msg}"),
        }
    }
}

impl std::error::Error for QueryError {}

/// Translates submitted request parameters into a [`QueryDescriptor`]:
/// a filter set, a sort specification, and pagination bounds.
///
/// `fields` is the ordered list of columns a request may filter on —
/// parameters outside it (and the reserved `_`-prefixed controls) are
/// ignored. The builder never mutates the parameter set it is given.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    fields: Vec<String>,
    config: QueryConfig,
}

impl QueryBuilder {
    pub fn new(fields: Vec<String>, config: QueryConfig) -> Self {
        Self { fields, config }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn build(&self, params: &Params) -> Result<QueryDescriptor, QueryError> {
        if self.fields.is_empty() {
            return Err(QueryError::Config("no search fields configured".into()));
        }

        let fuzzy = params.flag("_fuzzy");
        let (filters, raw_params) =
            filters_from_params(&self.fields, params, fuzzy, &self.config);

        // OR is honored only past the accumulated-entry threshold, where a
        // multi-value field counts once per value. See the builder tests.
        let entries: usize = filters.iter().map(|f| f.values.len()).sum();
        let or_requested = params
            .first("_op")
            .map(|v| v.eq_ignore_ascii_case("or"))
            .unwrap_or(false);
        let logical = if or_requested && entries > 2 {
            LogicalOp::Or
        } else {
            LogicalOp::And
        };

        let sort = self.parse_sort(params);

        // A zero size means "use the default", like an absent parameter.
        let page_size = params
            .uint("_page_size")
            .filter(|s| *s >= 1)
            .unwrap_or(self.config.page_size)
            .min(self.config.max_page_size);
        let page = params.uint("_page").filter(|p| *p >= 1).unwrap_or(1);
        // An explicit offset wins over the page computation outright.
        // Saturating: any u64 is accepted as a page number.
        let offset = params
            .uint("_offset")
            .unwrap_or(page.saturating_sub(1).saturating_mul(page_size));

        let (limit, offset) = if params.flag("_no_page") {
            (None, None)
        } else {
            (Some(page_size), Some(offset))
        };

        Ok(QueryDescriptor {
            logical,
            filters,
            sort,
            limit,
            offset,
            raw_params,
        })
    }

    fn parse_sort(&self, params: &Params) -> Vec<Sort> {
        if let Some(order) = params.first("_order") {
            let parsed = Sort::parse_order(order);
            if !parsed.is_empty() {
                return parsed;
            }
        }
        if let Some(column) = params.first("_sort") {
            if !column.trim().is_empty() {
                let direction = params
                    .first("_dir")
                    .map(SortDirection::parse)
                    .unwrap_or(SortDirection::Asc);
                return vec![Sort::new(column.trim(), direction)];
            }
        }
        vec![Sort::new(&self.config.primary_key, SortDirection::Desc)]
    }
}

/// Partition submitted values per permitted field and emit filters.
///
/// Per field, on copies of the submitted values: the fuzzy flag appends `%`
/// to values lacking a wildcard marker, `*` normalizes to `%`, then values
/// split into wildcard, `!`-negated, and exact buckets. Wildcards emit LIKE
/// (or a `>=` range on integer-like fields, using the prefix before the
/// marker), negations emit not-equals over the stripped values, and a field
/// with neither emits plain equals. A field with no non-blank value is
/// dropped entirely. Returns the filters plus the raw values keyed by field,
/// preserved for redisplay.
pub fn filters_from_params(
    fields: &[String],
    params: &Params,
    fuzzy: bool,
    config: &QueryConfig,
) -> (Vec<FieldFilter>, BTreeMap<String, Vec<String>>) {
    let mut filters = Vec::new();
    let mut raw_params = BTreeMap::new();

    for field in fields {
        let Some(submitted) = params.all(field) else {
            continue;
        };
        let raw: Vec<String> = submitted
            .iter()
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .collect();
        if raw.is_empty() {
            continue;
        }
        raw_params.insert(field.clone(), raw.clone());

        let mut work = raw.clone();
        if fuzzy {
            for value in &mut work {
                if !value.contains('%') && !value.contains('*') {
                    value.push('%');
                }
            }
        }
        for value in &mut work {
            *value = value.replace('*', "%");
        }

        let mut wildcard = Vec::new();
        let mut negated = Vec::new();
        let mut exact = Vec::new();
        for value in work {
            if value.contains('%') {
                wildcard.push(value);
            } else if let Some(stripped) = value.strip_prefix('!') {
                negated.push(stripped.to_string());
            } else {
                exact.push(value);
            }
        }

        if !wildcard.is_empty() {
            if config.integer_fields.contains(field) {
                // "2020%" on an integer-like column means ">= 2020".
                let prefix = wildcard[0]
                    .split('%')
                    .next()
                    .unwrap_or("")
                    .to_string();
                filters.push(FieldFilter {
                    field: field.clone(),
                    op: FilterOp::Ge,
                    values: vec![prefix],
                    raw_values: raw.clone(),
                    wildcard_values: wildcard.clone(),
                    negated_values: negated.clone(),
                });
            } else {
                filters.push(FieldFilter {
                    field: field.clone(),
                    op: FilterOp::Like,
                    values: wildcard.clone(),
                    raw_values: raw.clone(),
                    wildcard_values: wildcard.clone(),
                    negated_values: negated.clone(),
                });
            }
        }

        if !negated.is_empty() {
            filters.push(FieldFilter {
                field: field.clone(),
                op: FilterOp::Ne,
                values: negated.clone(),
                raw_values: raw.clone(),
                wildcard_values: wildcard.clone(),
                negated_values: negated.clone(),
            });
        }

        if wildcard.is_empty() && negated.is_empty() {
            filters.push(FieldFilter {
                field: field.clone(),
                op: FilterOp::Eq,
                values: exact,
                raw_values: raw.clone(),
                wildcard_values: Vec::new(),
                negated_values: Vec::new(),
            });
        }
    }

    (filters, raw_params)
}

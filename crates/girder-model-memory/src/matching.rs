use std::cmp::Ordering;

use girder_query::{FieldFilter, FilterOp, LogicalOp, QueryDescriptor, Sort, SortDirection};

use crate::model::Row;

pub(crate) fn query_matches(row: &Row, query: &QueryDescriptor) -> bool {
    if query.filters.is_empty() {
        return true;
    }
    match query.logical {
        LogicalOp::And => query.filters.iter().all(|f| filter_matches(row, f)),
        LogicalOp::Or => query.filters.iter().any(|f| filter_matches(row, f)),
    }
}

pub(crate) fn filter_matches(row: &Row, filter: &FieldFilter) -> bool {
    let actual = row
        .get(&filter.field)
        .map(String::as_str)
        .unwrap_or_default();
    match filter.op {
        FilterOp::Eq => filter.values.iter().any(|v| v == actual),
        FilterOp::Ne => filter.values.iter().all(|v| v != actual),
        FilterOp::Like => filter.values.iter().any(|p| like_match(p, actual)),
        FilterOp::Ge => filter
            .values
            .first()
            .map(|bound| ge_match(actual, bound))
            .unwrap_or(true),
    }
}

/// Match a SQL LIKE pattern where `%` spans any run of characters.
/// A pattern without `%` is a plain equality check.
pub fn like_match(pattern: &str, value: &str) -> bool {
    let segments: Vec<&str> = pattern.split('%').collect();
    if segments.len() == 1 {
        return pattern == value;
    }
    let (first, rest) = segments.split_first().expect("non-empty split");
    let (last, middle) = rest.split_last().expect("at least two segments");

    if !value.starts_with(first) || !value.ends_with(last) {
        return false;
    }
    if value.len() < first.len() + last.len() {
        return false;
    }

    let mut remaining = &value[first.len()..value.len() - last.len()];
    for segment in middle {
        if segment.is_empty() {
            continue;
        }
        match remaining.find(segment) {
            Some(pos) => remaining = &remaining[pos + segment.len()..],
            None => return false,
        }
    }
    true
}

/// Numeric comparison when both sides parse as integers, lexicographic
/// otherwise — mirrors how loosely-typed storage compares column values.
fn ge_match(actual: &str, bound: &str) -> bool {
    match (actual.trim().parse::<i64>(), bound.trim().parse::<i64>()) {
        (Ok(a), Ok(b)) => a >= b,
        _ => actual >= bound,
    }
}

pub(crate) fn sort_rows(rows: &mut [Row], sort: &[Sort]) {
    rows.sort_by(|a, b| {
        for spec in sort {
            let av = a.get(&spec.column).map(String::as_str).unwrap_or_default();
            let bv = b.get(&spec.column).map(String::as_str).unwrap_or_default();
            let ord = match (av.parse::<f64>(), bv.parse::<f64>()) {
                (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => av.cmp(bv),
            };
            let ord = match spec.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive parse. Anything that is not `desc` sorts ascending.
    pub fn parse(token: &str) -> SortDirection {
        if token.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// Normalized upper-case token, regardless of what was submitted.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub column: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Parse a combined sort expression like `"name ASC, age desc"`.
    ///
    /// Each comma-separated term is a column with an optional direction;
    /// empty terms and missing directions degrade rather than fail.
    pub fn parse_order(expr: &str) -> Vec<Sort> {
        expr.split(',')
            .filter_map(|term| {
                let mut tokens = term.split_whitespace();
                let column = tokens.next()?;
                let direction = tokens
                    .next()
                    .map(SortDirection::parse)
                    .unwrap_or(SortDirection::Asc);
                Some(Sort::new(column, direction))
            })
            .collect()
    }

    pub fn to_sql(&self) -> String {
        format!("{} {}", self.column, self.direction.as_str())
    }
}

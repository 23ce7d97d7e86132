use serde::{Deserialize, Serialize};

use crate::config::QueryConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Like,
    Ge,
}

/// How the filters of one query combine. Never mixed within a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

/// One field-scoped condition parsed from submitted parameters.
///
/// `values` holds the operand values for `op` — wildcard-normalized for
/// `Like`, prefix-stripped for `Ne`, the numeric prefix for `Ge`. The raw
/// submitted values and the wildcard/negated partition are kept alongside
/// so a form can be redisplayed exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub values: Vec<String>,
    pub raw_values: Vec<String>,
    pub wildcard_values: Vec<String>,
    pub negated_values: Vec<String>,
}

impl FieldFilter {
    /// Render this condition as a SQL-ish fragment. Multi-value conditions
    /// expand to `IN`, OR-chains, or AND-chains depending on the operator.
    pub fn to_sql(&self, config: &QueryConfig) -> String {
        let token = self.op_token(config);
        match self.op {
            FilterOp::Eq if self.values.len() > 1 => {
                let list: Vec<String> = self.values.iter().map(|v| quote(v)).collect();
                format!("{} IN ({})", self.field, list.join(", "))
            }
            FilterOp::Eq | FilterOp::Ge => {
                let value = self.values.first().map(String::as_str).unwrap_or("");
                format!("{} {} {}", self.field, token, quote(value))
            }
            FilterOp::Ne => {
                let parts: Vec<String> = self
                    .values
                    .iter()
                    .map(|v| format!("{} {} {}", self.field, token, quote(v)))
                    .collect();
                parts.join(" AND ")
            }
            FilterOp::Like => {
                let parts: Vec<String> = self
                    .values
                    .iter()
                    .map(|v| format!("{} {} {}", self.field, token, quote(v)))
                    .collect();
                if parts.len() > 1 {
                    format!("({})", parts.join(" OR "))
                } else {
                    parts.join("")
                }
            }
        }
    }

    fn op_token<'a>(&self, config: &'a QueryConfig) -> &'a str {
        match self.op {
            FilterOp::Eq => "=",
            FilterOp::Ne => &config.ne_token,
            FilterOp::Like if config.ilike => "ILIKE",
            FilterOp::Like => "LIKE",
            FilterOp::Ge => ">=",
        }
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

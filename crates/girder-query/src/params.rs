use std::collections::BTreeMap;
use std::collections::btree_map;

/// Submitted request parameters: field name → one or more values, in
/// submission order per field. Values are already percent-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    map: BTreeMap<String, Vec<String>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query or body string.
    ///
    /// Malformed pairs degrade to their literal text rather than failing —
    /// a search form never produces a parse error, only odd filter values.
    pub fn from_urlencoded(input: &str) -> Self {
        let mut params = Self::new();
        for pair in input.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.append(decode(key), decode(value));
        }
        params
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.entry(key.into()).or_default().push(value.into());
    }

    /// Fold another parameter set into this one, keeping existing values.
    pub fn merge(&mut self, other: Params) {
        for (key, values) in other.map {
            self.map.entry(key).or_default().extend(values);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// First submitted value for a field.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.map.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// All submitted values for a field, in submission order.
    pub fn all(&self, key: &str) -> Option<&[String]> {
        self.map.get(key).map(Vec::as_slice)
    }

    /// Present with a truthy value. Empty strings and `"0"` are falsy.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.first(key), Some(v) if !v.is_empty() && v != "0")
    }

    pub fn uint(&self, key: &str) -> Option<u64> {
        self.first(key).and_then(|v| v.trim().parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.map.iter()
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use girder_crud::{Model, ModelError};
use girder_query::QueryDescriptor;

use crate::matching::{query_matches, sort_rows};

/// A loosely-typed record: column name → string value, the shape most
/// scaffolded forms submit.
pub type Row = BTreeMap<String, String>;

/// An in-memory [`Model`] keyed by a primary-key column. Applies the full
/// filter/sort/limit semantics of a [`QueryDescriptor`], which makes it the
/// reference collaborator for integration tests. Not a production store —
/// every search scans.
pub struct MemoryModel {
    primary_key: String,
    base_path: Option<String>,
    integer_fields: BTreeSet<String>,
    rows: Mutex<Vec<Row>>,
}

impl MemoryModel {
    pub fn new(primary_key: impl Into<String>) -> Self {
        Self {
            primary_key: primary_key.into(),
            base_path: None,
            integer_fields: BTreeSet::new(),
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Enable `view_uri` resolution: a row with key `7` maps to
    /// `{base}/7`.
    pub fn with_base_path(mut self, base: impl Into<String>) -> Self {
        self.base_path = Some(base.into());
        self
    }

    /// Declare columns whose trailing-wildcard searches mean ">= prefix".
    pub fn with_integer_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.integer_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn seed<I>(&self, rows: I)
    where
        I: IntoIterator<Item = Row>,
    {
        if let Ok(mut store) = self.rows.lock() {
            store.extend(rows);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Direct lookup by primary key, bypassing the query machinery.
    pub fn get(&self, key: &str) -> Option<Row> {
        self.rows
            .lock()
            .ok()?
            .iter()
            .find(|r| self.key_of(r) == Some(key.to_string()))
            .cloned()
    }

    fn key_of(&self, row: &Row) -> Option<String> {
        row.get(&self.primary_key).cloned()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Row>>, ModelError> {
        self.rows
            .lock()
            .map_err(|_| ModelError("row store poisoned".into()))
    }
}

impl Model for MemoryModel {
    type Obj = Row;

    fn fetch(&self, key: &str) -> Result<Option<Row>, ModelError> {
        let rows = self.lock()?;
        Ok(rows
            .iter()
            .find(|r| r.get(&self.primary_key).map(String::as_str) == Some(key))
            .cloned())
    }

    fn search(&self, query: &QueryDescriptor) -> Result<Vec<Row>, ModelError> {
        let rows = self.lock()?;
        let mut matched: Vec<Row> = rows
            .iter()
            .filter(|r| query_matches(r, query))
            .cloned()
            .collect();
        sort_rows(&mut matched, &query.sort);

        let skip = query.offset.unwrap_or(0) as usize;
        let take = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(skip).take(take).collect())
    }

    fn count(&self, query: &QueryDescriptor) -> Result<u64, ModelError> {
        // Counts the full match set; limit/offset apply to rows only.
        let rows = self.lock()?;
        Ok(rows.iter().filter(|r| query_matches(r, query)).count() as u64)
    }

    fn create(&self, obj: &mut Row) -> Result<(), ModelError> {
        let mut rows = self.lock()?;
        let missing_key = obj
            .get(&self.primary_key)
            .map(|k| k.trim().is_empty())
            .unwrap_or(true);
        if missing_key {
            let next = rows
                .iter()
                .filter_map(|r| r.get(&self.primary_key)?.parse::<u64>().ok())
                .max()
                .unwrap_or(0)
                + 1;
            obj.insert(self.primary_key.clone(), next.to_string());
        }
        rows.push(obj.clone());
        Ok(())
    }

    fn update(&self, obj: &mut Row) -> Result<(), ModelError> {
        let key = self
            .key_of(obj)
            .ok_or_else(|| ModelError("update without a primary key".into()))?;
        let mut rows = self.lock()?;
        let slot = rows
            .iter_mut()
            .find(|r| r.get(&self.primary_key) == Some(&key))
            .ok_or_else(|| ModelError(format!("no row with key {key}")))?;
        *slot = obj.clone();
        Ok(())
    }

    fn delete(&self, obj: &Row) -> Result<(), ModelError> {
        let key = self
            .key_of(obj)
            .ok_or_else(|| ModelError("delete without a primary key".into()))?;
        let mut rows = self.lock()?;
        let before = rows.len();
        rows.retain(|r| r.get(&self.primary_key) != Some(&key));
        if rows.len() == before {
            return Err(ModelError(format!("no row with key {key}")));
        }
        Ok(())
    }

    fn integer_fields(&self) -> BTreeSet<String> {
        self.integer_fields.clone()
    }

    fn view_uri(&self, obj: &Row) -> Option<String> {
        let base = self.base_path.as_ref()?;
        let key = obj.get(&self.primary_key)?;
        Some(format!("{}/{}", base.trim_end_matches('/'), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use girder_query::{Params, QueryBuilder, QueryConfig};

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn seeded() -> MemoryModel {
        let model = MemoryModel::new("id");
        model.seed(vec![
            row(&[("id", "1"), ("name", "Acme Corp"), ("status", "active")]),
            row(&[("id", "2"), ("name", "Globex"), ("status", "rejected")]),
            row(&[("id", "3"), ("name", "Initech"), ("status", "active")]),
        ]);
        model
    }

    fn query(fields: &[&str], params: &str) -> QueryDescriptor {
        QueryBuilder::new(
            fields.iter().map(|f| f.to_string()).collect(),
            QueryConfig::default(),
        )
        .build(&Params::from_urlencoded(params))
        .unwrap()
    }

    #[test]
    fn fetch_by_key() {
        let model = seeded();
        let obj = model.fetch("2").unwrap().unwrap();
        assert_eq!(obj["name"], "Globex");
        assert!(model.fetch("99").unwrap().is_none());
    }

    #[test]
    fn search_applies_filters_and_sort() {
        let model = seeded();
        let q = query(&["status"], "status=active&_sort=name&_dir=asc");
        let rows = model.search(&q).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str()).collect();
        assert_eq!(names, vec!["Acme Corp", "Initech"]);
        assert_eq!(model.count(&q).unwrap(), 2);
    }

    #[test]
    fn count_ignores_pagination() {
        let model = seeded();
        let q = query(&["status"], "_page_size=1");
        assert_eq!(model.search(&q).unwrap().len(), 1);
        assert_eq!(model.count(&q).unwrap(), 3);
    }

    #[test]
    fn create_assigns_next_numeric_key() {
        let model = seeded();
        let mut obj = row(&[("name", "Umbrella")]);
        model.create(&mut obj).unwrap();
        assert_eq!(obj["id"], "4");
        assert_eq!(model.len(), 4);
    }

    #[test]
    fn create_keeps_an_explicit_key() {
        let model = seeded();
        let mut obj = row(&[("id", "42"), ("name", "Umbrella")]);
        model.create(&mut obj).unwrap();
        assert_eq!(obj["id"], "42");
    }

    #[test]
    fn update_replaces_the_row() {
        let model = seeded();
        let mut obj = row(&[("id", "2"), ("name", "Globex LLC"), ("status", "active")]);
        model.update(&mut obj).unwrap();
        assert_eq!(model.get("2").unwrap()["name"], "Globex LLC");
    }

    #[test]
    fn update_of_unknown_key_fails() {
        let model = seeded();
        let mut obj = row(&[("id", "99"), ("name", "Ghost")]);
        assert!(model.update(&mut obj).is_err());
    }

    #[test]
    fn delete_removes_the_row() {
        let model = seeded();
        let obj = model.fetch("1").unwrap().unwrap();
        model.delete(&obj).unwrap();
        assert_eq!(model.len(), 2);
        assert!(model.get("1").is_none());
    }

    #[test]
    fn view_uri_needs_a_base_path() {
        let plain = seeded();
        let obj = plain.fetch("1").unwrap().unwrap();
        assert_eq!(plain.view_uri(&obj), None);

        let routed = MemoryModel::new("id").with_base_path("/accounts/");
        assert_eq!(
            routed.view_uri(&obj),
            Some("/accounts/1".to_string())
        );
    }
}

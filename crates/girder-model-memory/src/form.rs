use girder_crud::{CrudError, FormHandler, RequestContext};

use crate::model::Row;

/// A minimal form collaborator over [`Row`] objects: binds a fixed field
/// list straight from the submitted parameters and enforces required
/// fields. Stands in for a real form/validation library in tests and
/// examples.
pub struct RowForm {
    primary_key: String,
    fields: Vec<String>,
    required: Vec<String>,
}

impl RowForm {
    pub fn new<I, S>(primary_key: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            primary_key: primary_key.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            required: Vec::new(),
        }
    }

    pub fn with_required<I, S>(mut self, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = required.into_iter().map(Into::into).collect();
        self
    }
}

impl FormHandler<Row> for RowForm {
    fn field_names(&self) -> Vec<String> {
        self.fields.clone()
    }

    fn init_form(&self, obj: &Row, ctx: &mut RequestContext<Row>) {
        let form: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|f| {
                let value = obj.get(f).cloned().unwrap_or_default();
                (f.clone(), serde_json::Value::String(value))
            })
            .collect();
        ctx.stash.form = Some(serde_json::Value::Object(form));
    }

    fn form_to_object(&self, ctx: &mut RequestContext<Row>) -> Result<Option<Row>, CrudError> {
        let mut row = Row::new();
        for field in &self.fields {
            if let Some(value) = ctx.params().first(field) {
                row.insert(field.clone(), value.to_string());
            }
        }
        if let Some(key) = ctx.key() {
            let key = key.trim();
            if !key.is_empty() && key != "0" {
                row.insert(self.primary_key.clone(), key.to_string());
            }
        }

        for field in &self.required {
            let blank = row
                .get(field)
                .map(|v| v.trim().is_empty())
                .unwrap_or(true);
            if blank {
                ctx.fail(CrudError::Validation(format!("{field} is required")));
                ctx.stash.template = Some("edit".to_string());
                return Ok(None);
            }
        }
        Ok(Some(row))
    }
}

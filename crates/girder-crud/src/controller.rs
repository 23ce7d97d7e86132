use girder_query::{Pager, QueryBuilder, QueryConfig, QueryDescriptor};

use crate::context::RequestContext;
use crate::envelope::{ResultEnvelope, SearchOutcome};
use crate::error::CrudError;
use crate::form::FormHandler;
use crate::hooks::Hooks;
use crate::model::Backend;

/// Controller configuration. Immutable once the controller is built;
/// per-request behavior comes from parameters and context flags only.
#[derive(Debug, Clone)]
pub struct CrudConfig {
    /// Columns a search request may filter on. When empty, the form
    /// handler's field names are used instead.
    pub fields: Vec<String>,
    /// List root, used as the fallback redirect target.
    pub base_path: String,
    /// Permit save/rm over non-write methods. Off by default.
    pub allow_get_writes: bool,
    /// Skip the listing page when a search matches exactly one row.
    pub redirect_on_single_result: bool,
    /// Return raw collaborator rows instead of a [`ResultEnvelope`].
    pub naked_results: bool,
    /// Template selected when a precommit hook vetoes a save without
    /// choosing one itself.
    pub default_template: String,
    pub view_template: String,
    pub edit_template: String,
    pub list_template: String,
    pub query: QueryConfig,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            base_path: "/".to_string(),
            allow_get_writes: false,
            redirect_on_single_result: true,
            naked_results: false,
            default_template: "edit".to_string(),
            view_template: "view".to_string(),
            edit_template: "edit".to_string(),
            list_template: "list".to_string(),
            query: QueryConfig::default(),
        }
    }
}

/// Sequences a CRUD request: permission checks, object fetch, form binding,
/// persistence, and result wrapping. All I/O goes through the injected
/// [`Backend`]; all validation through the injected [`FormHandler`].
///
/// Write aborts (denied, invalid, vetoed) return `Ok(false)` and record the
/// reason on the context — the return value alone does not say which stage
/// refused. Hard collaborator failures return `Err`.
pub struct CrudController<B, F, H>
where
    B: Backend,
{
    config: CrudConfig,
    query_config: QueryConfig,
    backend: B,
    form: F,
    hooks: H,
}

impl<B, F, H> CrudController<B, F, H>
where
    B: Backend,
    B::Obj: Default + Clone,
    F: FormHandler<B::Obj>,
    H: Hooks<B::Obj>,
{
    pub fn new(config: CrudConfig, backend: B, form: F, hooks: H) -> Self {
        // Capabilities are resolved here, once — integer-like fields from
        // the backend fold into the query configuration.
        let mut query_config = config.query.clone();
        query_config
            .integer_fields
            .extend(backend.integer_fields());
        Self {
            config,
            query_config,
            backend,
            form,
            hooks,
        }
    }

    pub fn config(&self) -> &CrudConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetch the object named by the route capture. An absent, empty, or
    /// zero key means "new object".
    pub fn fetch(&self, ctx: &mut RequestContext<B::Obj>) -> Result<B::Obj, CrudError> {
        if ctx.has_errors() {
            return Err(CrudError::NotFound("fetch aborted".into()));
        }
        match write_key(ctx) {
            None => Ok(B::Obj::default()),
            Some(key) => match self.backend.fetch(ctx, &key)? {
                Some(obj) => {
                    ctx.stash.object_id = Some(key);
                    Ok(obj)
                }
                None => Err(CrudError::NotFound(key)),
            },
        }
    }

    /// Fetch and stash the object for display.
    pub fn view(&self, ctx: &mut RequestContext<B::Obj>) -> Result<(), CrudError> {
        if !self.hooks.can_read(ctx) {
            return Err(CrudError::PermissionDenied("view"));
        }
        let obj = self.fetch(ctx)?;
        ctx.stash.object = Some(obj);
        ctx.stash
            .template
            .get_or_insert_with(|| self.config.view_template.clone());
        Ok(())
    }

    /// Fetch the object (or a fresh one) and bind it into the form.
    pub fn edit(&self, ctx: &mut RequestContext<B::Obj>) -> Result<(), CrudError> {
        if !self.hooks.can_read(ctx) {
            return Err(CrudError::PermissionDenied("edit"));
        }
        let obj = self.fetch(ctx)?;
        self.form.init_form(&obj, ctx);
        ctx.stash.object = Some(obj);
        ctx.stash
            .template
            .get_or_insert_with(|| self.config.edit_template.clone());
        Ok(())
    }

    /// The write pipeline. Checkpoints run in a fixed order and every abort
    /// leaves persistence untouched:
    ///
    /// method check → `_delete` branch → prior errors → fetch →
    /// `can_write` → `form_to_object` → `precommit` → create/update →
    /// `postcommit`.
    ///
    /// Create versus update is decided by the route key captured before
    /// binding, not by any property of the bound object.
    pub fn save(&self, ctx: &mut RequestContext<B::Obj>) -> Result<bool, CrudError> {
        if !self.config.allow_get_writes && !ctx.is_write() {
            ctx.fail(CrudError::PermissionDenied("save"));
            return Ok(false);
        }
        if ctx.params().flag("_delete") {
            return self.rm(ctx);
        }
        if ctx.has_errors() {
            return Ok(false);
        }

        let key = write_key(ctx);
        let existing = match &key {
            Some(k) => self.backend.fetch(ctx, k)?,
            None => None,
        };
        if !self.hooks.can_write(ctx, existing.as_ref()) {
            ctx.fail(CrudError::PermissionDenied("save"));
            return Ok(false);
        }

        let Some(mut obj) = self.form.form_to_object(ctx)? else {
            // Rejected submission; the form handler owns the redisplay.
            tracing::debug!("form binding rejected the submission");
            return Ok(false);
        };
        if ctx.has_errors() {
            return Ok(false);
        }

        if !self.hooks.precommit(ctx, &mut obj) {
            ctx.stash
                .template
                .get_or_insert_with(|| self.config.default_template.clone());
            return Ok(false);
        }

        match &key {
            Some(_) => self.backend.update(ctx, &mut obj)?,
            None => self.backend.create(ctx, &mut obj)?,
        }
        tracing::debug!(created = key.is_none(), "object persisted");

        if !self.hooks.postcommit(ctx, Some(&obj), false) {
            let uri = self
                .backend
                .view_uri(&obj)
                .unwrap_or_else(|| self.config.base_path.clone());
            ctx.redirect_to(uri);
        }
        ctx.stash.object = Some(obj);
        Ok(true)
    }

    /// The delete pipeline: method check → fetch → `can_write` → delete →
    /// `postcommit` (default redirect to the list root).
    pub fn rm(&self, ctx: &mut RequestContext<B::Obj>) -> Result<bool, CrudError> {
        if !self.config.allow_get_writes && !ctx.is_write() {
            ctx.fail(CrudError::PermissionDenied("rm"));
            return Ok(false);
        }
        if ctx.has_errors() {
            return Ok(false);
        }
        let Some(key) = write_key(ctx) else {
            return Err(CrudError::NotFound("missing key".into()));
        };
        let Some(obj) = self.backend.fetch(ctx, &key)? else {
            return Err(CrudError::NotFound(key));
        };
        if !self.hooks.can_write(ctx, Some(&obj)) {
            ctx.fail(CrudError::PermissionDenied("rm"));
            return Ok(false);
        }

        self.backend.delete(ctx, &obj)?;
        tracing::debug!(key = %key, "object deleted");

        if !self.hooks.postcommit(ctx, Some(&obj), true) {
            ctx.redirect_to(self.config.base_path.clone());
        }
        Ok(true)
    }

    /// Run a search and stash the outcome under `results`.
    pub fn list(
        &self,
        ctx: &mut RequestContext<B::Obj>,
    ) -> Result<SearchOutcome<B::Obj>, CrudError> {
        let outcome = self.do_search(ctx, false)?;
        ctx.stash.results = Some(outcome.clone());
        ctx.stash
            .template
            .get_or_insert_with(|| self.config.list_template.clone());
        Ok(outcome)
    }

    /// Same pipeline as [`list`](Self::list); kept as its own action name
    /// so applications can route and override it separately.
    pub fn search(
        &self,
        ctx: &mut RequestContext<B::Obj>,
    ) -> Result<SearchOutcome<B::Obj>, CrudError> {
        self.list(ctx)
    }

    /// Count-only search: no rows are fetched.
    pub fn count(&self, ctx: &mut RequestContext<B::Obj>) -> Result<u64, CrudError> {
        match self.do_search(ctx, true)? {
            SearchOutcome::Envelope(envelope) => Ok(envelope.count),
            SearchOutcome::Rows(rows) => Ok(rows.len() as u64),
            SearchOutcome::Redirect(_) => Ok(1),
        }
    }

    /// The search pipeline backing `list`, `search`, and `count`.
    ///
    /// Query construction is layered: the controller hook wins over the
    /// backend's `make_query`, which wins over the parameter-driven
    /// builder. A zero count short-circuits without fetching rows, and a
    /// uniquely-matching search turns into a redirect when the backend can
    /// name the row's view URI.
    pub fn do_search(
        &self,
        ctx: &mut RequestContext<B::Obj>,
        count_only: bool,
    ) -> Result<SearchOutcome<B::Obj>, CrudError> {
        let query = match self.hooks.make_query(ctx) {
            Some(built) => built?,
            None => match self.backend.make_query(ctx) {
                Some(built) => built?,
                None => self.default_query(ctx)?,
            },
        };

        let count = self.backend.count(ctx, &query)?;
        tracing::debug!(count, count_only, "search counted");

        let no_page = ctx.params().flag("_no_page");
        let page = ctx.params().uint("_page").filter(|p| *p >= 1).unwrap_or(1);
        let page_size = query.limit.unwrap_or(self.query_config.page_size);

        if count == 0 || count_only {
            let pager = (!no_page && !count_only)
                .then(|| self.build_pager(count, &query, page, page_size));
            return Ok(SearchOutcome::Envelope(ResultEnvelope {
                count,
                pager,
                rows: Vec::new(),
                query,
            }));
        }

        let rows = self.backend.search(ctx, &query)?;

        if rows.len() == 1
            && ctx.redirect_on_single_result(self.config.redirect_on_single_result)
        {
            if let Some(uri) = self.backend.view_uri(&rows[0]) {
                tracing::debug!(uri = %uri, "single result, redirecting");
                ctx.redirect_to(uri.clone());
                return Ok(SearchOutcome::Redirect(uri));
            }
        }

        if self.config.naked_results {
            return Ok(SearchOutcome::Rows(rows));
        }

        let pager = (!no_page).then(|| self.build_pager(count, &query, page, page_size));
        Ok(SearchOutcome::Envelope(ResultEnvelope {
            count,
            pager,
            rows,
            query,
        }))
    }

    fn default_query(
        &self,
        ctx: &mut RequestContext<B::Obj>,
    ) -> Result<QueryDescriptor, CrudError> {
        let mut fields = self.config.fields.clone();
        if fields.is_empty() {
            fields = self.form.field_names();
        }
        QueryBuilder::new(fields, self.query_config.clone())
            .build(ctx.params())
            .map_err(CrudError::from)
    }

    fn build_pager(
        &self,
        count: u64,
        query: &QueryDescriptor,
        page: u64,
        page_size: u64,
    ) -> Pager {
        self.backend
            .make_pager(count, query)
            .unwrap_or_else(|| Pager::new(count, page_size, page))
    }
}

/// Route capture normalized for the write path: empty and `"0"` both mean
/// "no existing object".
fn write_key<Obj>(ctx: &RequestContext<Obj>) -> Option<String> {
    ctx.key()
        .map(str::trim)
        .filter(|k| !k.is_empty() && *k != "0")
        .map(str::to_string)
}

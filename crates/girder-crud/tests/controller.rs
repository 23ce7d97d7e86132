use girder_crud::*;
use girder_model_memory::{MemoryModel, Row, RowForm};
use girder_query::{Params, QueryBuilder, QueryConfig, QueryDescriptor};
use ::http::Method;

const FIELDS: [&str; 3] = ["name", "status", "revenue"];

fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn seeded_model() -> MemoryModel {
    let model = MemoryModel::new("id");
    model.seed(vec![
        row(&[("id", "1"), ("name", "Acme Corp"), ("status", "active"), ("revenue", "50000")]),
        row(&[("id", "2"), ("name", "Globex"), ("status", "rejected"), ("revenue", "80000")]),
        row(&[("id", "3"), ("name", "Initech"), ("status", "active"), ("revenue", "12000")]),
        row(&[("id", "4"), ("name", "Umbrella"), ("status", "active"), ("revenue", "95000")]),
        row(&[("id", "5"), ("name", "Stark Industries"), ("status", "snoozed"), ("revenue", "200000")]),
    ]);
    model
}

fn config() -> CrudConfig {
    CrudConfig {
        fields: FIELDS.iter().map(|f| f.to_string()).collect(),
        base_path: "/accounts".to_string(),
        ..CrudConfig::default()
    }
}

fn form() -> RowForm {
    RowForm::new("id", FIELDS).with_required(["name"])
}

fn controller(
    model: MemoryModel,
) -> CrudController<DirectBackend<MemoryModel>, RowForm, DefaultHooks> {
    CrudController::new(config(), DirectBackend(model), form(), DefaultHooks)
}

fn get_ctx(params: &str) -> RequestContext<Row> {
    RequestContext::new(Method::GET, Params::from_urlencoded(params), None)
}

fn post_ctx(params: &str, key: Option<&str>) -> RequestContext<Row> {
    RequestContext::new(
        Method::POST,
        Params::from_urlencoded(params),
        key.map(str::to_string),
    )
}

fn envelope(outcome: SearchOutcome<Row>) -> ResultEnvelope<Row> {
    match outcome {
        SearchOutcome::Envelope(e) => e,
        other => panic!("expected envelope, got {other:?}"),
    }
}

// ── Search pipeline ─────────────────────────────────────────────

#[test]
fn list_wraps_rows_in_an_envelope() {
    let crud = controller(seeded_model());
    let mut ctx = get_ctx("");
    let env = envelope(crud.list(&mut ctx).unwrap());

    assert_eq!(env.count, 5);
    assert_eq!(env.rows.len(), 5);
    // default sort: primary key descending
    assert_eq!(env.rows[0]["id"], "5");
    let pager = env.pager.unwrap();
    assert_eq!(pager.total_entries, 5);
    assert!(ctx.stash.results.is_some());
    assert_eq!(ctx.stash.template.as_deref(), Some("list"));
}

#[test]
fn search_filters_with_wildcards() {
    let crud = controller(seeded_model());
    let mut ctx = get_ctx("name=In%25");
    let env = envelope(crud.search(&mut ctx).unwrap());
    assert_eq!(env.count, 1);
    assert_eq!(env.rows[0]["name"], "Initech");
}

#[test]
fn pagination_limits_rows_but_not_count() {
    let crud = controller(seeded_model());
    let mut ctx = get_ctx("_page=2&_page_size=2");
    let env = envelope(crud.list(&mut ctx).unwrap());

    assert_eq!(env.count, 5);
    let ids: Vec<&str> = env.rows.iter().map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, vec!["3", "2"]);
    let pager = env.pager.unwrap();
    assert_eq!(pager.current_page, 2);
    assert_eq!(pager.last_page(), 3);
}

#[test]
fn no_page_suppresses_the_pager() {
    let crud = controller(seeded_model());
    let mut ctx = get_ctx("_no_page=1");
    let env = envelope(crud.list(&mut ctx).unwrap());
    assert_eq!(env.rows.len(), 5);
    assert!(env.pager.is_none());
    assert_eq!(env.query.limit, None);
    assert_eq!(env.query.offset, None);
}

#[test]
fn count_fetches_no_rows() {
    let crud = controller(seeded_model());
    let mut ctx = get_ctx("status=active");
    assert_eq!(crud.count(&mut ctx).unwrap(), 3);
}

#[test]
fn zero_count_short_circuits_before_searching() {
    struct NoSearchModel(MemoryModel);

    impl Model for NoSearchModel {
        type Obj = Row;

        fn fetch(&self, key: &str) -> Result<Option<Row>, ModelError> {
            self.0.fetch(key)
        }
        fn search(&self, _query: &QueryDescriptor) -> Result<Vec<Row>, ModelError> {
            panic!("search must not run when the count is zero");
        }
        fn count(&self, query: &QueryDescriptor) -> Result<u64, ModelError> {
            self.0.count(query)
        }
        fn create(&self, obj: &mut Row) -> Result<(), ModelError> {
            self.0.create(obj)
        }
        fn update(&self, obj: &mut Row) -> Result<(), ModelError> {
            self.0.update(obj)
        }
        fn delete(&self, obj: &Row) -> Result<(), ModelError> {
            self.0.delete(obj)
        }
    }

    let crud = CrudController::new(
        config(),
        DirectBackend(NoSearchModel(seeded_model())),
        form(),
        DefaultHooks,
    );
    let mut ctx = get_ctx("status=nothing-has-this");
    let env = envelope(crud.list(&mut ctx).unwrap());
    assert_eq!(env.count, 0);
    assert!(env.rows.is_empty());
}

#[test]
fn single_result_redirects_when_the_model_resolves_a_uri() {
    let model = seeded_model().with_base_path("/accounts");
    let crud = CrudController::new(config(), DirectBackend(model), form(), DefaultHooks);
    let mut ctx = get_ctx("name=Initech");
    match crud.search(&mut ctx).unwrap() {
        SearchOutcome::Redirect(uri) => assert_eq!(uri, "/accounts/3"),
        other => panic!("expected redirect, got {other:?}"),
    }
    assert_eq!(ctx.redirect(), Some("/accounts/3"));
}

#[test]
fn single_result_redirect_can_be_disabled_per_request() {
    let model = seeded_model().with_base_path("/accounts");
    let crud = CrudController::new(config(), DirectBackend(model), form(), DefaultHooks);
    let mut ctx = get_ctx("name=Initech");
    ctx.set_redirect_on_single_result(false);
    let env = envelope(crud.search(&mut ctx).unwrap());
    assert_eq!(env.count, 1);
    assert!(ctx.redirect().is_none());
}

#[test]
fn naked_results_bypass_the_envelope() {
    let crud = CrudController::new(
        CrudConfig {
            naked_results: true,
            ..config()
        },
        DirectBackend(seeded_model()),
        form(),
        DefaultHooks,
    );
    let mut ctx = get_ctx("status=active");
    match crud.list(&mut ctx).unwrap() {
        SearchOutcome::Rows(rows) => assert_eq!(rows.len(), 3),
        other => panic!("expected naked rows, got {other:?}"),
    }
}

#[test]
fn integer_fields_turn_wildcards_into_ranges() {
    let model = seeded_model().with_integer_fields(["revenue"]);
    let crud = CrudController::new(config(), DirectBackend(model), form(), DefaultHooks);
    let mut ctx = get_ctx("revenue=80000%25");
    let env = envelope(crud.list(&mut ctx).unwrap());
    assert_eq!(env.count, 3); // 80000, 95000, 200000
}

#[test]
fn controller_hook_query_wins_over_the_parameter_builder() {
    struct ActiveOnly;
    impl Hooks<Row> for ActiveOnly {
        fn make_query(
            &self,
            _ctx: &mut RequestContext<Row>,
        ) -> Option<Result<QueryDescriptor, CrudError>> {
            let built = QueryBuilder::new(vec!["status".to_string()], QueryConfig::default())
                .build(&Params::from_urlencoded("status=active"))
                .map_err(CrudError::from);
            Some(built)
        }
    }

    let crud = CrudController::new(config(), DirectBackend(seeded_model()), form(), ActiveOnly);
    // the submitted filter is ignored in favor of the hook's query
    let mut ctx = get_ctx("status=rejected");
    let env = envelope(crud.list(&mut ctx).unwrap());
    assert_eq!(env.count, 3);
}

#[test]
fn missing_field_list_is_a_configuration_error() {
    let crud = CrudController::new(
        CrudConfig {
            fields: Vec::new(),
            ..config()
        },
        DirectBackend(seeded_model()),
        RowForm::new("id", Vec::<String>::new()),
        DefaultHooks,
    );
    let mut ctx = get_ctx("");
    let err = crud.list(&mut ctx).unwrap_err();
    assert!(matches!(err, CrudError::Config(_)));
}

// ── Write pipeline ──────────────────────────────────────────────

#[test]
fn save_without_key_creates() {
    let crud = controller(seeded_model());
    let mut ctx = post_ctx("name=Hooli&status=active", None);
    assert!(crud.save(&mut ctx).unwrap());

    let model = &crud.backend().0;
    assert_eq!(model.len(), 6);
    assert_eq!(model.get("6").unwrap()["name"], "Hooli");
    // no view uri on this model, so the fallback is the list root
    assert_eq!(ctx.redirect(), Some("/accounts"));
}

#[test]
fn save_with_zero_key_also_creates() {
    let crud = controller(seeded_model());
    let mut ctx = post_ctx("name=Hooli", Some("0"));
    assert!(crud.save(&mut ctx).unwrap());
    assert_eq!(crud.backend().0.len(), 6);
}

#[test]
fn save_with_key_updates_in_place() {
    let crud = controller(seeded_model());
    let mut ctx = post_ctx("name=Globex+LLC&status=active", Some("2"));
    assert!(crud.save(&mut ctx).unwrap());

    let model = &crud.backend().0;
    assert_eq!(model.len(), 5);
    assert_eq!(model.get("2").unwrap()["name"], "Globex LLC");
}

#[test]
fn save_redirects_to_the_view_uri_when_resolvable() {
    let model = seeded_model().with_base_path("/accounts");
    let crud = CrudController::new(config(), DirectBackend(model), form(), DefaultHooks);
    let mut ctx = post_ctx("name=Hooli", None);
    assert!(crud.save(&mut ctx).unwrap());
    assert_eq!(ctx.redirect(), Some("/accounts/6"));
}

#[test]
fn save_over_get_is_denied_by_default() {
    let crud = controller(seeded_model());
    let mut ctx = get_ctx("name=Hooli");
    assert!(!crud.save(&mut ctx).unwrap());
    assert!(matches!(
        ctx.first_error(),
        Some(CrudError::PermissionDenied(_))
    ));
    assert_eq!(crud.backend().0.len(), 5);
}

#[test]
fn save_over_get_works_when_configured() {
    let crud = CrudController::new(
        CrudConfig {
            allow_get_writes: true,
            ..config()
        },
        DirectBackend(seeded_model()),
        form(),
        DefaultHooks,
    );
    let mut ctx = get_ctx("name=Hooli");
    assert!(crud.save(&mut ctx).unwrap());
    assert_eq!(crud.backend().0.len(), 6);
}

#[test]
fn validation_failure_aborts_without_persisting() {
    let crud = controller(seeded_model());
    let mut ctx = post_ctx("status=active", None); // required name missing
    assert!(!crud.save(&mut ctx).unwrap());
    assert!(matches!(ctx.first_error(), Some(CrudError::Validation(_))));
    assert_eq!(crud.backend().0.len(), 5);
}

#[test]
fn prior_errors_abort_before_any_side_effect() {
    let crud = controller(seeded_model());
    let mut ctx = post_ctx("name=Hooli", None);
    ctx.fail(CrudError::Validation("upstream stage failed".into()));
    assert!(!crud.save(&mut ctx).unwrap());
    assert_eq!(crud.backend().0.len(), 5);
}

#[test]
fn write_denial_from_hooks_aborts() {
    struct ReadOnly;
    impl Hooks<Row> for ReadOnly {
        fn can_write(&self, _ctx: &mut RequestContext<Row>, _obj: Option<&Row>) -> bool {
            false
        }
    }

    let crud = CrudController::new(config(), DirectBackend(seeded_model()), form(), ReadOnly);
    let mut ctx = post_ctx("name=Hooli", None);
    assert!(!crud.save(&mut ctx).unwrap());
    assert!(matches!(
        ctx.first_error(),
        Some(CrudError::PermissionDenied("save"))
    ));
    assert_eq!(crud.backend().0.len(), 5);
}

#[test]
fn precommit_veto_aborts_with_the_fallback_template() {
    struct Veto;
    impl Hooks<Row> for Veto {
        fn precommit(&self, _ctx: &mut RequestContext<Row>, _obj: &mut Row) -> bool {
            false
        }
    }

    let crud = CrudController::new(config(), DirectBackend(seeded_model()), form(), Veto);
    let mut ctx = post_ctx("name=Hooli", None);
    assert!(!crud.save(&mut ctx).unwrap());
    assert_eq!(ctx.stash.template.as_deref(), Some("edit"));
    assert_eq!(crud.backend().0.len(), 5);
}

#[test]
fn postcommit_hook_can_own_the_response() {
    struct Custom;
    impl Hooks<Row> for Custom {
        fn postcommit(
            &self,
            ctx: &mut RequestContext<Row>,
            _obj: Option<&Row>,
            _deleted: bool,
        ) -> bool {
            ctx.redirect_to("/thanks");
            true
        }
    }

    let crud = CrudController::new(config(), DirectBackend(seeded_model()), form(), Custom);
    let mut ctx = post_ctx("name=Hooli", None);
    assert!(crud.save(&mut ctx).unwrap());
    assert_eq!(ctx.redirect(), Some("/thanks"));
}

#[test]
fn delete_flag_short_circuits_to_the_delete_path() {
    let crud = controller(seeded_model());
    let mut ctx = post_ctx("_delete=1&name=whatever", Some("2"));
    assert!(crud.save(&mut ctx).unwrap());

    let model = &crud.backend().0;
    assert_eq!(model.len(), 4);
    assert!(model.get("2").is_none());
    assert_eq!(ctx.redirect(), Some("/accounts"));
}

#[test]
fn rm_deletes_and_redirects_to_the_list_root() {
    let crud = controller(seeded_model());
    let mut ctx = post_ctx("", Some("5"));
    assert!(crud.rm(&mut ctx).unwrap());
    assert_eq!(crud.backend().0.len(), 4);
    assert_eq!(ctx.redirect(), Some("/accounts"));
}

#[test]
fn rm_without_key_is_not_found() {
    let crud = controller(seeded_model());
    let mut ctx = post_ctx("", None);
    assert!(matches!(
        crud.rm(&mut ctx).unwrap_err(),
        CrudError::NotFound(_)
    ));
}

#[test]
fn rm_of_unknown_key_is_not_found() {
    let crud = controller(seeded_model());
    let mut ctx = post_ctx("", Some("99"));
    assert!(matches!(
        crud.rm(&mut ctx).unwrap_err(),
        CrudError::NotFound(_)
    ));
}

// ── Fetch / view / edit ─────────────────────────────────────────

#[test]
fn fetch_without_key_yields_a_fresh_object() {
    let crud = controller(seeded_model());
    let mut ctx = get_ctx("");
    let obj = crud.fetch(&mut ctx).unwrap();
    assert!(obj.is_empty());
}

#[test]
fn view_stashes_the_object() {
    let crud = controller(seeded_model());
    let mut ctx = RequestContext::new(Method::GET, Params::new(), Some("3".to_string()));
    crud.view(&mut ctx).unwrap();
    assert_eq!(ctx.stash.object.as_ref().unwrap()["name"], "Initech");
    assert_eq!(ctx.stash.object_id.as_deref(), Some("3"));
    assert_eq!(ctx.stash.template.as_deref(), Some("view"));
}

#[test]
fn view_of_unknown_key_is_not_found() {
    let crud = controller(seeded_model());
    let mut ctx = RequestContext::new(Method::GET, Params::new(), Some("99".to_string()));
    assert!(matches!(
        crud.view(&mut ctx).unwrap_err(),
        CrudError::NotFound(_)
    ));
}

#[test]
fn edit_binds_the_form() {
    let crud = controller(seeded_model());
    let mut ctx = RequestContext::new(Method::GET, Params::new(), Some("1".to_string()));
    crud.edit(&mut ctx).unwrap();
    let bound = ctx.stash.form.as_ref().unwrap();
    assert_eq!(bound["name"], "Acme Corp");
    assert_eq!(ctx.stash.template.as_deref(), Some("edit"));
}

#[test]
fn read_denial_surfaces_as_permission_denied() {
    struct NoRead;
    impl Hooks<Row> for NoRead {
        fn can_read(&self, _ctx: &mut RequestContext<Row>) -> bool {
            false
        }
    }

    let crud = CrudController::new(config(), DirectBackend(seeded_model()), form(), NoRead);
    let mut ctx = RequestContext::new(Method::GET, Params::new(), Some("1".to_string()));
    assert!(matches!(
        crud.view(&mut ctx).unwrap_err(),
        CrudError::PermissionDenied("view")
    ));
}

// ── Adapter backend ─────────────────────────────────────────────

#[test]
fn adapter_query_applies_when_no_controller_hook_exists() {
    struct ScopedAdapter(MemoryModel);

    impl ModelAdapter for ScopedAdapter {
        type Obj = Row;

        fn fetch(
            &self,
            _ctx: &mut RequestContext<Row>,
            key: &str,
        ) -> Result<Option<Row>, ModelError> {
            self.0.fetch(key)
        }
        fn search(
            &self,
            _ctx: &mut RequestContext<Row>,
            query: &QueryDescriptor,
        ) -> Result<Vec<Row>, ModelError> {
            self.0.search(query)
        }
        fn count(
            &self,
            _ctx: &mut RequestContext<Row>,
            query: &QueryDescriptor,
        ) -> Result<u64, ModelError> {
            self.0.count(query)
        }
        fn create(&self, _ctx: &mut RequestContext<Row>, obj: &mut Row) -> Result<(), ModelError> {
            self.0.create(obj)
        }
        fn update(&self, _ctx: &mut RequestContext<Row>, obj: &mut Row) -> Result<(), ModelError> {
            self.0.update(obj)
        }
        fn delete(&self, _ctx: &mut RequestContext<Row>, obj: &Row) -> Result<(), ModelError> {
            self.0.delete(obj)
        }

        fn make_query(
            &self,
            _ctx: &mut RequestContext<Row>,
        ) -> Option<Result<QueryDescriptor, CrudError>> {
            let built = QueryBuilder::new(vec!["status".to_string()], QueryConfig::default())
                .build(&Params::from_urlencoded("status=snoozed"))
                .map_err(CrudError::from);
            Some(built)
        }
    }

    let crud = CrudController::new(
        config(),
        AdapterBackend(ScopedAdapter(seeded_model())),
        form(),
        DefaultHooks,
    );
    let mut ctx = get_ctx("status=active");
    ctx.set_redirect_on_single_result(false);
    let env = envelope(crud.list(&mut ctx).unwrap());
    assert_eq!(env.count, 1);
    assert_eq!(env.rows[0]["name"], "Stark Industries");
}

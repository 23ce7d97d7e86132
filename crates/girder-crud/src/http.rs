use http::{Method, Request, Response, StatusCode, header};
use serde::Serialize;

use crate::context::RequestContext;
use crate::controller::CrudController;
use crate::envelope::SearchOutcome;
use crate::error::CrudError;
use crate::form::FormHandler;
use crate::hooks::Hooks;
use crate::model::Backend;

/// Thin HTTP facade over a [`CrudController`]: routes a request to an
/// action, runs it against a fresh [`RequestContext`], and renders the
/// stash as JSON (or a redirect). Real applications usually mount the
/// controller in their own router; this facade is the reference wiring.
pub struct CrudHttp<B, F, H>
where
    B: Backend,
{
    controller: CrudController<B, F, H>,
}

impl<B, F, H> CrudHttp<B, F, H>
where
    B: Backend,
    B::Obj: Default + Clone + Serialize,
    F: FormHandler<B::Obj>,
    H: Hooks<B::Obj>,
{
    pub fn new(controller: CrudController<B, F, H>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &CrudController<B, F, H> {
        &self.controller
    }

    pub fn handle(&self, req: Request<Vec<u8>>) -> Response<Vec<u8>> {
        let path = req.uri().path().to_string();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (req.method(), segments.as_slice()) {
            (&Method::GET, []) | (&Method::GET, ["search"]) => self.list_action(&req),
            (&Method::GET, ["count"]) => self.count_action(&req),
            (&Method::GET, ["new"]) => self.edit_action(&req, None),
            (&Method::GET, [key, "edit"]) => self.edit_action(&req, Some(key)),
            (&Method::GET, [key]) => self.view_action(&req, key),
            (&Method::POST, []) => self.save_action(&req, None),
            (&Method::POST, [key]) => self.save_action(&req, Some(key)),
            (&Method::POST, [key, "rm"]) | (&Method::DELETE, [key]) => {
                self.rm_action(&req, key)
            }
            _ => json_response(StatusCode::NOT_FOUND, r#"{"error":"not found"}"#),
        }
    }

    fn list_action(&self, req: &Request<Vec<u8>>) -> Response<Vec<u8>> {
        let mut ctx = RequestContext::from_request(req, None);
        match self.controller.list(&mut ctx) {
            Ok(SearchOutcome::Redirect(uri)) => redirect_response(&uri),
            Ok(SearchOutcome::Envelope(envelope)) => to_json(StatusCode::OK, &envelope),
            Ok(SearchOutcome::Rows(rows)) => to_json(StatusCode::OK, &rows),
            Err(e) => error_response(e.status_code(), &e.to_string()),
        }
    }

    fn count_action(&self, req: &Request<Vec<u8>>) -> Response<Vec<u8>> {
        let mut ctx = RequestContext::from_request(req, None);
        match self.controller.count(&mut ctx) {
            Ok(count) => to_json(StatusCode::OK, &serde_json::json!({ "count": count })),
            Err(e) => error_response(e.status_code(), &e.to_string()),
        }
    }

    fn view_action(&self, req: &Request<Vec<u8>>, key: &str) -> Response<Vec<u8>> {
        let mut ctx = RequestContext::from_request(req, Some(key.to_string()));
        match self.controller.view(&mut ctx) {
            Ok(()) => match &ctx.stash.object {
                Some(obj) => to_json(StatusCode::OK, obj),
                None => json_response(StatusCode::NOT_FOUND, r#"{"error":"not found"}"#),
            },
            Err(e) => error_response(e.status_code(), &e.to_string()),
        }
    }

    fn edit_action(&self, req: &Request<Vec<u8>>, key: Option<&str>) -> Response<Vec<u8>> {
        let mut ctx = RequestContext::from_request(req, key.map(str::to_string));
        match self.controller.edit(&mut ctx) {
            Ok(()) => to_json(
                StatusCode::OK,
                &serde_json::json!({
                    "object": ctx.stash.object,
                    "form": ctx.stash.form,
                    "template": ctx.stash.template,
                }),
            ),
            Err(e) => error_response(e.status_code(), &e.to_string()),
        }
    }

    fn save_action(&self, req: &Request<Vec<u8>>, key: Option<&str>) -> Response<Vec<u8>> {
        let mut ctx = RequestContext::from_request(req, key.map(str::to_string));
        let result = self.controller.save(&mut ctx);
        self.finish_write(&ctx, result)
    }

    fn rm_action(&self, req: &Request<Vec<u8>>, key: &str) -> Response<Vec<u8>> {
        let mut ctx = RequestContext::from_request(req, Some(key.to_string()));
        let result = self.controller.rm(&mut ctx);
        self.finish_write(&ctx, result)
    }

    fn finish_write(
        &self,
        ctx: &RequestContext<B::Obj>,
        result: Result<bool, CrudError>,
    ) -> Response<Vec<u8>> {
        match result {
            Ok(true) => match ctx.redirect() {
                Some(location) => redirect_response(location),
                None => to_json(StatusCode::OK, &serde_json::json!({ "saved": true })),
            },
            Ok(false) => {
                // The return value only says "aborted" — the reason lives
                // on the context.
                let (status, message) = match ctx.first_error() {
                    Some(e) => (e.status_code(), e.to_string()),
                    None => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "submission rejected".to_string(),
                    ),
                };
                error_response(status, &message)
            }
            Err(e) => error_response(e.status_code(), &e.to_string()),
        }
    }
}

fn to_json<T: Serialize>(status: StatusCode, value: &T) -> Response<Vec<u8>> {
    match serde_json::to_vec(value) {
        Ok(body) => json_response(status, body),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

fn json_response(status: StatusCode, body: impl Into<Vec<u8>>) -> Response<Vec<u8>> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn error_response(status: StatusCode, message: &str) -> Response<Vec<u8>> {
    let body = serde_json::json!({ "error": message });
    json_response(status, body.to_string().into_bytes())
}

fn redirect_response(location: &str) -> Response<Vec<u8>> {
    Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(header::LOCATION, location)
        .body(Vec::new())
        .unwrap()
}

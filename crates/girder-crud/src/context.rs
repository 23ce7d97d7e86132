use girder_query::Params;
use http::{Method, Request, header};

use crate::envelope::SearchOutcome;
use crate::error::CrudError;

/// The fixed set of response keys the scaffolding writes. Everything else
/// about the response belongs to the host framework.
#[derive(Debug, Clone)]
pub struct Stash<Obj> {
    pub object: Option<Obj>,
    pub form: Option<serde_json::Value>,
    pub results: Option<SearchOutcome<Obj>>,
    pub template: Option<String>,
    pub object_id: Option<String>,
}

impl<Obj> Default for Stash<Obj> {
    fn default() -> Self {
        Self {
            object: None,
            form: None,
            results: None,
            template: None,
            object_id: None,
        }
    }
}

/// Per-request handle: the submitted parameters, the primary-key capture
/// from the route, the stash, and the accumulated error state.
///
/// Constructed by the host per request and discarded with it. Errors are
/// cumulative: once one is recorded, every later pipeline checkpoint
/// short-circuits without side effects.
#[derive(Debug)]
pub struct RequestContext<Obj> {
    method: Method,
    params: Params,
    key: Option<String>,
    pub stash: Stash<Obj>,
    redirect: Option<String>,
    errors: Vec<CrudError>,
    redirect_on_single: Option<bool>,
}

impl<Obj> RequestContext<Obj> {
    pub fn new(method: Method, params: Params, key: Option<String>) -> Self {
        Self {
            method,
            params,
            key,
            stash: Stash::default(),
            redirect: None,
            errors: Vec::new(),
            redirect_on_single: None,
        }
    }

    /// Build a context from an HTTP request: query-string parameters merged
    /// with a urlencoded body, if one was posted.
    pub fn from_request(req: &Request<Vec<u8>>, key: Option<String>) -> Self {
        let mut params = req
            .uri()
            .query()
            .map(Params::from_urlencoded)
            .unwrap_or_default();

        let form_body = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);
        if form_body {
            if let Ok(body) = std::str::from_utf8(req.body()) {
                params.merge(Params::from_urlencoded(body));
            }
        }

        Self::new(req.method().clone(), params, key)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Primary-key capture from the route, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_write(&self) -> bool {
        self.method == Method::POST
            || self.method == Method::PUT
            || self.method == Method::PATCH
            || self.method == Method::DELETE
    }

    pub fn fail(&mut self, error: CrudError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[CrudError] {
        &self.errors
    }

    pub fn first_error(&self) -> Option<&CrudError> {
        self.errors.first()
    }

    pub fn redirect_to(&mut self, uri: impl Into<String>) {
        self.redirect = Some(uri.into());
    }

    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    /// Per-request override for the single-result redirect behavior.
    pub fn set_redirect_on_single_result(&mut self, enabled: bool) {
        self.redirect_on_single = Some(enabled);
    }

    pub(crate) fn redirect_on_single_result(&self, default: bool) -> bool {
        self.redirect_on_single.unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_request_merges_query_and_form_body() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/accounts?name=Acme")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(b"status=active&name=Globex".to_vec())
            .unwrap();
        let ctx: RequestContext<()> = RequestContext::from_request(&req, None);
        assert_eq!(
            ctx.params().all("name").unwrap(),
            &["Acme".to_string(), "Globex".to_string()]
        );
        assert_eq!(ctx.params().first("status"), Some("active"));
    }

    #[test]
    fn body_is_ignored_without_form_content_type() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/accounts")
            .body(b"status=active".to_vec())
            .unwrap();
        let ctx: RequestContext<()> = RequestContext::from_request(&req, None);
        assert!(ctx.params().is_empty());
    }

    #[test]
    fn write_methods() {
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            let ctx: RequestContext<()> = RequestContext::new(method, Params::new(), None);
            assert!(ctx.is_write());
        }
        let ctx: RequestContext<()> = RequestContext::new(Method::GET, Params::new(), None);
        assert!(!ctx.is_write());
    }

    #[test]
    fn errors_accumulate() {
        let mut ctx: RequestContext<()> =
            RequestContext::new(Method::GET, Params::new(), None);
        assert!(!ctx.has_errors());
        ctx.fail(CrudError::Validation("name is required".into()));
        ctx.fail(CrudError::PermissionDenied("save"));
        assert!(ctx.has_errors());
        assert!(matches!(ctx.first_error(), Some(CrudError::Validation(_))));
    }
}

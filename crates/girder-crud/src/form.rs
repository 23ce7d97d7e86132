use crate::context::RequestContext;
use crate::error::CrudError;

/// The form/validation collaborator, supplied by a concrete application.
///
/// `form_to_object` owns validation: `Ok(None)` means the submission was
/// rejected, with the handler responsible for recording errors on the
/// context and selecting the redisplay template. The scaffolding never
/// inspects field values itself.
pub trait FormHandler<Obj> {
    /// Columns the form exposes; doubles as the default search-field list
    /// when the controller configuration leaves it empty.
    fn field_names(&self) -> Vec<String>;

    /// Bind an existing object into the form for display.
    fn init_form(&self, obj: &Obj, ctx: &mut RequestContext<Obj>);

    /// Validate the submitted parameters and produce a candidate object.
    fn form_to_object(
        &self,
        ctx: &mut RequestContext<Obj>,
    ) -> Result<Option<Obj>, CrudError>;

    /// Reset any form state held between requests.
    fn clear(&self) {}
}

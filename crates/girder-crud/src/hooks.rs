use girder_query::QueryDescriptor;

use crate::context::RequestContext;
use crate::error::CrudError;

/// Application hooks around the write and search pipelines. Every method
/// has a permissive default, so a controller can run with [`DefaultHooks`]
/// and opt into policy piecemeal.
///
/// Authorization policy itself lives in the application — the scaffolding
/// only sequences the checks.
pub trait Hooks<Obj> {
    fn can_read(&self, _ctx: &mut RequestContext<Obj>) -> bool {
        true
    }

    /// Write authorization. `obj` is the fetched object on the update and
    /// delete paths, `None` on create.
    fn can_write(&self, _ctx: &mut RequestContext<Obj>, _obj: Option<&Obj>) -> bool {
        true
    }

    /// Last veto before persistence. Returning false aborts the save with
    /// no side effects.
    fn precommit(&self, _ctx: &mut RequestContext<Obj>, _obj: &mut Obj) -> bool {
        true
    }

    /// Runs after persistence. Return true when the hook produced the
    /// response itself; false lets the controller issue its default
    /// redirect (object view, or the list root after a delete).
    fn postcommit(
        &self,
        _ctx: &mut RequestContext<Obj>,
        _obj: Option<&Obj>,
        _deleted: bool,
    ) -> bool {
        false
    }

    /// Controller-level query override; takes precedence over the model
    /// adapter's `make_query`.
    fn make_query(
        &self,
        _ctx: &mut RequestContext<Obj>,
    ) -> Option<Result<QueryDescriptor, CrudError>> {
        None
    }
}

/// Allows everything, overrides nothing.
pub struct DefaultHooks;

impl<Obj> Hooks<Obj> for DefaultHooks {}

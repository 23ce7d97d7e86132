use std::collections::BTreeSet;

use girder_query::{Pager, QueryDescriptor};

use crate::context::RequestContext;
use crate::error::{CrudError, ModelError};

/// The persistence collaborator: a plain model with no interest in the
/// request. All I/O lives behind this trait — the scaffolding performs none
/// of its own.
///
/// `integer_fields` and `view_uri` are optional capabilities with inert
/// defaults: the former routes trailing-wildcard searches on those fields
/// through a `>=` range, the latter enables the single-result redirect.
pub trait Model {
    type Obj;

    fn fetch(&self, key: &str) -> Result<Option<Self::Obj>, ModelError>;
    fn search(&self, query: &QueryDescriptor) -> Result<Vec<Self::Obj>, ModelError>;
    fn count(&self, query: &QueryDescriptor) -> Result<u64, ModelError>;
    fn create(&self, obj: &mut Self::Obj) -> Result<(), ModelError>;
    fn update(&self, obj: &mut Self::Obj) -> Result<(), ModelError>;
    fn delete(&self, obj: &Self::Obj) -> Result<(), ModelError>;

    fn integer_fields(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn view_uri(&self, _obj: &Self::Obj) -> Option<String> {
        None
    }
}

/// Request-aware indirection over a model, for cross-cutting persistence
/// logic that needs the request at hand (tenant scoping, audit columns).
/// Same operations as [`Model`], plus optional query and pager overrides.
pub trait ModelAdapter {
    type Obj;

    fn fetch(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        key: &str,
    ) -> Result<Option<Self::Obj>, ModelError>;
    fn search(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        query: &QueryDescriptor,
    ) -> Result<Vec<Self::Obj>, ModelError>;
    fn count(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        query: &QueryDescriptor,
    ) -> Result<u64, ModelError>;
    fn create(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        obj: &mut Self::Obj,
    ) -> Result<(), ModelError>;
    fn update(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        obj: &mut Self::Obj,
    ) -> Result<(), ModelError>;
    fn delete(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        obj: &Self::Obj,
    ) -> Result<(), ModelError>;

    fn make_query(
        &self,
        _ctx: &mut RequestContext<Self::Obj>,
    ) -> Option<Result<QueryDescriptor, CrudError>> {
        None
    }

    fn make_pager(&self, _count: u64, _query: &QueryDescriptor) -> Option<Pager> {
        None
    }

    fn integer_fields(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn view_uri(&self, _obj: &Self::Obj) -> Option<String> {
        None
    }
}

/// The single polymorphic interface the controller calls through. Two
/// concrete implementations exist — [`DirectBackend`] over a [`Model`] and
/// [`AdapterBackend`] over a [`ModelAdapter`] — chosen at controller
/// construction; the controller never branches on which one it holds.
pub trait Backend {
    type Obj;

    fn fetch(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        key: &str,
    ) -> Result<Option<Self::Obj>, CrudError>;
    fn search(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        query: &QueryDescriptor,
    ) -> Result<Vec<Self::Obj>, CrudError>;
    fn count(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        query: &QueryDescriptor,
    ) -> Result<u64, CrudError>;
    fn create(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        obj: &mut Self::Obj,
    ) -> Result<(), CrudError>;
    fn update(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        obj: &mut Self::Obj,
    ) -> Result<(), CrudError>;
    fn delete(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        obj: &Self::Obj,
    ) -> Result<(), CrudError>;

    fn make_query(
        &self,
        _ctx: &mut RequestContext<Self::Obj>,
    ) -> Option<Result<QueryDescriptor, CrudError>> {
        None
    }

    fn make_pager(&self, _count: u64, _query: &QueryDescriptor) -> Option<Pager> {
        None
    }

    fn integer_fields(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn view_uri(&self, _obj: &Self::Obj) -> Option<String> {
        None
    }
}

pub struct DirectBackend<M>(pub M);

impl<M: Model> Backend for DirectBackend<M> {
    type Obj = M::Obj;

    fn fetch(
        &self,
        _ctx: &mut RequestContext<Self::Obj>,
        key: &str,
    ) -> Result<Option<Self::Obj>, CrudError> {
        Ok(self.0.fetch(key)?)
    }

    fn search(
        &self,
        _ctx: &mut RequestContext<Self::Obj>,
        query: &QueryDescriptor,
    ) -> Result<Vec<Self::Obj>, CrudError> {
        Ok(self.0.search(query)?)
    }

    fn count(
        &self,
        _ctx: &mut RequestContext<Self::Obj>,
        query: &QueryDescriptor,
    ) -> Result<u64, CrudError> {
        Ok(self.0.count(query)?)
    }

    fn create(
        &self,
        _ctx: &mut RequestContext<Self::Obj>,
        obj: &mut Self::Obj,
    ) -> Result<(), CrudError> {
        Ok(self.0.create(obj)?)
    }

    fn update(
        &self,
        _ctx: &mut RequestContext<Self::Obj>,
        obj: &mut Self::Obj,
    ) -> Result<(), CrudError> {
        Ok(self.0.update(obj)?)
    }

    fn delete(
        &self,
        _ctx: &mut RequestContext<Self::Obj>,
        obj: &Self::Obj,
    ) -> Result<(), CrudError> {
        Ok(self.0.delete(obj)?)
    }

    fn integer_fields(&self) -> BTreeSet<String> {
        self.0.integer_fields()
    }

    fn view_uri(&self, obj: &Self::Obj) -> Option<String> {
        self.0.view_uri(obj)
    }
}

pub struct AdapterBackend<A>(pub A);

impl<A: ModelAdapter> Backend for AdapterBackend<A> {
    type Obj = A::Obj;

    fn fetch(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        key: &str,
    ) -> Result<Option<Self::Obj>, CrudError> {
        Ok(self.0.fetch(ctx, key)?)
    }

    fn search(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        query: &QueryDescriptor,
    ) -> Result<Vec<Self::Obj>, CrudError> {
        Ok(self.0.search(ctx, query)?)
    }

    fn count(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        query: &QueryDescriptor,
    ) -> Result<u64, CrudError> {
        Ok(self.0.count(ctx, query)?)
    }

    fn create(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        obj: &mut Self::Obj,
    ) -> Result<(), CrudError> {
        Ok(self.0.create(ctx, obj)?)
    }

    fn update(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        obj: &mut Self::Obj,
    ) -> Result<(), CrudError> {
        Ok(self.0.update(ctx, obj)?)
    }

    fn delete(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
        obj: &Self::Obj,
    ) -> Result<(), CrudError> {
        Ok(self.0.delete(ctx, obj)?)
    }

    fn make_query(
        &self,
        ctx: &mut RequestContext<Self::Obj>,
    ) -> Option<Result<QueryDescriptor, CrudError>> {
        self.0.make_query(ctx)
    }

    fn make_pager(&self, count: u64, query: &QueryDescriptor) -> Option<Pager> {
        self.0.make_pager(count, query)
    }

    fn integer_fields(&self) -> BTreeSet<String> {
        self.0.integer_fields()
    }

    fn view_uri(&self, obj: &Self::Obj) -> Option<String> {
        self.0.view_uri(obj)
    }
}

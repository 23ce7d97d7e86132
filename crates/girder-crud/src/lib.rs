mod context;
mod controller;
mod envelope;
mod error;
mod form;
mod hooks;
pub mod http;
mod model;

pub use context::{RequestContext, Stash};
pub use controller::{CrudConfig, CrudController};
pub use envelope::{ResultEnvelope, SearchOutcome};
pub use error::{CrudError, ModelError};
pub use form::FormHandler;
pub use hooks::{DefaultHooks, Hooks};
pub use http::CrudHttp;
pub use model::{AdapterBackend, Backend, DirectBackend, Model, ModelAdapter};

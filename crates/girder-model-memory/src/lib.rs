mod form;
mod matching;
mod model;

pub use form::RowForm;
pub use matching::like_match;
pub use model::{MemoryModel, Row};

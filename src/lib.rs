pub mod errors;
pub mod filter;
pub mod models;
pub mod relations;
pub mod routes;
pub mod service;
pub mod traits;

// Re-exported so downstream update models can spell
// `with = "seacrud::serde_with::rust::double_option"` in serde attributes.
pub use serde_with;

pub use errors::ServiceError;
pub use filter::FilterExpr;
pub use relations::Related;
pub use service::{RecordService, Target};
pub use traits::{MergeIntoActiveModel, RecordResource};

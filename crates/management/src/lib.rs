//! Chain persistence and the editor-facing chain endpoints.
//!
//! One chain is stored at a time, as pretty-printed JSON on local disk.

pub mod handlers;
pub mod models;
pub mod router;
pub mod store;

pub use handlers::ManagementState;
pub use models::{ErrorResponse, OkResponse};
pub use router::management_router;
pub use store::ChainStore;

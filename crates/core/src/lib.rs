pub mod config;
pub mod error;
pub mod node;
pub mod time;
pub mod types;

pub use config::AppConfig;
pub use error::{DripError, DripResult};
pub use types::{Chain, Edge, EmailRecord, Node, SimulationContext, Trigger};

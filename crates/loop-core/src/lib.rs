pub mod error;
pub mod links;
pub mod route;
pub mod types;

pub use error::LoopError;
pub use route::{PoolFilters, Route};
pub use types::*;

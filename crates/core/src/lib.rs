pub mod alert;
pub mod config;
pub mod error;
pub mod snapshot;
pub mod store;

pub use alert::*;
pub use config::HeraldConfig;
pub use error::*;
pub use snapshot::*;
pub use store::{MemoryStore, StateStore};

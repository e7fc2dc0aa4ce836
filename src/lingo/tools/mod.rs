pub mod config;
pub mod error;
pub mod flatten;
pub mod hierarchy;
pub mod io;
pub mod model;
pub mod reconcile;
pub mod sync;

pub use error::{Result, ToolError};

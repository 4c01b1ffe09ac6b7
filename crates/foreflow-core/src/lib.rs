pub mod billing;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
mod frame;
pub mod headcount;
pub mod journal;
pub mod schema;
pub mod telemetry;

pub use error::{PipelineError, Result};

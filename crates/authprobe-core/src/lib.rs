pub mod authorize;
pub mod config;
pub mod error;
pub mod remedy;
pub mod result;

pub use error::{ProbeError, Result};

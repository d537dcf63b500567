// Core error definitions shared by every module
pub mod error;

pub use error::{Error, Result};

pub mod config;
pub mod error;
pub mod io;
pub mod paths;
pub mod report;
pub mod sync;
pub mod target;

pub use error::{GuidesError, Result};

pub mod config;
pub mod error;
pub mod extract;
pub mod io;
pub mod mermaid;
pub mod prompt;
pub mod record;
pub mod types;

pub use error::{CompanionError, Result};

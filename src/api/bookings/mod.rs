pub mod endpoints;
pub mod types;

pub use types::*;

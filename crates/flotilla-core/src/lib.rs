pub mod config;
pub mod types;

pub use config::FlotillaConfig;
pub use types::*;

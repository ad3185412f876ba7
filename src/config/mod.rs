mod types;
mod loader;
pub mod defaults;
mod validation;

pub use types::*;
pub use loader::{load_config_str, ConfigFormat};
pub use validation::validate_config;

// Configuration loading

pub mod error;
pub mod registry;
pub mod settings;

pub use error::ConfigError;
pub use registry::SchemaRegistry;
pub use settings::{Period, Settings};

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod registry;
pub mod state;

pub use config::{Config, Settings};
pub use controller::{with_default, Controller};
pub use engine::Expander;
pub use error::{Error, Result};
pub use registry::{Binding, Mode, Registry};
pub use state::ElementState;

/// A fresh configuration with no managed classes.
pub fn new_config() -> Config {
    Config::new()
}

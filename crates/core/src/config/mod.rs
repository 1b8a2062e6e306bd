//! `proxygen.json` configuration

pub mod settings;

pub use settings::{CONFIG_FILE_NAME, Config, MarkerConfig};

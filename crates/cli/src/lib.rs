pub mod cli;
pub mod commands;
pub mod display;

// Re-export commonly used items
pub use cli::{Cargo, CargoCommand, Commands, Proxygen};

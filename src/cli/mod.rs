pub mod commands;
pub mod ui;

pub use commands::GenerateOptions;

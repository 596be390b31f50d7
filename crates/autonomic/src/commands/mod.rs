//! Command dispatch: bridges CLI args -> client / supervisor -> output formatting.

pub mod config_cmd;
pub mod power;
pub mod run;
pub mod zones;

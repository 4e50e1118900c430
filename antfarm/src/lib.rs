pub mod config;
pub mod simulation;

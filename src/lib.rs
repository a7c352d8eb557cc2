pub mod cli;
pub mod config;
pub mod ending;
pub mod events;
pub mod narrative;
pub mod persistence;
pub mod rules;
pub mod simulation;
pub mod world;

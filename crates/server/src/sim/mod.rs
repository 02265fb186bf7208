// crates/server/src/sim/mod.rs
//! Job simulation: synthetic record generation and timed progression.

pub mod engine;
pub mod generator;

pub use engine::EngineRunner;

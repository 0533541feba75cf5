//! Deterministic tile platformer controller with a bevy integration.

pub mod controller;
pub mod level;
pub mod world;

#[cfg(feature = "dev-tools")]
pub mod dev;

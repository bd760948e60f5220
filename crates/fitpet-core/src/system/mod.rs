//! # System Module
//!
//! Stat clamping, stage resolution and progress reporting.
//!
//! Stages are purely visual: they follow the level, but lag one tier behind
//! while the pet waits at an unfinished breakthrough gate. The resolver is
//! pure and deterministic, so every other module calls it instead of
//! assigning a stage.

mod stage;

pub use stage::*;

//! Domain layer: profile data model and the generation flow state machine.

pub mod foundation;
pub mod generation;
pub mod profile;

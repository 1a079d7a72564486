//! FounderLink Core - Profile Generation Flow
//!
//! This crate implements the profile-generation orchestration for the
//! FounderLink networking app: a two-mode flow controller (five-question
//! wizard or conversational refinement) and a gateway over a hosted AI
//! completion service that turns the collected material into a normalized
//! profile card.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

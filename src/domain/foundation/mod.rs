//! Shared value objects and errors used across the domain.

mod errors;
mod timestamp;

pub use errors::DomainError;
pub use timestamp::Timestamp;

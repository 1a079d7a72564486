//! Community roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role a member takes in the FounderLink community.
///
/// Serializes to the exact strings `"Founder"`, `"Investor"`, `"Explorer"` —
/// the enum values declared in the structured-output schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Founder,
    Investor,
    Explorer,
}

impl Role {
    /// All roles, in presentation order.
    pub const ALL: [Role; 3] = [Role::Founder, Role::Investor, Role::Explorer];

    /// Wire name used in prompts and the structured-output schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Founder => "Founder",
            Role::Investor => "Investor",
            Role::Explorer => "Explorer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

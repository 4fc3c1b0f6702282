//! Handler roles.

use std::fmt;

/// The four roles a kind can register handlers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Processor,
    Walker,
    Unbinder,
    Validator,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Processor, Role::Walker, Role::Unbinder, Role::Validator];

    pub fn name(&self) -> &'static str {
        match self {
            Role::Processor => "processor",
            Role::Walker => "walker",
            Role::Unbinder => "unbinder",
            Role::Validator => "validator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Session configuration

use weft_types::{MatchPolicy, NullMatchBehavior, ParameterMatchBehavior};

/// Configuration for a compile session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Run validators after processing
    pub validate: bool,
    /// Cap on processing rounds per batch
    pub max_process_rounds: usize,
    /// Treat a missing back-reference on a live node as an error during unbind
    pub strict_unbind: bool,
    /// What an untyped argument matches during overload resolution
    pub null_match: NullMatchBehavior,
    /// How generic parameters of candidate signatures match
    pub parameter_match: ParameterMatchBehavior,
    /// Extensions enabled beyond the core grammar
    pub extensions: Vec<String>,
    /// Module name written into manifests
    pub module_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            validate: true,
            max_process_rounds: 64,
            strict_unbind: true,
            null_match: NullMatchBehavior::MatchAnything,
            parameter_match: ParameterMatchBehavior::MatchAnything,
            extensions: Vec::new(),
            module_name: "main".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_max_process_rounds(mut self, rounds: usize) -> Self {
        self.max_process_rounds = rounds;
        self
    }

    pub fn with_strict_unbind(mut self, strict: bool) -> Self {
        self.strict_unbind = strict;
        self
    }

    pub fn with_null_match(mut self, behavior: NullMatchBehavior) -> Self {
        self.null_match = behavior;
        self
    }

    pub fn with_parameter_match(mut self, behavior: ParameterMatchBehavior) -> Self {
        self.parameter_match = behavior;
        self
    }

    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.extensions.push(name.into());
        self
    }

    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    /// Processing only: no validators, a small round cap.
    pub fn minimal() -> Self {
        Self {
            validate: false,
            max_process_rounds: 16,
            ..Self::default()
        }
    }

    /// Policy used to resolve function applications.
    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy::new(
            self.null_match,
            self.parameter_match,
            ParameterMatchBehavior::MatchCautiously,
        )
    }
}

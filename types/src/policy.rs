//! Matching policies.

/// What a missing (null) value matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NullMatchBehavior {
    /// Matches, scored as the worst possible match.
    MatchAnything,
    /// Never matches.
    MatchNothing,
    /// Is an error.
    #[default]
    Error,
}

/// How non-concrete types and multiplicities (unbound parameters) match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterMatchBehavior {
    /// A parameter matches anything.
    MatchAnything,
    /// A parameter matches only what every binding of it would match.
    MatchCautiously,
    /// A parameter never matches.
    MatchNothing,
    /// A parameter is an error.
    #[default]
    Error,
}

/// The three policies every match call takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatchPolicy {
    pub null_value: NullMatchBehavior,
    pub target_parameters: ParameterMatchBehavior,
    pub value_parameters: ParameterMatchBehavior,
}

impl MatchPolicy {
    pub fn new(
        null_value: NullMatchBehavior,
        target_parameters: ParameterMatchBehavior,
        value_parameters: ParameterMatchBehavior,
    ) -> Self {
        Self {
            null_value,
            target_parameters,
            value_parameters,
        }
    }

    /// Policy for resolving function applications: optional arguments match
    /// anything, generic parameters match anything, and candidate values are
    /// matched cautiously.
    pub fn overload_resolution() -> Self {
        Self::new(
            NullMatchBehavior::MatchAnything,
            ParameterMatchBehavior::MatchAnything,
            ParameterMatchBehavior::MatchCautiously,
        )
    }

    pub fn with_null_value(mut self, behavior: NullMatchBehavior) -> Self {
        self.null_value = behavior;
        self
    }
}

use std::fmt;

/// Something that can go wrong while assembling or querying a rule-based
/// time zone.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum RuleError {
    /// A rule without any start times was offered as a transition rule.
    RejectedRule,

    /// A third rule with no end year was offered. Only a single alternating
    /// pair of perpetual rules is allowed.
    TooManyFinalRules,

    /// Exactly one perpetual rule is registered, so the transitions after
    /// the last historic rule cannot be computed.
    IncompleteFinalPair,

    /// A date rule was constructed with out-of-range fields.
    InvalidDateRule(&'static str),

    /// The calendar fields do not name a date that can be represented.
    InvalidCalendarFields,
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuleError::RejectedRule => write!(f, "the rule does not have start times"),
            RuleError::TooManyFinalRules => write!(f, "too many final rules"),
            RuleError::IncompleteFinalPair => write!(f, "incomplete final rules"),
            RuleError::InvalidDateRule(s) => write!(f, "invalid date rule: {}", s),
            RuleError::InvalidCalendarFields => {
                write!(f, "calendar fields are out of the supported range")
            }
        }
    }
}

impl std::error::Error for RuleError {}

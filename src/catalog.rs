//! The set of rules a rule-based time zone is built from.

use crate::error::RuleError;
use crate::rule::{InitialRule, Rule, TimeZoneRule};

/// Identifies a rule inside a `Catalog`.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub(crate) enum RuleId {
    Initial,
    Historic(usize),
    Final(usize),
}

/// The rules of one time zone: the initial rule, the historic rules in the
/// order they were added, and up to two perpetual rules.
#[derive(PartialEq, Debug, Clone)]
pub(crate) struct Catalog {
    initial: Rule,
    historic: Vec<Rule>,
    finals: Vec<Rule>,
}

impl Catalog {
    pub(crate) fn new(initial: InitialRule) -> Catalog {
        Catalog {
            initial: initial.into(),
            historic: Vec::new(),
            finals: Vec::with_capacity(2),
        }
    }

    /// Adds a transition rule, routing rules that never end to the final
    /// pair. Nothing changes when an error is returned.
    pub(crate) fn add(&mut self, rule: Rule) -> Result<(), RuleError> {
        if !rule.has_start_times() {
            return Err(RuleError::RejectedRule);
        }

        if rule.is_perpetual() {
            if self.finals.len() == 2 {
                return Err(RuleError::TooManyFinalRules);
            }
            self.finals.push(rule);
        } else {
            self.historic.push(rule);
        }
        Ok(())
    }

    pub(crate) fn rule(&self, id: RuleId) -> &Rule {
        match id {
            RuleId::Initial => &self.initial,
            RuleId::Historic(i) => &self.historic[i],
            RuleId::Final(i) => &self.finals[i],
        }
    }

    pub(crate) fn initial(&self) -> &Rule {
        &self.initial
    }

    pub(crate) fn historic(&self) -> &[Rule] {
        &self.historic
    }

    /// Whether a complete pair of final rules is present. A lone final rule
    /// is an error.
    pub(crate) fn has_final_pair(&self) -> Result<bool, RuleError> {
        match self.finals.len() {
            0 => Ok(false),
            2 => Ok(true),
            _ => Err(RuleError::IncompleteFinalPair),
        }
    }

    /// Every rule: the initial one, then historic rules in insertion order,
    /// then the final rules.
    pub(crate) fn rules(&self) -> impl Iterator<Item = &Rule> {
        std::iter::once(&self.initial)
            .chain(&self.historic)
            .chain(&self.finals)
    }
}

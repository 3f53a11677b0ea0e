//! Generating the transition timeline from a rule catalog.
//!
//! A rule-based time zone does not store its transitions; it only stores
//! rules, each of which knows when it *could* start. Turning those into the
//! list of transitions that actually happen is done here, by simulating the
//! zone forward from the beginning of time:
//!
//! * Start with the initial rule in effect.
//! * Ask every historic rule when it next starts, given the offsets of the
//!   rule currently in effect. The earliest answer wins and becomes the
//!   rule in effect from that instant.
//! * Repeat until no historic rule has any start left.
//!
//! Rules that would not change anything (same name and offsets as the rule
//! in effect) are skipped, so the timeline never contains zero-length
//! transitions. A historic rule that reports no further start is never asked
//! again.
//!
//! The final pair of perpetual rules flips back and forth forever, so only
//! its first two transitions are stored: the switch into the pair, and the
//! first flip within it. Everything after that is computed when queried.
//!
//! ### Ties
//!
//! If two rules start at the same instant, the one registered first wins:
//! historic rules in the order they were added, then the final rules in the
//! order they were added.

use crate::catalog::{Catalog, RuleId};
use crate::error::RuleError;
use crate::rule::{Rule, TimeZoneRule};

/// Stands in for the beginning of time when asking rules for their first
/// start.
const MIN_MILLIS: i64 = i64::MIN;

/// A change from one rule to another.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct Transition<'a> {
    time: i64,
    from: &'a Rule,
    to: &'a Rule,
}

impl<'a> Transition<'a> {
    pub(crate) fn resolve(edge: Edge, catalog: &'a Catalog) -> Transition<'a> {
        Transition {
            time: edge.time,
            from: catalog.rule(edge.from),
            to: catalog.rule(edge.to),
        }
    }

    /// The instant, in milliseconds since the Unix epoch, the new rule
    /// takes effect.
    pub fn time(&self) -> i64 {
        self.time
    }

    /// The rule in effect just before the transition.
    pub fn from(&self) -> &'a Rule {
        self.from
    }

    /// The rule in effect from the transition on.
    pub fn to(&self) -> &'a Rule {
        self.to
    }
}

/// A transition between two rules of a catalog.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub(crate) struct Edge {
    pub(crate) time: i64,
    pub(crate) from: RuleId,
    pub(crate) to: RuleId,
}

/// The materialized transitions of a catalog, strictly increasing in time.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub(crate) struct Timeline {
    pub(crate) edges: Vec<Edge>,

    /// Whether the catalog has a final pair, whose transitions continue
    /// past the last edge.
    pub(crate) perpetual: bool,
}

impl Timeline {
    /// Simulates the catalog forward from the beginning of time.
    ///
    /// Returns an error if the catalog holds exactly one perpetual rule.
    pub(crate) fn build(catalog: &Catalog) -> Result<Timeline, RuleError> {
        let perpetual = catalog.has_final_pair()?;
        debug!(
            "building transitions for {} historic rules (final pair: {})",
            catalog.historic().len(),
            perpetual,
        );

        let mut builder = TimelineBuilder::new(catalog, perpetual);
        builder.add_historic_transitions();
        if perpetual {
            builder.add_final_transitions();
        }

        let timeline = builder.build();
        debug!("built {} transitions", timeline.edges.len());
        Ok(timeline)
    }
}

#[derive(Debug)]
struct TimelineBuilder<'a> {
    catalog: &'a Catalog,
    perpetual: bool,
    edges: Vec<Edge>,
    current: RuleId,
    last_time: i64,
}

impl<'a> TimelineBuilder<'a> {
    fn new(catalog: &'a Catalog, perpetual: bool) -> TimelineBuilder<'a> {
        TimelineBuilder {
            catalog,
            perpetual,
            edges: Vec::new(),
            current: RuleId::Initial,
            last_time: MIN_MILLIS,
        }
    }

    fn current(&self) -> &'a Rule {
        self.catalog.rule(self.current)
    }

    fn push(&mut self, time: i64, to: RuleId) {
        assert!(
            self.edges.is_empty() || time > self.last_time,
            "transition at {} does not follow the one at {}",
            time,
            self.last_time,
        );
        trace!(
            "transition at {}: {} -> {}",
            time,
            self.current().name(),
            self.catalog.rule(to).name(),
        );

        self.edges.push(Edge {
            time,
            from: self.current,
            to,
        });
        self.current = to;
        self.last_time = time;
    }

    /// Picks the earliest start among the given candidates, keeping the
    /// earlier candidate on ties.
    fn earliest(best: Option<(i64, RuleId)>, time: i64, id: RuleId) -> Option<(i64, RuleId)> {
        match best {
            Some((best_time, _)) if best_time <= time => best,
            _ => Some((time, id)),
        }
    }

    fn add_historic_transitions(&mut self) {
        let historic = self.catalog.historic();
        let mut exhausted = vec![false; historic.len()];

        loop {
            let current = self.current();
            let (raw, dst) = (current.raw_offset(), current.dst_savings());

            let mut next = None;
            for (i, rule) in historic.iter().enumerate() {
                let id = RuleId::Historic(i);
                if exhausted[i] || id == self.current || rule.is_equivalent_to(current) {
                    continue;
                }

                match rule.next_start_after(self.last_time, raw, dst, false) {
                    Some(time) => next = Self::earliest(next, time, id),
                    None => exhausted[i] = true,
                }
            }

            let Some(mut next) = next else {
                break;
            };

            if self.perpetual {
                for i in 0..2 {
                    let id = RuleId::Final(i);
                    if id == self.current {
                        continue;
                    }
                    if let Some(time) =
                        self.catalog
                            .rule(id)
                            .next_start_after(self.last_time, raw, dst, false)
                    {
                        if time < next.0 {
                            next = (time, id);
                        }
                    }
                }
            }

            self.push(next.0, next.1);
        }
    }

    /// Appends the switch into the final pair, then the first flip within
    /// it. If a final rule is already in effect, only the other one can be
    /// switched into.
    fn add_final_transitions(&mut self) {
        let current = self.current();
        let (raw, dst) = (current.raw_offset(), current.dst_savings());

        let mut entry = None;
        for i in 0..2 {
            let id = RuleId::Final(i);
            if id == self.current {
                continue;
            }
            if let Some(time) = self
                .catalog
                .rule(id)
                .next_start_after(self.last_time, raw, dst, false)
            {
                entry = Self::earliest(entry, time, id);
            }
        }

        let Some((time, entered)) = entry else {
            panic!(
                "final rules have no start after {} under {}",
                self.last_time,
                current.name(),
            );
        };
        self.push(time, entered);

        let other = match entered {
            RuleId::Final(0) => RuleId::Final(1),
            _ => RuleId::Final(0),
        };
        let entered_rule = self.catalog.rule(entered);
        let flip = self.catalog.rule(other).next_start_after(
            time,
            entered_rule.raw_offset(),
            entered_rule.dst_savings(),
            false,
        );
        match flip {
            Some(flip) => self.push(flip, other),
            None => panic!(
                "final rule {} has no start after {}",
                self.catalog.rule(other).name(),
                time,
            ),
        }
    }

    fn build(self) -> Timeline {
        Timeline {
            edges: self.edges,
            perpetual: self.perpetual,
        }
    }
}

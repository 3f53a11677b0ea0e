//! Answering offset and transition queries from a built timeline.
//!
//! Within the stored transitions a query is a scan for the nearest entry.
//! Past the last stored transition, a zone with a final pair keeps flipping
//! between its two perpetual rules; those flips are computed from the rules
//! themselves. Each final rule starts from the other's offsets, so the other
//! rule serves as its basis.

use crate::catalog::{Catalog, RuleId};
use crate::rule::TimeZoneRule;
use crate::transitions::{Edge, Timeline};

const FINAL_0: RuleId = RuleId::Final(0);
const FINAL_1: RuleId = RuleId::Final(1);

impl Edge {
    /// The instant this edge takes place at. For local lookups that is the
    /// wall clock time shown by the rule in effect *before* the edge.
    fn boundary(&self, catalog: &Catalog, local: bool) -> i64 {
        if local {
            self.time.saturating_add(catalog.rule(self.from).total_offset())
        } else {
            self.time
        }
    }
}

impl Timeline {
    /// Finds the rule in effect at `time`, read as UTC or, if `local`, as
    /// wall clock time.
    pub(crate) fn rule_at(&self, catalog: &Catalog, time: i64, local: bool) -> RuleId {
        let (Some(first), Some(last)) = (self.edges.first(), self.edges.last()) else {
            return RuleId::Initial;
        };

        if time < first.boundary(catalog, local) {
            return RuleId::Initial;
        }

        if time > last.boundary(catalog, local) {
            return if self.perpetual {
                self.rule_in_final(catalog, time, local)
            } else {
                last.to
            };
        }

        self.edges
            .iter()
            .rev()
            .find(|edge| edge.boundary(catalog, local) <= time)
            .map_or(RuleId::Initial, |edge| edge.to)
    }

    /// Of the two final rules, the one that started most recently. Equal
    /// starts go to the first one.
    fn rule_in_final(&self, catalog: &Catalog, time: i64, local: bool) -> RuleId {
        let (rule0, rule1) = (catalog.rule(FINAL_0), catalog.rule(FINAL_1));

        let base = if local {
            time.saturating_sub(rule1.total_offset())
        } else {
            time
        };
        let start0 =
            rule0.previous_start_before(base, rule1.raw_offset(), rule1.dst_savings(), true);

        let base = if local {
            time.saturating_sub(rule0.total_offset())
        } else {
            time
        };
        let start1 =
            rule1.previous_start_before(base, rule0.raw_offset(), rule0.dst_savings(), true);

        if start0 >= start1 {
            FINAL_0
        } else {
            FINAL_1
        }
    }

    /// The first transition after `base`, or at `base` if `inclusive`.
    pub(crate) fn next_edge(&self, catalog: &Catalog, base: i64, inclusive: bool) -> Option<Edge> {
        let found = self
            .edges
            .iter()
            .find(|edge| edge.time > base || (inclusive && edge.time == base));

        match found {
            Some(edge) => Some(*edge),
            None if self.perpetual => Self::next_in_final(catalog, base, inclusive),
            None => None,
        }
    }

    /// The last transition before `base`, or at `base` if `inclusive`.
    pub(crate) fn previous_edge(
        &self,
        catalog: &Catalog,
        base: i64,
        inclusive: bool,
    ) -> Option<Edge> {
        let index = self
            .edges
            .iter()
            .rposition(|edge| edge.time < base || (inclusive && edge.time == base))?;
        let edge = self.edges[index];

        if self.perpetual && index == self.edges.len() - 1 && edge.time < base {
            return Self::previous_in_final(catalog, base, inclusive).or(Some(edge));
        }
        Some(edge)
    }

    fn next_in_final(catalog: &Catalog, base: i64, inclusive: bool) -> Option<Edge> {
        let (rule0, rule1) = (catalog.rule(FINAL_0), catalog.rule(FINAL_1));

        let edge0 = rule0
            .next_start_after(base, rule1.raw_offset(), rule1.dst_savings(), inclusive)
            .map(|time| Edge {
                time,
                from: FINAL_1,
                to: FINAL_0,
            });
        let edge1 = rule1
            .next_start_after(base, rule0.raw_offset(), rule0.dst_savings(), inclusive)
            .map(|time| Edge {
                time,
                from: FINAL_0,
                to: FINAL_1,
            });

        match (edge0, edge1) {
            (Some(edge0), Some(edge1)) if edge1.time < edge0.time => Some(edge1),
            (edge0, edge1) => edge0.or(edge1),
        }
    }

    fn previous_in_final(catalog: &Catalog, base: i64, inclusive: bool) -> Option<Edge> {
        let (rule0, rule1) = (catalog.rule(FINAL_0), catalog.rule(FINAL_1));

        let edge0 = rule0
            .previous_start_before(base, rule1.raw_offset(), rule1.dst_savings(), inclusive)
            .map(|time| Edge {
                time,
                from: FINAL_1,
                to: FINAL_0,
            });
        let edge1 = rule1
            .previous_start_before(base, rule0.raw_offset(), rule0.dst_savings(), inclusive)
            .map(|time| Edge {
                time,
                from: FINAL_0,
                to: FINAL_1,
            });

        match (edge0, edge1) {
            (Some(edge0), Some(edge1)) if edge1.time > edge0.time => Some(edge1),
            (edge0, edge1) => edge0.or(edge1),
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::Month;

    use super::*;
    use crate::calendar::{fields_to_millis, MILLIS_PER_HOUR};
    use crate::rule::{AnnualRule, DateTimeRule, DaySpec, InitialRule, TimeArrayRule, TimeType};

    const HOUR: i64 = MILLIS_PER_HOUR;

    fn two_steps() -> (Catalog, Timeline) {
        let mut catalog = Catalog::new(InitialRule::new("A", 0, 0));
        catalog
            .add(TimeArrayRule::new("B", HOUR, 0, vec![10 * HOUR], TimeType::Utc).into())
            .unwrap();
        catalog
            .add(TimeArrayRule::new("C", 2 * HOUR, 0, vec![20 * HOUR], TimeType::Utc).into())
            .unwrap();
        let timeline = Timeline::build(&catalog).unwrap();
        (catalog, timeline)
    }

    #[test]
    fn utc_lookup() {
        let (catalog, timeline) = two_steps();
        let at = |t| timeline.rule_at(&catalog, t, false);

        assert_eq!(at(i64::MIN), RuleId::Initial);
        assert_eq!(at(10 * HOUR - 1), RuleId::Initial);
        assert_eq!(at(10 * HOUR), RuleId::Historic(0));
        assert_eq!(at(20 * HOUR - 1), RuleId::Historic(0));
        assert_eq!(at(20 * HOUR), RuleId::Historic(1));
        assert_eq!(at(i64::MAX), RuleId::Historic(1));
    }

    #[test]
    fn local_lookup_uses_offset_before_the_edge() {
        let (catalog, timeline) = two_steps();
        let at = |t| timeline.rule_at(&catalog, t, true);

        // Local boundaries sit at 10h and 21h.
        assert_eq!(at(10 * HOUR), RuleId::Historic(0));
        assert_eq!(at(21 * HOUR - 1), RuleId::Historic(0));
        assert_eq!(at(21 * HOUR), RuleId::Historic(1));
    }

    #[test]
    fn local_boundary_near_the_end_of_time() {
        let mut catalog = Catalog::new(InitialRule::new("A", HOUR, 0));
        let late = TimeArrayRule::new("B", 2 * HOUR, 0, vec![i64::MAX - 1000], TimeType::Utc);
        catalog.add(late.into()).unwrap();
        let timeline = Timeline::build(&catalog).unwrap();

        assert_eq!(timeline.rule_at(&catalog, 0, false), RuleId::Initial);
        assert_eq!(timeline.rule_at(&catalog, 0, true), RuleId::Initial);
        assert_eq!(timeline.rule_at(&catalog, i64::MAX - 1, true), RuleId::Initial);
    }

    #[test]
    fn simultaneous_final_starts_go_to_the_first_rule() {
        let new_year = DateTimeRule::new(
            Month::January,
            DaySpec::DayOfMonth(1),
            0,
            TimeType::Utc,
        )
        .unwrap();
        let mut catalog = Catalog::new(InitialRule::new("X", 0, 0));
        for (name, dst) in [("A", 0), ("B", HOUR)] {
            let rule = AnnualRule::new(name, 0, dst, new_year, 2000, None).unwrap();
            catalog.add(rule.into()).unwrap();
        }
        let timeline = Timeline::build(&catalog).unwrap();

        let mid_year = fields_to_millis(2005, 6, 1, 0).unwrap();
        assert!(mid_year > timeline.edges[timeline.edges.len() - 1].time);
        assert_eq!(timeline.rule_at(&catalog, mid_year, false), FINAL_0);
        assert_eq!(timeline.rule_at(&catalog, mid_year, true), FINAL_0);

        let previous = timeline.previous_edge(&catalog, mid_year, false).unwrap();
        assert_eq!(previous.time, fields_to_millis(2005, 1, 1, 0).unwrap());
        assert_eq!(previous.to, FINAL_0);
        let next = timeline.next_edge(&catalog, mid_year, false).unwrap();
        assert_eq!(next.to, FINAL_0);
    }

    #[test]
    fn edges_around_base() {
        let (catalog, timeline) = two_steps();

        let next = timeline.next_edge(&catalog, 10 * HOUR, false).unwrap();
        assert_eq!(next.time, 20 * HOUR);
        let next = timeline.next_edge(&catalog, 10 * HOUR, true).unwrap();
        assert_eq!(next.time, 10 * HOUR);
        assert_eq!(timeline.next_edge(&catalog, 20 * HOUR, false), None);

        let previous = timeline.previous_edge(&catalog, 20 * HOUR, false).unwrap();
        assert_eq!(previous.time, 10 * HOUR);
        let previous = timeline.previous_edge(&catalog, 20 * HOUR, true).unwrap();
        assert_eq!(previous.time, 20 * HOUR);
        assert_eq!(timeline.previous_edge(&catalog, 10 * HOUR, false), None);
    }
}

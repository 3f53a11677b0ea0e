use std::cell::OnceCell;
use std::sync::Arc;

use crate::calendar;
use crate::catalog::{Catalog, RuleId};
use crate::error::RuleError;
use crate::rule::{InitialRule, Rule, TimeZoneRule};
use crate::transitions::{Timeline, Transition};

/// The two components of a UTC offset, in milliseconds.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct ZoneOffset {
    /// The standard offset from UTC.
    pub raw_offset: i64,
    /// The additional daylight saving offset; zero outside daylight time.
    pub dst_savings: i64,
}

impl ZoneOffset {
    pub(crate) fn of(rule: &Rule) -> ZoneOffset {
        ZoneOffset {
            raw_offset: rule.raw_offset(),
            dst_savings: rule.dst_savings(),
        }
    }

    /// The total offset from UTC.
    pub fn total(&self) -> i64 {
        self.raw_offset + self.dst_savings
    }

    pub fn is_daylight(&self) -> bool {
        self.dst_savings != 0
    }
}

/// A time zone defined by a user assembled set of transition rules.
///
/// The zone starts out with only its initial rule; further rules are added
/// with [`add_transition_rule`](Self::add_transition_rule). The transitions
/// these rules produce are computed the first time the zone is queried and
/// cached until another rule is added.
///
/// Because of that cache a `RuleBasedTimeZone` is not `Sync`. To share a
/// zone between threads, [`freeze`](Self::freeze) it once all its rules are
/// in place.
///
/// ```
/// use chrono::{Month, Weekday};
/// use chrono_rbtz::{
///     AnnualRule, DateTimeRule, DaySpec, InitialRule, RuleBasedTimeZone, TimeType, TimeZoneRule,
/// };
///
/// const HOUR: i64 = 60 * 60 * 1000;
///
/// let mut zone = RuleBasedTimeZone::new("Custom/Berlin", InitialRule::new("CET", HOUR, 0));
///
/// let summer = DateTimeRule::new(
///     Month::March,
///     DaySpec::NthWeekday(-1, Weekday::Sun),
///     HOUR,
///     TimeType::Utc,
/// )?;
/// let winter = DateTimeRule::new(
///     Month::October,
///     DaySpec::NthWeekday(-1, Weekday::Sun),
///     HOUR,
///     TimeType::Utc,
/// )?;
/// zone.add_transition_rule(AnnualRule::new("CEST", HOUR, HOUR, summer, 1996, None)?)?;
/// zone.add_transition_rule(AnnualRule::new("CET", HOUR, 0, winter, 1996, None)?)?;
///
/// // 2021-07-01T00:00:00Z
/// let july = 1_625_097_600_000;
/// assert_eq!(zone.offset_at(july, false).total(), 2 * HOUR);
/// assert!(zone.is_daylight_at(july));
///
/// let next = zone.next_transition(july, false).unwrap();
/// assert_eq!(next.to().name(), "CET");
/// # Ok::<(), chrono_rbtz::RuleError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RuleBasedTimeZone {
    id: String,
    catalog: Catalog,
    timeline: OnceCell<Timeline>,
    #[cfg(test)]
    rebuilds: std::cell::Cell<usize>,
}

impl RuleBasedTimeZone {
    pub fn new(id: impl Into<String>, initial_rule: InitialRule) -> RuleBasedTimeZone {
        RuleBasedTimeZone {
            id: id.into(),
            catalog: Catalog::new(initial_rule),
            timeline: OnceCell::new(),
            #[cfg(test)]
            rebuilds: std::cell::Cell::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn initial_rule(&self) -> &Rule {
        self.catalog.initial()
    }

    /// Every rule of this zone: the initial rule, then the historic rules
    /// in the order they were added, then the final rules.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.catalog.rules()
    }

    /// Adds a rule describing transitions.
    ///
    /// Returns an error if the rule has no start times, or if it is a third
    /// rule without an end year. The zone is unchanged when an error is
    /// returned.
    pub fn add_transition_rule(&mut self, rule: impl Into<Rule>) -> Result<(), RuleError> {
        self.catalog.add(rule.into())?;
        self.timeline = OnceCell::new();
        Ok(())
    }

    /// Returns the transitions, building them first if any rule was added
    /// since the last query.
    fn try_timeline(&self) -> Result<&Timeline, RuleError> {
        if let Some(timeline) = self.timeline.get() {
            return Ok(timeline);
        }

        let timeline = Timeline::build(&self.catalog)?;
        #[cfg(test)]
        self.rebuilds.set(self.rebuilds.get() + 1);
        Ok(self.timeline.get_or_init(|| timeline))
    }

    // Panics on an incomplete final pair.
    fn timeline(&self) -> &Timeline {
        match self.try_timeline() {
            Ok(timeline) => timeline,
            Err(err) => panic!("time zone {}: {}", self.id, err),
        }
    }

    /// Returns the offsets in effect at `time`, in milliseconds since the
    /// Unix epoch. If `local` is set, `time` is read as a wall clock time
    /// of this zone rather than as UTC.
    ///
    /// # Panics
    ///
    /// Panics if exactly one rule without an end year was added.
    pub fn offset_at(&self, time: i64, local: bool) -> ZoneOffset {
        let id = self.timeline().rule_at(&self.catalog, time, local);
        ZoneOffset::of(self.catalog.rule(id))
    }

    /// Like [`offset_at`](Self::offset_at), but reports an incomplete final
    /// pair as an error instead of panicking.
    pub fn try_offset_at(&self, time: i64, local: bool) -> Result<ZoneOffset, RuleError> {
        let id = self.try_timeline()?.rule_at(&self.catalog, time, local);
        Ok(ZoneOffset::of(self.catalog.rule(id)))
    }

    /// Returns the total offset in effect at the given wall clock date and
    /// time of day. The year is an extended year, so 0 is 1 BC.
    pub fn offset_at_fields(
        &self,
        year: i32,
        month: u32,
        day: u32,
        millis_in_day: i64,
    ) -> Result<i64, RuleError> {
        let time = calendar::fields_to_millis(year, month, day, millis_in_day)
            .ok_or(RuleError::InvalidCalendarFields)?;
        Ok(self.try_offset_at(time, true)?.total())
    }

    pub fn is_daylight_at(&self, time: i64) -> bool {
        self.offset_at(time, false).is_daylight()
    }

    /// The first transition after `base`, or at `base` if `inclusive`.
    ///
    /// Transitions are only searched by UTC instant; there is no wall clock
    /// variant of this query.
    pub fn next_transition(&self, base: i64, inclusive: bool) -> Option<Transition<'_>> {
        self.timeline()
            .next_edge(&self.catalog, base, inclusive)
            .map(|edge| Transition::resolve(edge, &self.catalog))
    }

    /// The last transition before `base`, or at `base` if `inclusive`.
    pub fn previous_transition(&self, base: i64, inclusive: bool) -> Option<Transition<'_>> {
        self.timeline()
            .previous_edge(&self.catalog, base, inclusive)
            .map(|edge| Transition::resolve(edge, &self.catalog))
    }

    /// Whether daylight saving time is in effect at `now`, or on either
    /// side of the next transition.
    pub fn uses_daylight_time_soon(&self, now: i64) -> bool {
        uses_daylight_time_soon(
            self.is_daylight_at(now),
            self.next_transition(now, false),
        )
    }

    /// Builds the transitions and turns this zone into an immutable one
    /// that can be shared freely.
    ///
    /// Returns an error if exactly one rule without an end year was added.
    pub fn freeze(self) -> Result<FrozenTimeZone, RuleError> {
        let timeline = match self.timeline.into_inner() {
            Some(timeline) => timeline,
            None => Timeline::build(&self.catalog)?,
        };

        Ok(FrozenTimeZone {
            inner: Arc::new(Frozen {
                id: self.id,
                catalog: self.catalog,
                timeline,
            }),
        })
    }
}

fn uses_daylight_time_soon(daylight_now: bool, next: Option<Transition<'_>>) -> bool {
    daylight_now
        || next.map_or(false, |transition| {
            transition.from().dst_savings() != 0 || transition.to().dst_savings() != 0
        })
}

#[derive(Debug)]
struct Frozen {
    id: String,
    catalog: Catalog,
    timeline: Timeline,
}

/// A rule-based time zone whose rules can no longer change.
///
/// Clones share the same rules and transitions. This is the type that
/// implements [`chrono::TimeZone`].
#[derive(Debug, Clone)]
pub struct FrozenTimeZone {
    inner: Arc<Frozen>,
}

impl FrozenTimeZone {
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn initial_rule(&self) -> &Rule {
        self.inner.catalog.initial()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.inner.catalog.rules()
    }

    pub(crate) fn rule_at(&self, time: i64, local: bool) -> RuleId {
        self.inner
            .timeline
            .rule_at(&self.inner.catalog, time, local)
    }

    pub(crate) fn rule(&self, id: RuleId) -> &Rule {
        self.inner.catalog.rule(id)
    }

    /// See [`RuleBasedTimeZone::offset_at`].
    pub fn offset_at(&self, time: i64, local: bool) -> ZoneOffset {
        ZoneOffset::of(self.rule(self.rule_at(time, local)))
    }

    pub fn is_daylight_at(&self, time: i64) -> bool {
        self.offset_at(time, false).is_daylight()
    }

    pub fn next_transition(&self, base: i64, inclusive: bool) -> Option<Transition<'_>> {
        let Frozen {
            catalog, timeline, ..
        } = &*self.inner;
        timeline
            .next_edge(catalog, base, inclusive)
            .map(|edge| Transition::resolve(edge, catalog))
    }

    pub fn previous_transition(&self, base: i64, inclusive: bool) -> Option<Transition<'_>> {
        let Frozen {
            catalog, timeline, ..
        } = &*self.inner;
        timeline
            .previous_edge(catalog, base, inclusive)
            .map(|edge| Transition::resolve(edge, catalog))
    }

    pub fn uses_daylight_time_soon(&self, now: i64) -> bool {
        uses_daylight_time_soon(
            self.is_daylight_at(now),
            self.next_transition(now, false),
        )
    }

    /// Whether both handles share the same rules.
    pub fn ptr_eq(&self, other: &FrozenTimeZone) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

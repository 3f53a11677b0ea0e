use core::fmt::{Debug, Display, Error, Formatter};

use chrono::{Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use crate::calendar::MILLIS_PER_DAY;
use crate::catalog::RuleId;
use crate::rule::{Rule, TimeZoneRule};
use crate::timezone::FrozenTimeZone;

/// The offset of a [`FrozenTimeZone`] at some instant: the zone, together
/// with the rule in effect.
#[derive(Clone)]
pub struct RuleOffset {
    zone: FrozenTimeZone,
    rule: RuleId,
}

/// Detailed timezone offset components that expose any special conditions
/// currently in effect.
///
/// ```
/// use chrono::{Duration, Month, Offset, TimeZone, Weekday};
/// use chrono_rbtz::{
///     AnnualRule, DateTimeRule, DaySpec, InitialRule, OffsetComponents, RuleBasedTimeZone,
///     TimeType,
/// };
///
/// const HOUR: i64 = 60 * 60 * 1000;
/// let last_sunday = DaySpec::NthWeekday(-1, Weekday::Sun);
///
/// let mut zone = RuleBasedTimeZone::new("Custom/London", InitialRule::new("GMT", 0, 0));
/// let summer = DateTimeRule::new(Month::March, last_sunday, HOUR, TimeType::Utc)?;
/// let winter = DateTimeRule::new(Month::October, last_sunday, HOUR, TimeType::Utc)?;
/// zone.add_transition_rule(AnnualRule::new("BST", 0, HOUR, summer, 1996, None)?)?;
/// zone.add_transition_rule(AnnualRule::new("GMT", 0, 0, winter, 1996, None)?)?;
/// let london = zone.freeze()?;
///
/// let summer_time = london.with_ymd_and_hms(2016, 5, 10, 12, 0, 0).unwrap();
/// assert_eq!(summer_time.offset().base_utc_offset(), Duration::hours(0));
/// assert_eq!(summer_time.offset().dst_offset(), Duration::hours(1));
/// assert_eq!(summer_time.offset().fix().local_minus_utc(), 3600);
/// # Ok::<(), chrono_rbtz::RuleError>(())
/// ```
pub trait OffsetComponents {
    /// The base offset from UTC.
    fn base_utc_offset(&self) -> Duration;
    /// The additional offset from UTC that is currently in effect; typically for daylight
    /// saving time.
    fn dst_offset(&self) -> Duration;
}

/// Timezone offset name information.
pub trait OffsetName {
    /// The identifier the zone was created with.
    fn tz_id(&self) -> &str;
    /// The name of the rule in effect, such as `EST` or `EDT`.
    fn abbreviation(&self) -> &str;
}

impl RuleOffset {
    fn new(zone: &FrozenTimeZone, rule: RuleId) -> RuleOffset {
        RuleOffset {
            zone: zone.clone(),
            rule,
        }
    }

    /// The rule in effect.
    pub fn rule(&self) -> &Rule {
        self.zone.rule(self.rule)
    }
}

impl OffsetComponents for RuleOffset {
    fn base_utc_offset(&self) -> Duration {
        Duration::milliseconds(self.rule().raw_offset())
    }

    fn dst_offset(&self) -> Duration {
        Duration::milliseconds(self.rule().dst_savings())
    }
}

impl OffsetName for RuleOffset {
    fn tz_id(&self) -> &str {
        self.zone.id()
    }

    fn abbreviation(&self) -> &str {
        self.rule().name()
    }
}

impl Offset for RuleOffset {
    /// Sub-second parts of the offset are truncated; offsets of a day or
    /// more are clamped to just under a day.
    fn fix(&self) -> FixedOffset {
        let seconds = (self.rule().total_offset() / 1000).clamp(-86_399, 86_399) as i32;
        FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
    }
}

impl PartialEq for RuleOffset {
    fn eq(&self, other: &RuleOffset) -> bool {
        self.zone.ptr_eq(&other.zone) && self.rule == other.rule
    }
}

impl Eq for RuleOffset {}

impl Display for RuleOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.rule().name())
    }
}

impl Debug for RuleOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.rule().name())
    }
}

impl FrozenTimeZone {
    /// The offset in effect at a UTC instant.
    pub fn offset_at_instant(&self, time: i64) -> RuleOffset {
        RuleOffset::new(self, self.rule_at(time, false))
    }

    /// Resolves a wall clock time, in milliseconds, against the offsets in
    /// effect a day before and a day after it.
    ///
    /// An offset is valid for `wall` if it is the offset in effect at
    /// `wall - offset`. A wall time in a gap has no valid offset; one in an
    /// overlap has two, returned earliest instant first. This assumes
    /// transitions are more than a day apart.
    fn offset_from_wall_millis(&self, wall: i64) -> LocalResult<RuleOffset> {
        let resolve = |probe: i64| {
            let offset = self.rule(self.rule_at(probe, false)).total_offset();
            let utc = wall.saturating_sub(offset);
            let actual = self.rule_at(utc, false);
            (self.rule(actual).total_offset() == offset).then_some((utc, actual))
        };

        let before = resolve(wall.saturating_sub(MILLIS_PER_DAY));
        let after = resolve(wall.saturating_add(MILLIS_PER_DAY));

        match (before, after) {
            (Some(a), Some(b)) if a.0 != b.0 => {
                let (earlier, later) = if a.0 < b.0 { (a, b) } else { (b, a) };
                LocalResult::Ambiguous(
                    RuleOffset::new(self, earlier.1),
                    RuleOffset::new(self, later.1),
                )
            }
            (Some((_, rule)), _) | (_, Some((_, rule))) => {
                LocalResult::Single(RuleOffset::new(self, rule))
            }
            (None, None) => LocalResult::None,
        }
    }
}

impl TimeZone for FrozenTimeZone {
    type Offset = RuleOffset;

    fn from_offset(offset: &Self::Offset) -> Self {
        offset.zone.clone()
    }

    #[allow(deprecated)]
    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<Self::Offset> {
        let midnight = local.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis();
        let earliest = self.offset_from_wall_millis(midnight);
        let latest = self.offset_from_wall_millis(midnight + MILLIS_PER_DAY - 1000);

        // A date only needs some offset that occurs on that day, so prefer
        // a single answer over an ambiguous one.
        use chrono::LocalResult::*;
        match (earliest, latest) {
            (result @ Single(_), _) => result,
            (_, result @ Single(_)) => result,
            (Ambiguous(offset, _), _) => Single(offset),
            (_, Ambiguous(offset, _)) => Single(offset),
            (None, None) => None,
        }
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<Self::Offset> {
        self.offset_from_wall_millis(local.and_utc().timestamp_millis())
    }

    #[allow(deprecated)]
    fn offset_from_utc_date(&self, utc: &NaiveDate) -> Self::Offset {
        self.offset_from_utc_datetime(&utc.and_time(chrono::NaiveTime::MIN))
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> Self::Offset {
        self.offset_at_instant(utc.and_utc().timestamp_millis())
    }
}

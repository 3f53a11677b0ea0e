//! Transition rules: the building blocks a rule-based time zone is
//! assembled from.
//!
//! Every rule carries a name, a standard offset from UTC and an amount of
//! daylight saving time, all offsets in milliseconds. Rules other than the
//! initial one also know *when* they start: either once a year according to
//! a `DateTimeRule`, or at an explicit list of instants.
//!
//! A start time written in a rule is usually expressed in local time, so
//! converting it to an instant requires the offsets of whichever rule was in
//! effect just before it. This is why the start-time methods all take that
//! *basis* (the previous raw offset and DST savings) as arguments.

use chrono::{Month, Weekday};

use crate::calendar::{self, MILLIS_PER_DAY};
use crate::error::RuleError;

/// The capability every transition rule exposes.
pub trait TimeZoneRule {
    /// The display name of this rule, such as `EST` or `EDT`.
    fn name(&self) -> &str;

    /// The standard offset from UTC, in milliseconds.
    fn raw_offset(&self) -> i64;

    /// The additional daylight saving offset, in milliseconds. Zero means
    /// the rule describes standard time.
    fn dst_savings(&self) -> i64;

    /// Whether this rule has any start times at all.
    fn has_start_times(&self) -> bool;

    /// Whether this rule keeps starting forever.
    fn is_perpetual(&self) -> bool {
        false
    }

    /// The very first instant this rule takes effect.
    fn first_start(&self, prev_raw_offset: i64, prev_dst_savings: i64) -> Option<i64>;

    /// The very last instant this rule takes effect, or `None` if it never
    /// stops (or never starts).
    fn final_start(&self, prev_raw_offset: i64, prev_dst_savings: i64) -> Option<i64>;

    /// The first start strictly after `base` (or at `base`, when
    /// `inclusive`).
    fn next_start_after(
        &self,
        base: i64,
        prev_raw_offset: i64,
        prev_dst_savings: i64,
        inclusive: bool,
    ) -> Option<i64>;

    /// The last start strictly before `base` (or at `base`, when
    /// `inclusive`).
    fn previous_start_before(
        &self,
        base: i64,
        prev_raw_offset: i64,
        prev_dst_savings: i64,
        inclusive: bool,
    ) -> Option<i64>;

    /// The total offset from UTC while this rule is in effect.
    fn total_offset(&self) -> i64 {
        self.raw_offset() + self.dst_savings()
    }

    /// Two rules are equivalent when switching from one to the other would
    /// not change anything observable.
    fn is_equivalent_to(&self, other: &dyn TimeZoneRule) -> bool {
        self.name() == other.name()
            && self.raw_offset() == other.raw_offset()
            && self.dst_savings() == other.dst_savings()
    }
}

/// How the time of day in a rule is to be read.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum TimeType {
    /// Local wall clock time, including any daylight saving in effect.
    Wall,
    /// Local standard time, ignoring daylight saving.
    Standard,
    /// Universal time.
    Utc,
}

impl TimeType {
    /// Converts a time of this type to UTC, given the offsets in effect
    /// just before it.
    pub fn to_utc(self, time: i64, prev_raw_offset: i64, prev_dst_savings: i64) -> i64 {
        match self {
            TimeType::Wall => time
                .saturating_sub(prev_raw_offset)
                .saturating_sub(prev_dst_savings),
            TimeType::Standard => time.saturating_sub(prev_raw_offset),
            TimeType::Utc => time,
        }
    }
}

/// A **day** inside a month, given either absolutely or relative to a
/// weekday.
///
/// Days that overflow the month, such as “the first Sunday on or after the
/// 30th of February”, roll over into the neighbouring month.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub enum DaySpec {
    /// A specific day of the month, given by its number.
    DayOfMonth(u32),
    /// The nth occurrence of a weekday in the month. Negative values count
    /// from the end of the month, so `-1` is the last one.
    NthWeekday(i8, Weekday),
    /// The first day with the given weekday on or after a day of the month.
    WeekdayOnOrAfter(Weekday, u32),
    /// The last day with the given weekday on or before a day of the month.
    WeekdayOnOrBefore(Weekday, u32),
}

impl DaySpec {
    fn validate(&self) -> Result<(), RuleError> {
        match *self {
            DaySpec::DayOfMonth(day)
            | DaySpec::WeekdayOnOrAfter(_, day)
            | DaySpec::WeekdayOnOrBefore(_, day)
                if !(1..=31).contains(&day) =>
            {
                Err(RuleError::InvalidDateRule("day of month out of range"))
            }
            DaySpec::NthWeekday(n, _) if n == 0 || !(-5..=5).contains(&n) => {
                Err(RuleError::InvalidDateRule("week in month out of range"))
            }
            _ => Ok(()),
        }
    }

    /// Converts this day specification to an epoch day in the given year
    /// and month.
    pub fn to_epoch_day(&self, year: i32, month: Month) -> Option<i64> {
        let month = month.number_from_month();
        let first = calendar::fields_to_day(year, month, 1)?;
        let length = calendar::days_in_month(year, month)?;

        Some(match *self {
            DaySpec::DayOfMonth(day) => first + i64::from(day) - 1,
            DaySpec::NthWeekday(n, weekday) if n > 0 => {
                let wanted = weekday.num_days_from_monday();
                let ahead = (wanted + 7 - calendar::weekday_of(first)) % 7;
                first + i64::from(ahead) + 7 * (i64::from(n) - 1)
            }
            DaySpec::NthWeekday(n, weekday) => {
                let last = first + length - 1;
                let wanted = weekday.num_days_from_monday();
                let behind = (calendar::weekday_of(last) + 7 - wanted) % 7;
                last - i64::from(behind) - 7 * (-i64::from(n) - 1)
            }
            DaySpec::WeekdayOnOrAfter(weekday, day) => {
                let from = first + i64::from(day) - 1;
                let wanted = weekday.num_days_from_monday();
                from + i64::from((wanted + 7 - calendar::weekday_of(from)) % 7)
            }
            DaySpec::WeekdayOnOrBefore(weekday, day) => {
                let from = first + i64::from(day) - 1;
                let wanted = weekday.num_days_from_monday();
                from - i64::from((calendar::weekday_of(from) + 7 - wanted) % 7)
            }
        })
    }
}

/// The date and time of day an annual rule starts at.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub struct DateTimeRule {
    month: Month,
    day: DaySpec,
    millis_in_day: i64,
    time_type: TimeType,
}

impl DateTimeRule {
    /// Returns an error if the day specification is out of range, or the
    /// time of day falls outside `0..=24h`.
    pub fn new(
        month: Month,
        day: DaySpec,
        millis_in_day: i64,
        time_type: TimeType,
    ) -> Result<DateTimeRule, RuleError> {
        day.validate()?;
        if !(0..=MILLIS_PER_DAY).contains(&millis_in_day) {
            return Err(RuleError::InvalidDateRule("time of day out of range"));
        }

        Ok(DateTimeRule {
            month,
            day,
            millis_in_day,
            time_type,
        })
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn day(&self) -> DaySpec {
        self.day
    }

    pub fn millis_in_day(&self) -> i64 {
        self.millis_in_day
    }

    pub fn time_type(&self) -> TimeType {
        self.time_type
    }

    /// The instant this rule fires at in the given year.
    pub fn instant_in_year(
        &self,
        year: i32,
        prev_raw_offset: i64,
        prev_dst_savings: i64,
    ) -> Option<i64> {
        let day = self.day.to_epoch_day(year, self.month)?;
        let local = day * MILLIS_PER_DAY + self.millis_in_day;
        Some(
            self.time_type
                .to_utc(local, prev_raw_offset, prev_dst_savings),
        )
    }
}

/// The rule in effect from the beginning of time until the first
/// transition.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct InitialRule {
    name: String,
    raw_offset: i64,
    dst_savings: i64,
}

impl InitialRule {
    pub fn new(name: impl Into<String>, raw_offset: i64, dst_savings: i64) -> InitialRule {
        InitialRule {
            name: name.into(),
            raw_offset,
            dst_savings,
        }
    }
}

impl TimeZoneRule for InitialRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn raw_offset(&self) -> i64 {
        self.raw_offset
    }

    fn dst_savings(&self) -> i64 {
        self.dst_savings
    }

    fn has_start_times(&self) -> bool {
        false
    }

    fn first_start(&self, _: i64, _: i64) -> Option<i64> {
        None
    }

    fn final_start(&self, _: i64, _: i64) -> Option<i64> {
        None
    }

    fn next_start_after(&self, _: i64, _: i64, _: i64, _: bool) -> Option<i64> {
        None
    }

    fn previous_start_before(&self, _: i64, _: i64, _: i64, _: bool) -> Option<i64> {
        None
    }
}

/// A rule that starts once every year, from `start_year` until `end_year`
/// inclusive, or forever if there is no end year.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct AnnualRule {
    name: String,
    raw_offset: i64,
    dst_savings: i64,
    date_rule: DateTimeRule,
    start_year: i32,
    end_year: Option<i32>,
}

impl AnnualRule {
    /// Returns an error if the end year precedes the start year.
    pub fn new(
        name: impl Into<String>,
        raw_offset: i64,
        dst_savings: i64,
        date_rule: DateTimeRule,
        start_year: i32,
        end_year: Option<i32>,
    ) -> Result<AnnualRule, RuleError> {
        if matches!(end_year, Some(end) if end < start_year) {
            return Err(RuleError::InvalidDateRule("end year precedes start year"));
        }

        Ok(AnnualRule {
            name: name.into(),
            raw_offset,
            dst_savings,
            date_rule,
            start_year,
            end_year,
        })
    }

    pub fn date_rule(&self) -> &DateTimeRule {
        &self.date_rule
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// The last year this rule applies to, or `None` if it never ends.
    pub fn end_year(&self) -> Option<i32> {
        self.end_year
    }

    /// The instant this rule starts in the given year, if it applies to
    /// that year at all.
    pub fn start_in_year(
        &self,
        year: i32,
        prev_raw_offset: i64,
        prev_dst_savings: i64,
    ) -> Option<i64> {
        if year < self.start_year || matches!(self.end_year, Some(end) if year > end) {
            return None;
        }
        self.date_rule
            .instant_in_year(year, prev_raw_offset, prev_dst_savings)
    }
}

impl TimeZoneRule for AnnualRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn raw_offset(&self) -> i64 {
        self.raw_offset
    }

    fn dst_savings(&self) -> i64 {
        self.dst_savings
    }

    fn has_start_times(&self) -> bool {
        true
    }

    fn is_perpetual(&self) -> bool {
        self.end_year.is_none()
    }

    fn first_start(&self, prev_raw_offset: i64, prev_dst_savings: i64) -> Option<i64> {
        self.start_in_year(self.start_year, prev_raw_offset, prev_dst_savings)
    }

    fn final_start(&self, prev_raw_offset: i64, prev_dst_savings: i64) -> Option<i64> {
        self.end_year
            .and_then(|end| self.start_in_year(end, prev_raw_offset, prev_dst_savings))
    }

    // Offsets are less than a day, so a start belonging to one year can only
    // cross into a neighbouring year once converted to UTC. Checking the
    // years around `base` is enough.
    fn next_start_after(
        &self,
        base: i64,
        prev_raw_offset: i64,
        prev_dst_savings: i64,
        inclusive: bool,
    ) -> Option<i64> {
        let year = calendar::year_of(base);
        if year < self.start_year.saturating_sub(1) {
            return self.first_start(prev_raw_offset, prev_dst_savings);
        }

        let from = year.saturating_sub(1).max(self.start_year);
        (from..=year.saturating_add(1))
            .filter_map(|y| self.start_in_year(y, prev_raw_offset, prev_dst_savings))
            .find(|&start| start > base || (inclusive && start == base))
    }

    fn previous_start_before(
        &self,
        base: i64,
        prev_raw_offset: i64,
        prev_dst_savings: i64,
        inclusive: bool,
    ) -> Option<i64> {
        let year = calendar::year_of(base);
        let mut to = year.saturating_add(1);
        if let Some(end) = self.end_year {
            if year > end.saturating_add(1) {
                return self.final_start(prev_raw_offset, prev_dst_savings);
            }
            to = to.min(end);
        }

        (year.saturating_sub(1)..=to)
            .rev()
            .filter_map(|y| self.start_in_year(y, prev_raw_offset, prev_dst_savings))
            .find(|&start| start < base || (inclusive && start == base))
    }
}

/// A rule that starts at an explicit list of instants.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct TimeArrayRule {
    name: String,
    raw_offset: i64,
    dst_savings: i64,
    start_times: Vec<i64>,
    time_type: TimeType,
}

impl TimeArrayRule {
    /// The start times are read according to `time_type`; they are sorted
    /// and deduplicated here. An empty list is allowed, but such a rule is
    /// refused as a transition rule.
    pub fn new(
        name: impl Into<String>,
        raw_offset: i64,
        dst_savings: i64,
        mut start_times: Vec<i64>,
        time_type: TimeType,
    ) -> TimeArrayRule {
        start_times.sort_unstable();
        start_times.dedup();
        TimeArrayRule {
            name: name.into(),
            raw_offset,
            dst_savings,
            start_times,
            time_type,
        }
    }

    pub fn start_times(&self) -> &[i64] {
        &self.start_times
    }

    pub fn time_type(&self) -> TimeType {
        self.time_type
    }

    fn utc_starts(
        &self,
        prev_raw_offset: i64,
        prev_dst_savings: i64,
    ) -> impl DoubleEndedIterator<Item = i64> + '_ {
        self.start_times
            .iter()
            .map(move |&t| self.time_type.to_utc(t, prev_raw_offset, prev_dst_savings))
    }
}

impl TimeZoneRule for TimeArrayRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn raw_offset(&self) -> i64 {
        self.raw_offset
    }

    fn dst_savings(&self) -> i64 {
        self.dst_savings
    }

    fn has_start_times(&self) -> bool {
        !self.start_times.is_empty()
    }

    fn first_start(&self, prev_raw_offset: i64, prev_dst_savings: i64) -> Option<i64> {
        self.utc_starts(prev_raw_offset, prev_dst_savings).next()
    }

    fn final_start(&self, prev_raw_offset: i64, prev_dst_savings: i64) -> Option<i64> {
        self.utc_starts(prev_raw_offset, prev_dst_savings).next_back()
    }

    fn next_start_after(
        &self,
        base: i64,
        prev_raw_offset: i64,
        prev_dst_savings: i64,
        inclusive: bool,
    ) -> Option<i64> {
        self.utc_starts(prev_raw_offset, prev_dst_savings)
            .find(|&start| start > base || (inclusive && start == base))
    }

    fn previous_start_before(
        &self,
        base: i64,
        prev_raw_offset: i64,
        prev_dst_savings: i64,
        inclusive: bool,
    ) -> Option<i64> {
        self.utc_starts(prev_raw_offset, prev_dst_savings)
            .rev()
            .find(|&start| start < base || (inclusive && start == base))
    }
}

/// Any of the rules a rule-based time zone can hold.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub enum Rule {
    Initial(InitialRule),
    Annual(AnnualRule),
    TimeArray(TimeArrayRule),
}

impl Rule {
    fn inner(&self) -> &dyn TimeZoneRule {
        match self {
            Rule::Initial(rule) => rule,
            Rule::Annual(rule) => rule,
            Rule::TimeArray(rule) => rule,
        }
    }
}

impl From<InitialRule> for Rule {
    fn from(rule: InitialRule) -> Rule {
        Rule::Initial(rule)
    }
}

impl From<AnnualRule> for Rule {
    fn from(rule: AnnualRule) -> Rule {
        Rule::Annual(rule)
    }
}

impl From<TimeArrayRule> for Rule {
    fn from(rule: TimeArrayRule) -> Rule {
        Rule::TimeArray(rule)
    }
}

impl TimeZoneRule for Rule {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn raw_offset(&self) -> i64 {
        self.inner().raw_offset()
    }

    fn dst_savings(&self) -> i64 {
        self.inner().dst_savings()
    }

    fn has_start_times(&self) -> bool {
        self.inner().has_start_times()
    }

    fn is_perpetual(&self) -> bool {
        self.inner().is_perpetual()
    }

    fn first_start(&self, prev_raw_offset: i64, prev_dst_savings: i64) -> Option<i64> {
        self.inner().first_start(prev_raw_offset, prev_dst_savings)
    }

    fn final_start(&self, prev_raw_offset: i64, prev_dst_savings: i64) -> Option<i64> {
        self.inner().final_start(prev_raw_offset, prev_dst_savings)
    }

    fn next_start_after(
        &self,
        base: i64,
        prev_raw_offset: i64,
        prev_dst_savings: i64,
        inclusive: bool,
    ) -> Option<i64> {
        self.inner()
            .next_start_after(base, prev_raw_offset, prev_dst_savings, inclusive)
    }

    fn previous_start_before(
        &self,
        base: i64,
        prev_raw_offset: i64,
        prev_dst_savings: i64,
        inclusive: bool,
    ) -> Option<i64> {
        self.inner()
            .previous_start_before(base, prev_raw_offset, prev_dst_savings, inclusive)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::calendar::{fields_to_day, fields_to_millis, MILLIS_PER_HOUR};

    const HOUR: i64 = MILLIS_PER_HOUR;

    fn us_daylight(start_year: i32, end_year: Option<i32>) -> AnnualRule {
        let date_rule = DateTimeRule::new(
            Month::March,
            DaySpec::NthWeekday(2, Weekday::Sun),
            2 * HOUR,
            TimeType::Wall,
        )
        .unwrap();
        AnnualRule::new("EDT", -5 * HOUR, HOUR, date_rule, start_year, end_year).unwrap()
    }

    #[test]
    fn day_specs() {
        let day = |spec: DaySpec, month| spec.to_epoch_day(2021, month).unwrap();

        assert_eq!(
            day(DaySpec::NthWeekday(2, Weekday::Sun), Month::March),
            fields_to_day(2021, 3, 14).unwrap()
        );
        assert_eq!(
            day(DaySpec::NthWeekday(-1, Weekday::Sun), Month::October),
            fields_to_day(2021, 10, 31).unwrap()
        );
        assert_eq!(
            day(DaySpec::NthWeekday(-1, Weekday::Sun), Month::February),
            fields_to_day(2021, 2, 28).unwrap()
        );
        assert_eq!(
            day(DaySpec::WeekdayOnOrAfter(Weekday::Sun, 8), Month::March),
            fields_to_day(2021, 3, 14).unwrap()
        );
        assert_eq!(
            day(DaySpec::WeekdayOnOrBefore(Weekday::Sun, 31), Month::October),
            fields_to_day(2021, 10, 31).unwrap()
        );
        assert_eq!(
            day(DaySpec::WeekdayOnOrBefore(Weekday::Fri, 13), Month::August),
            fields_to_day(2021, 8, 13).unwrap()
        );
    }

    #[test]
    fn day_overflow_rolls_into_next_month() {
        assert_eq!(
            DaySpec::DayOfMonth(29).to_epoch_day(2021, Month::February),
            fields_to_day(2021, 3, 1)
        );
        // 2021-02-28 is a Sunday, the following Saturday is in March.
        assert_eq!(
            DaySpec::WeekdayOnOrAfter(Weekday::Sat, 28).to_epoch_day(2021, Month::February),
            fields_to_day(2021, 3, 6)
        );
    }

    #[test]
    fn invalid_date_rules() {
        let invalid = |day| DateTimeRule::new(Month::May, day, 0, TimeType::Wall);
        assert!(invalid(DaySpec::DayOfMonth(0)).is_err());
        assert!(invalid(DaySpec::DayOfMonth(32)).is_err());
        assert!(invalid(DaySpec::NthWeekday(0, Weekday::Mon)).is_err());
        assert!(invalid(DaySpec::NthWeekday(6, Weekday::Mon)).is_err());
        assert!(
            DateTimeRule::new(Month::May, DaySpec::DayOfMonth(1), -1, TimeType::Wall).is_err()
        );

        let date_rule =
            DateTimeRule::new(Month::May, DaySpec::DayOfMonth(1), 0, TimeType::Wall).unwrap();
        assert_eq!(
            AnnualRule::new("X", 0, 0, date_rule, 2000, Some(1999)),
            Err(RuleError::InvalidDateRule("end year precedes start year"))
        );
    }

    #[test]
    fn time_types() {
        assert_eq!(TimeType::Utc.to_utc(10 * HOUR, 2 * HOUR, HOUR), 10 * HOUR);
        assert_eq!(TimeType::Standard.to_utc(10 * HOUR, 2 * HOUR, HOUR), 8 * HOUR);
        assert_eq!(TimeType::Wall.to_utc(10 * HOUR, 2 * HOUR, HOUR), 7 * HOUR);
    }

    #[test]
    fn time_types_saturate() {
        assert_eq!(TimeType::Wall.to_utc(i64::MIN + 10, 2 * HOUR, HOUR), i64::MIN);
        assert_eq!(TimeType::Standard.to_utc(i64::MIN, HOUR, 0), i64::MIN);
        assert_eq!(TimeType::Wall.to_utc(i64::MAX, -5 * HOUR, -HOUR), i64::MAX);

        let rule = TimeArrayRule::new("X", 0, 0, vec![i64::MIN], TimeType::Wall);
        assert_eq!(rule.first_start(HOUR, 0), Some(i64::MIN));
    }

    #[test]
    fn annual_next_start() {
        let rule = us_daylight(2007, None);
        let start_2021 = fields_to_millis(2021, 3, 14, 7 * HOUR).unwrap();
        let start_2022 = fields_to_millis(2022, 3, 13, 7 * HOUR).unwrap();

        let jan = fields_to_millis(2021, 1, 1, 0).unwrap();
        assert_eq!(rule.next_start_after(jan, -5 * HOUR, 0, false), Some(start_2021));
        assert_eq!(
            rule.next_start_after(start_2021, -5 * HOUR, 0, true),
            Some(start_2021)
        );
        assert_eq!(
            rule.next_start_after(start_2021, -5 * HOUR, 0, false),
            Some(start_2022)
        );
        assert_eq!(
            rule.next_start_after(i64::MIN, -5 * HOUR, 0, false),
            rule.first_start(-5 * HOUR, 0)
        );
        assert!(rule.is_perpetual());
    }

    #[test]
    fn annual_previous_start() {
        let rule = us_daylight(2007, Some(2010));
        let start_2010 = fields_to_millis(2010, 3, 14, 7 * HOUR).unwrap();
        let start_2009 = fields_to_millis(2009, 3, 8, 7 * HOUR).unwrap();

        let far_future = fields_to_millis(2050, 1, 1, 0).unwrap();
        assert_eq!(
            rule.previous_start_before(far_future, -5 * HOUR, 0, false),
            Some(start_2010)
        );
        assert_eq!(
            rule.previous_start_before(start_2010, -5 * HOUR, 0, true),
            Some(start_2010)
        );
        assert_eq!(
            rule.previous_start_before(start_2010, -5 * HOUR, 0, false),
            Some(start_2009)
        );
        let before = fields_to_millis(2007, 1, 1, 0).unwrap();
        assert_eq!(rule.previous_start_before(before, -5 * HOUR, 0, false), None);
        assert_eq!(rule.final_start(-5 * HOUR, 0), Some(start_2010));
        assert!(!rule.is_perpetual());
    }

    #[test]
    fn bounded_annual_rule_runs_out() {
        let rule = us_daylight(2007, Some(2010));
        let start_2010 = fields_to_millis(2010, 3, 14, 7 * HOUR).unwrap();
        assert_eq!(rule.next_start_after(start_2010, -5 * HOUR, 0, false), None);
    }

    #[test]
    fn start_crossing_year_boundary() {
        // New year's midnight at UTC+2 is still the previous year in UTC.
        let date_rule =
            DateTimeRule::new(Month::January, DaySpec::DayOfMonth(1), 0, TimeType::Wall)
                .unwrap();
        let rule = AnnualRule::new("NY", 2 * HOUR, 0, date_rule, 2000, None).unwrap();
        let start_2021 = fields_to_millis(2020, 12, 31, 22 * HOUR).unwrap();

        let base = fields_to_millis(2020, 12, 31, 21 * HOUR).unwrap();
        assert_eq!(rule.next_start_after(base, 2 * HOUR, 0, false), Some(start_2021));
        let base = fields_to_millis(2020, 12, 31, 23 * HOUR).unwrap();
        assert_eq!(
            rule.previous_start_before(base, 2 * HOUR, 0, false),
            Some(start_2021)
        );
    }

    #[test]
    fn time_array_starts() {
        let rule = TimeArrayRule::new("X", HOUR, 0, vec![300, 100, 200, 100], TimeType::Utc);
        assert_eq!(rule.start_times(), &[100, 200, 300]);
        assert_eq!(rule.first_start(0, 0), Some(100));
        assert_eq!(rule.final_start(0, 0), Some(300));
        assert_eq!(rule.next_start_after(100, 0, 0, false), Some(200));
        assert_eq!(rule.next_start_after(100, 0, 0, true), Some(100));
        assert_eq!(rule.next_start_after(300, 0, 0, false), None);
        assert_eq!(rule.previous_start_before(200, 0, 0, false), Some(100));
        assert_eq!(rule.previous_start_before(200, 0, 0, true), Some(200));
        assert_eq!(rule.previous_start_before(100, 0, 0, false), None);

        let wall = TimeArrayRule::new("Y", HOUR, 0, vec![10 * HOUR], TimeType::Wall);
        assert_eq!(wall.first_start(HOUR, HOUR), Some(8 * HOUR));
    }

    #[test]
    fn empty_time_array_has_no_starts() {
        let rule = TimeArrayRule::new("X", 0, 0, vec![], TimeType::Utc);
        assert!(!rule.has_start_times());
        assert_eq!(rule.next_start_after(i64::MIN, 0, 0, true), None);
    }

    #[test]
    fn equivalence() {
        let a: Rule = InitialRule::new("CET", HOUR, 0).into();
        let b: Rule = TimeArrayRule::new("CET", HOUR, 0, vec![0], TimeType::Utc).into();
        let c: Rule = TimeArrayRule::new("CEST", HOUR, HOUR, vec![0], TimeType::Utc).into();
        assert!(a.is_equivalent_to(&b));
        assert!(!a.is_equivalent_to(&c));
        assert_eq!(c.total_offset(), 2 * HOUR);
    }
}

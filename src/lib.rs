//! # Chrono-RBTZ
//!
//! `chrono-rbtz` builds time zones out of transition rules, and implements
//! the [`chrono::TimeZone`] trait for them.
//!
//! A zone starts with an *initial rule*, the offsets in effect from the
//! beginning of time. Transition rules are added on top of it: either
//! [`TimeArrayRule`]s that start at an explicit list of instants, or
//! [`AnnualRule`]s that start once a year according to a [`DateTimeRule`].
//! An annual rule without an end year never stops; a zone may have either
//! zero or two such rules, which then alternate forever after all other
//! rules have run out.
//!
//! ```
//! use chrono::{Month, TimeZone, Weekday};
//! use chrono_rbtz::{
//!     AnnualRule, DateTimeRule, DaySpec, InitialRule, OffsetName, RuleBasedTimeZone,
//!     TimeArrayRule, TimeType,
//! };
//!
//! const HOUR: i64 = 60 * 60 * 1000;
//!
//! let mut zone = RuleBasedTimeZone::new("Custom/Zone", InitialRule::new("LMT", 0, 0));
//!
//! // Standard time from 1970 on.
//! zone.add_transition_rule(TimeArrayRule::new("CET", HOUR, 0, vec![0], TimeType::Utc))?;
//!
//! // Summer time from 1996 on.
//! let last_sunday = DaySpec::NthWeekday(-1, Weekday::Sun);
//! let summer = DateTimeRule::new(Month::March, last_sunday, HOUR, TimeType::Utc)?;
//! let winter = DateTimeRule::new(Month::October, last_sunday, HOUR, TimeType::Utc)?;
//! zone.add_transition_rule(AnnualRule::new("CEST", HOUR, HOUR, summer, 1996, None)?)?;
//! zone.add_transition_rule(AnnualRule::new("CET", HOUR, 0, winter, 1996, None)?)?;
//!
//! let zone = zone.freeze()?;
//! let dt = zone.with_ymd_and_hms(2021, 7, 1, 12, 0, 0).unwrap();
//! assert_eq!(dt.offset().abbreviation(), "CEST");
//! # Ok::<(), chrono_rbtz::RuleError>(())
//! ```
//!
//! A [`RuleBasedTimeZone`] computes its transitions lazily, the first time
//! it is queried after a change, and can answer queries directly in
//! milliseconds since the Unix epoch. To use a zone with chrono, or to share
//! it between threads, [`freeze`](RuleBasedTimeZone::freeze) it.
//!
//! ## Features
//!
//! - `logging`: emits `log` records while transitions are computed.
//! - `serde`: `Serialize` and `Deserialize` for [`ZoneOffset`] and
//!   [`TimeType`].
//! - `arbitrary`: `Arbitrary` for [`ZoneOffset`] and [`TimeType`], for
//!   fuzzing.

#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_qualifications)]

#[macro_use]
mod logging;

pub mod calendar;
mod catalog;
mod error;
mod lookup;
mod rule;
#[cfg(feature = "serde")]
mod serde;
mod timezone;
mod timezone_impl;
mod transitions;

pub use crate::error::RuleError;
pub use crate::rule::{
    AnnualRule, DateTimeRule, DaySpec, InitialRule, Rule, TimeArrayRule, TimeType, TimeZoneRule,
};
pub use crate::timezone::{FrozenTimeZone, RuleBasedTimeZone, ZoneOffset};
pub use crate::timezone_impl::{OffsetComponents, OffsetName, RuleOffset};
pub use crate::transitions::Transition;

//! Time sources for scenario builds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScenarioError;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A time field in a scenario table: the literal `"now"` or an RFC 3339 instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeSpec {
    Now,
    At(DateTime<Utc>),
}

impl TryFrom<String> for TimeSpec {
    type Error = ScenarioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("now") {
            return Ok(Self::Now);
        }
        provgraph_model::parse_instant(&value)
            .map(Self::At)
            .map_err(|e| ScenarioError::InvalidTime {
                value,
                reason: e.to_string(),
            })
    }
}

impl From<TimeSpec> for String {
    fn from(value: TimeSpec) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => f.write_str("now"),
            Self::At(t) => f.write_str(&provgraph_model::format_instant(t)),
        }
    }
}

/// Issues the instants for one build.
///
/// Every `now` is read from the clock but never earlier than the previous
/// `now` handed out, so records applied later never carry an earlier
/// timestamp than records applied before them. Explicit instants pass
/// through untouched.
pub struct Timeline<'a> {
    clock: &'a dyn Clock,
    last: Option<DateTime<Utc>>,
}

impl<'a> Timeline<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock, last: None }
    }

    pub fn resolve(&mut self, spec: TimeSpec) -> DateTime<Utc> {
        match spec {
            TimeSpec::At(t) => t,
            TimeSpec::Now => self.now(),
        }
    }

    pub fn now(&mut self) -> DateTime<Utc> {
        let read = self.clock.now();
        let issued = match self.last {
            Some(last) if read < last => {
                tracing::warn!(
                    clock = %read,
                    issued = %last,
                    "clock went backwards; reusing the previous instant"
                );
                last
            }
            _ => read,
        };
        self.last = Some(issued);
        issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::cell::RefCell;

    /// Replays a fixed list of readings.
    struct ScriptedClock(RefCell<Vec<DateTime<Utc>>>);

    impl Clock for ScriptedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0.borrow_mut().remove(0)
        }
    }

    #[test]
    fn timeline_never_goes_backwards() {
        let t0 = Utc.with_ymd_and_hms(2016, 5, 1, 12, 0, 0).unwrap();
        let clock = ScriptedClock(RefCell::new(vec![
            t0,
            t0 + Duration::seconds(5),
            t0 + Duration::seconds(2),
            t0 + Duration::seconds(9),
        ]));
        let mut timeline = Timeline::new(&clock);
        let issued: Vec<_> = (0..4).map(|_| timeline.now()).collect();
        assert_eq!(
            issued,
            vec![
                t0,
                t0 + Duration::seconds(5),
                t0 + Duration::seconds(5),
                t0 + Duration::seconds(9),
            ]
        );
    }

    #[test]
    fn explicit_instants_bypass_the_clock() {
        let fixed = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let past = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock(fixed);
        let mut timeline = Timeline::new(&clock);
        assert_eq!(timeline.resolve(TimeSpec::Now), fixed);
        assert_eq!(timeline.resolve(TimeSpec::At(past)), past);
    }

    #[test]
    fn time_spec_parses_now_and_instants() {
        assert_eq!(TimeSpec::try_from("now".to_string()).unwrap(), TimeSpec::Now);
        let spec = TimeSpec::try_from("2016-05-01T12:00:00Z".to_string()).unwrap();
        assert_eq!(spec.to_string(), "2016-05-01T12:00:00Z");
        assert!(matches!(
            TimeSpec::try_from("yesterday".to_string()),
            Err(ScenarioError::InvalidTime { .. })
        ));
    }
}

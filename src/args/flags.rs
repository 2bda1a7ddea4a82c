use jiff::civil;

use crate::args::Usage;

/// A flag value for a single day of the week.
///
/// This exists as a distinct type (instead of using `jiff::civil::Weekday`
/// directly) so that we can attach our own parsing and usage docs to it.
#[derive(Clone, Copy, Debug)]
pub struct Weekday(civil::Weekday);

impl Weekday {
    pub fn get(&self) -> civil::Weekday {
        self.0
    }
}

impl std::str::FromStr for Weekday {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Weekday> {
        use jiff::civil::Weekday::*;

        let weekday = match &*s.to_lowercase() {
            "sunday" | "sun" | "su" => Sunday,
            "monday" | "mon" | "mo" => Monday,
            "tuesday" | "tues" | "tue" | "tu" => Tuesday,
            "wednesday" | "wed" | "we" => Wednesday,
            "thursday" | "thurs" | "thur" | "thu" | "th" => Thursday,
            "friday" | "fri" | "fr" => Friday,
            "saturday" | "sat" | "sa" => Saturday,
            unk => anyhow::bail!("unrecognized weekday: `{unk}`"),
        };
        Ok(Weekday(weekday))
    }
}

/// Returns the full lowercase name for a weekday.
///
/// This is the canonical spelling used in meeting order records, and it
/// round-trips through the `Weekday` flag parser above.
pub fn weekday_name(weekday: civil::Weekday) -> &'static str {
    match weekday {
        civil::Weekday::Sunday => "sunday",
        civil::Weekday::Monday => "monday",
        civil::Weekday::Tuesday => "tuesday",
        civil::Weekday::Wednesday => "wednesday",
        civil::Weekday::Thursday => "thursday",
        civil::Weekday::Friday => "friday",
        civil::Weekday::Saturday => "saturday",
    }
}

/// A flag value for a comma-separated list of weekdays.
///
/// For example, `mon,wed,fri`. Duplicates are tolerated here; the schedule
/// normalization de-duplicates and sorts before expansion.
#[derive(Clone, Debug)]
pub struct Weekdays(Vec<civil::Weekday>);

impl Weekdays {
    pub const USAGE: Usage = Usage::flag(
        "-w/--on <weekday-list>",
        "The weekdays a weekly schedule repeats on.",
        r#"
The weekdays a weekly schedule repeats on.

Legal values are comma-separated lists of weekdays, abbreviated or in full.
For example, `mon,wed,fri` or `saturday,sunday`.

Multiple weekdays can also be given with repeated use of this flag.

This flag is only allowed (and is required) for weekly cadence.
"#,
    );

    pub fn get(&self) -> &[civil::Weekday] {
        &self.0
    }
}

impl std::str::FromStr for Weekdays {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Weekdays> {
        anyhow::ensure!(!s.is_empty(), "weekday list must not be empty");
        let mut weekdays = vec![];
        for part in s.split(",") {
            weekdays.push(part.trim().parse::<Weekday>()?.get());
        }
        Ok(Weekdays(weekdays))
    }
}

/// A flag value for a numbered weekday of the month.
///
/// For example, `2-tue` is the second Tuesday of the month and `last-fri`
/// (equivalently, `5-fri`) is the last Friday of the month.
#[derive(Clone, Copy, Debug)]
pub struct NthWeekday {
    week: i8,
    weekday: civil::Weekday,
}

impl NthWeekday {
    pub const USAGE: Usage = Usage::flag(
        "--nth <week>-<weekday>",
        "Anchor a monthly schedule to the Nth weekday of the month.",
        r#"
Anchor a monthly schedule to the Nth weekday of the month.

Legal values are a week number 1 through 5 followed by a dash and a weekday.
For example, `2-tue` is the second Tuesday of every month. The week number
may also be the word `last`, which is a synonym for `5`: both mean the last
such weekday of the month, which in most months is the 4th.

This flag is only allowed for monthly cadence, and cannot be used with
-d/--day-of-month.
"#,
    );

    pub fn week(&self) -> i8 {
        self.week
    }

    pub fn weekday(&self) -> civil::Weekday {
        self.weekday
    }
}

impl std::str::FromStr for NthWeekday {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<NthWeekday> {
        use anyhow::Context;

        let Some((week, weekday)) = s.split_once("-") else {
            anyhow::bail!(
                "expected `<week>-<weekday>`, e.g., `2-tue` or `last-fri`, \
                 but got `{s}`",
            );
        };
        let week = if week.eq_ignore_ascii_case("last") {
            5
        } else {
            week.parse().with_context(|| {
                format!("failed to parse `{week}` as a week number")
            })?
        };
        let weekday = weekday.parse::<Weekday>()?.get();
        Ok(NthWeekday { week, weekday })
    }
}

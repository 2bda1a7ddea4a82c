use jiff::{
    Span, ToSpan,
    civil::{Date, Weekday},
};

use crate::args::Usage;

// The expansion below is deliberately iterative. Every loop either has an
// explicit calendar guard (for date-bounded schedules) or fills a bounded
// emitter (for count-bounded ones), and the emitter refuses to grow past
// `MAX_OCCURRENCES` no matter what the schedule asks for. That makes the
// termination argument local to each loop instead of spread across a
// recursion.

/// The hard ceiling on the number of dates any single schedule may produce.
///
/// Hitting the ceiling silently truncates the result. It is a backstop
/// against malformed or adversarial parameters, not something well-formed
/// business schedules (at most 99 occurrences) should ever reach.
pub const MAX_OCCURRENCES: usize = 365;

/// A recurrence schedule for a meeting, ready for expansion.
///
/// A schedule is a plain value. Callers normally obtain one from
/// `MeetingOrder::schedule`, which applies the booking form's validation
/// rules first. A schedule built directly (bypassing validation) still
/// expands without panicking: out-of-range intervals and anchors are
/// clamped during normalization, and a weekly schedule with no weekdays
/// falls back to the weekday of `start`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schedule {
    /// The first candidate date. Expansion never emits anything earlier.
    pub start: Date,
    /// How often the meeting repeats.
    pub cadence: Cadence,
    /// Repeat every `interval` days, weeks or months. Values below `1` are
    /// treated as `1`.
    pub interval: i32,
    /// When expansion stops.
    pub end: EndRule,
    /// For weekly cadence: the weekdays within each cycle. Empty means
    /// "the weekday of `start`".
    pub weekly_days: Vec<Weekday>,
    /// For monthly cadence: where each cycle's occurrence lands. `None`
    /// means "the same day as `start`, advanced by whole months".
    pub monthly_anchor: Option<MonthlyAnchor>,
}

impl Schedule {
    /// Expands this schedule into every concrete occurrence date.
    ///
    /// Expansion is pure and total: the same schedule always produces the
    /// same occurrences, and no input can make it fail or run unbounded.
    /// The result is strictly increasing, starts no earlier than `start`,
    /// respects the end rule and never exceeds `MAX_OCCURRENCES` entries.
    pub fn expand(&self) -> Occurrences {
        let plan = self.normalize();
        let mut out = Emitter::new(match plan.end {
            EndRule::OnDate(_) => MAX_OCCURRENCES,
            EndRule::AfterCount(count) => count.min(MAX_OCCURRENCES),
        });
        match plan.cadence {
            Cadence::Daily => plan.daily(&mut out),
            Cadence::Weekly => plan.weekly(&mut out),
            Cadence::Monthly => plan.monthly(&mut out),
        }
        Occurrences { dates: out.dates }
    }

    /// Returns a copy of this schedule with every default filled in and
    /// every out-of-range parameter clamped.
    ///
    /// The generation loops rely on this so that they never need a
    /// conditional-on-absence branch: after normalization the weekday set
    /// is non-empty and sorted chronologically (Monday first), the
    /// interval is at least one and any monthly anchor addresses a day
    /// that exists in every month.
    fn normalize(&self) -> Plan {
        let mut weekly_days = if self.weekly_days.is_empty() {
            vec![self.start.weekday()]
        } else {
            self.weekly_days.clone()
        };
        weekly_days.sort_by_key(|wd| wd.to_monday_one_offset());
        weekly_days.dedup();

        let monthly_anchor = self.monthly_anchor.map(|anchor| match anchor {
            MonthlyAnchor::DayOfMonth(day) => {
                MonthlyAnchor::DayOfMonth(day.clamp(1, 28))
            }
            MonthlyAnchor::NthWeekday { week, weekday } => {
                MonthlyAnchor::NthWeekday { week: week.clamp(1, 5), weekday }
            }
        });

        Plan {
            start: self.start,
            cadence: self.cadence,
            interval: self.interval.max(1),
            end: self.end,
            weekly_days,
            monthly_anchor,
        }
    }
}

/// A normalized schedule. This is what the generation loops actually run
/// against.
#[derive(Debug)]
struct Plan {
    start: Date,
    cadence: Cadence,
    interval: i32,
    end: EndRule,
    weekly_days: Vec<Weekday>,
    monthly_anchor: Option<MonthlyAnchor>,
}

impl Plan {
    /// Emit `start`, then keep stepping forward by `interval` days.
    fn daily(&self, out: &mut Emitter) {
        let Ok(step) = Span::new().try_days(i64::from(self.interval)) else {
            return;
        };
        let mut cur = self.start;
        loop {
            if let EndRule::OnDate(end) = self.end {
                if cur > end {
                    return;
                }
            }
            if !out.push(cur) {
                return;
            }
            let Ok(next) = cur.checked_add(step) else { return };
            cur = next;
        }
    }

    /// Emit every selected weekday within each cycle of `interval` weeks.
    ///
    /// Cycles are anchored to the Monday of the week containing `start`.
    /// The weekday set is already sorted chronologically, so dates come
    /// out in order within a cycle. Dates that land before `start` (which
    /// can only happen in the first cycle) are skipped, and for a
    /// date-bounded schedule, dates past the end are skipped while the
    /// cycle scan continues for one week past the end to pick up any
    /// trailing weekday.
    fn weekly(&self, out: &mut Emitter) {
        let since_monday =
            i64::from(self.start.weekday().since(Weekday::Monday));
        let Ok(week0) = self.start.checked_sub(since_monday.days()) else {
            return;
        };
        let stride = 7 * i64::from(self.interval);
        for cycle in 0i64.. {
            let Ok(offset) = Span::new().try_days(cycle * stride) else {
                return;
            };
            let Ok(cycle_start) = week0.checked_add(offset) else { return };
            if let EndRule::OnDate(end) = self.end {
                // Saturating: an end date at the calendar's edge must not
                // wedge the guard.
                if cycle_start > end.saturating_add(1.week()) {
                    return;
                }
            }
            for &weekday in self.weekly_days.iter() {
                let days = i64::from(weekday.since(Weekday::Monday));
                let Ok(date) = cycle_start.checked_add(days.days()) else {
                    continue;
                };
                if date < self.start {
                    continue;
                }
                if let EndRule::OnDate(end) = self.end {
                    if date > end {
                        continue;
                    }
                }
                if !out.push(date) {
                    return;
                }
            }
        }
    }

    /// Emit one anchored date per cycle of `interval` months.
    ///
    /// Each cycle's month is computed from the month of `start` rather
    /// than from the previous cycle, so a day constrained by a short
    /// month (say, the 31st falling back to February's 28th) does not
    /// infect every cycle after it.
    fn monthly(&self, out: &mut Emitter) {
        let month0 = self.start.first_of_month();
        let stride = i64::from(self.interval);
        for cycle in 0i64.. {
            let Ok(months) = Span::new().try_months(cycle * stride) else {
                return;
            };
            let Ok(cycle_month) = month0.checked_add(months) else { return };
            if let EndRule::OnDate(end) = self.end {
                if cycle_month > end.saturating_add(1.month()) {
                    return;
                }
            }
            let Some(date) = self.monthly_target(cycle_month, months) else {
                continue;
            };
            if date < self.start {
                // An anchor earlier in the month than `start` undershoots
                // in the first cycle. It doesn't consume a count slot.
                continue;
            }
            if let EndRule::OnDate(end) = self.end {
                if date > end {
                    continue;
                }
            }
            if !out.push(date) {
                return;
            }
        }
    }

    /// Resolve the anchored date within the cycle month beginning at
    /// `cycle_month` (`months` is that same cycle's offset from the start
    /// month, used for anchorless direct month arithmetic).
    fn monthly_target(&self, cycle_month: Date, months: Span) -> Option<Date> {
        match self.monthly_anchor {
            Some(MonthlyAnchor::DayOfMonth(day)) => {
                // `day` is clamped to `1..=28` during normalization, so
                // this addresses an existing day in every month.
                Date::new(cycle_month.year(), cycle_month.month(), day).ok()
            }
            Some(MonthlyAnchor::NthWeekday { week, weekday }) => {
                let nth = if week == 5 { -1 } else { week };
                cycle_month.nth_weekday_of_month(nth, weekday).ok()
            }
            None => self.start.checked_add(months).ok(),
        }
    }
}

/// An append-only, bounded, strictly increasing date buffer.
#[derive(Debug)]
struct Emitter {
    dates: Vec<Date>,
    limit: usize,
}

impl Emitter {
    fn new(limit: usize) -> Emitter {
        Emitter { dates: Vec::new(), limit }
    }

    fn is_full(&self) -> bool {
        self.dates.len() >= self.limit
    }

    /// Appends a date, dropping anything that would not strictly extend
    /// the sequence. Returns false once no further dates are accepted.
    fn push(&mut self, date: Date) -> bool {
        if self.is_full() {
            return false;
        }
        if self.dates.last().map_or(true, |&last| date > last) {
            self.dates.push(date);
        }
        !self.is_full()
    }
}

/// The ordered occurrence dates produced by expanding a schedule.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Occurrences {
    dates: Vec<Date>,
}

impl Occurrences {
    /// The occurrence dates, strictly increasing.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// The number of occurrences.
    pub fn count(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first(&self) -> Option<Date> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<Date> {
        self.dates.last().copied()
    }
}

impl<'a> IntoIterator for &'a Occurrences {
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Date>>;
    type Item = Date;

    fn into_iter(self) -> Self::IntoIter {
        self.dates.iter().copied()
    }
}

/// How often a schedule repeats.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    pub const USAGE: Usage = Usage::arg(
        "<cadence>",
        "How often the meeting repeats.",
        r#"
How often the meeting repeats.

Valid values are:

daily, day, d

weekly, week, wk, w

monthly, month, mo, m
"#,
    );

    pub fn as_str(&self) -> &'static str {
        match *self {
            Cadence::Daily => "daily",
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for Cadence {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Cadence> {
        let cadence = match &*s.to_lowercase() {
            "daily" | "day" | "d" => Cadence::Daily,
            "weekly" | "week" | "wk" | "w" => Cadence::Weekly,
            "monthly" | "month" | "mo" | "m" => Cadence::Monthly,
            unk => anyhow::bail!("unrecognized cadence: `{unk}`"),
        };
        Ok(cadence)
    }
}

/// When a schedule stops producing occurrences.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EndRule {
    /// Stop after this date (inclusive).
    OnDate(Date),
    /// Stop once this many occurrences have been produced.
    AfterCount(usize),
}

/// Where a monthly schedule's occurrence lands within each cycle month.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MonthlyAnchor {
    /// A fixed day of the month.
    ///
    /// Days above 28 are treated as 28, so that the anchor exists in
    /// every month. A schedule asking for "the 31st of every month" gets
    /// the 28th of every month, including months that do have a 31st.
    /// This matches the behavior of the booking service this tool grew
    /// out of; see DESIGN.md before changing it.
    DayOfMonth(i8),
    /// The `week`-th occurrence of `weekday` in the month.
    ///
    /// A `week` of 5 means the *last* such weekday of the month, which in
    /// most months is the 4th.
    NthWeekday { week: i8, weekday: Weekday },
}

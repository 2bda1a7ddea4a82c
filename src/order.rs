use {
    anyhow::Context,
    jiff::civil::{Date, Time, Weekday},
    serde::{Deserialize, Serialize},
};

use crate::{
    args::flags,
    recur::{Cadence, EndRule, MonthlyAnchor, Schedule},
};

/// A meeting order, as captured by the booking form.
///
/// Every field is optional because this is the *unvalidated* shape: it is
/// exactly what arrives over the wire (or gets assembled from CLI flags)
/// before any rule has run. Enum-ish fields are plain strings so that a
/// misspelled value surfaces as a validation message rather than a
/// deserialization failure.
///
/// Call `schedule` to validate an order and obtain the recurrence schedule
/// it describes.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MeetingOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,
    /// The meeting's time of day. Carried along for downstream consumers
    /// (meeting creation, notification emails); never used in date math.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Time>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_days: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_day: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_week: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_weekday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<usize>,
}

impl MeetingOrder {
    /// Validates this order and returns the schedule it describes.
    ///
    /// Rules run in a fixed order and the first failing rule is the error
    /// returned, so that an order violating several rules surfaces one
    /// stable, actionable message. The order is: start date, recurrence
    /// type, repeat interval, weekly weekday selection, end rule presence,
    /// end rule value, monthly anchor.
    pub fn schedule(&self) -> anyhow::Result<Schedule> {
        let start = self.start_date.context("meeting order has no start date")?;
        let cadence: Cadence = self
            .recurrence
            .as_deref()
            .context("meeting order has no recurrence type")?
            .parse()?;

        // The ceilings exist to keep interval values plausible for a
        // booking, even though the expander itself caps total output.
        let interval = self.interval.unwrap_or(1);
        let ceiling = match cadence {
            Cadence::Daily => 99,
            Cadence::Weekly => 50,
            Cadence::Monthly => 10,
        };
        anyhow::ensure!(
            1 <= interval && interval <= ceiling,
            "{cadence} repeat interval `{interval}` is out of range \
             (must be in range 1..={ceiling})",
            cadence = cadence.as_str(),
        );

        let weekly_days = match cadence {
            Cadence::Weekly => self.weekly_days()?,
            Cadence::Daily | Cadence::Monthly => vec![],
        };

        let end = match (self.end_date, self.occurrences) {
            (Some(_), Some(_)) => anyhow::bail!(
                "an end date and an occurrence count cannot both be set",
            ),
            (None, None) => anyhow::bail!(
                "meeting order has no end rule \
                 (set an end date or an occurrence count)",
            ),
            (Some(end), None) => {
                anyhow::ensure!(
                    end >= start,
                    "end date `{end}` is before start date `{start}`",
                );
                EndRule::OnDate(end)
            }
            (None, Some(count)) => {
                anyhow::ensure!(
                    2 <= count && count <= 99,
                    "occurrence count `{count}` is out of range \
                     (must be in range 2..=99)",
                );
                EndRule::AfterCount(count)
            }
        };

        let monthly_anchor = match cadence {
            Cadence::Monthly => self.monthly_anchor()?,
            Cadence::Daily | Cadence::Weekly => None,
        };

        Ok(Schedule {
            start,
            cadence,
            interval,
            end,
            weekly_days,
            monthly_anchor,
        })
    }

    fn weekly_days(&self) -> anyhow::Result<Vec<Weekday>> {
        let days = self.weekly_days.as_deref().unwrap_or(&[]);
        anyhow::ensure!(
            !days.is_empty(),
            "select at least one weekday for weekly recurrence",
        );
        days.iter()
            .map(|day| Ok(day.parse::<flags::Weekday>()?.get()))
            .collect()
    }

    /// Resolve the monthly anchor fields. A day-of-month takes precedence
    /// over a numbered weekday when both are set, matching what the
    /// booking form has always submitted.
    fn monthly_anchor(&self) -> anyhow::Result<Option<MonthlyAnchor>> {
        if let Some(day) = self.monthly_day {
            anyhow::ensure!(
                1 <= day && day <= 31,
                "monthly day `{day}` is out of range (must be in range 1..=31)",
            );
            return Ok(Some(MonthlyAnchor::DayOfMonth(day)));
        }
        let Some(week) = self.monthly_week else { return Ok(None) };
        anyhow::ensure!(
            1 <= week && week <= 5,
            "monthly week `{week}` is out of range (must be in range 1..=5)",
        );
        let weekday = self
            .monthly_weekday
            .as_deref()
            .context("monthly week is set, but there is no weekday with it")?
            .parse::<flags::Weekday>()?
            .get();
        Ok(Some(MonthlyAnchor::NthWeekday { week, weekday }))
    }
}

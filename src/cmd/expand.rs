use std::io::Write;

use {anyhow::Context, jiff::civil::Date, serde::Serialize};

use crate::{
    args::{self, Usage, flags},
    order::MeetingOrder,
    recur::Cadence,
};

const USAGE: &'static str = r#"
Expand a recurrence schedule into its concrete occurrence dates.

Dates are printed in chronological order, one per line, starting from the
given start date. Every schedule needs a termination rule: either an
inclusive end date (-u/--until) or a fixed number of occurrences
(-c/--count). Output is additionally capped at 365 dates no matter what the
schedule asks for.

The flags given here are validated exactly like a meeting order submitted
through the booking form, so the errors match what a customer would see.

USAGE:
    cadence expand <cadence> <start-date>

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    A session every Monday, Wednesday and Friday for two weeks:

        $ cadence expand weekly 2025-01-01 -w mon,wed,fri -u 2025-01-14
        2025-01-01
        2025-01-03
        2025-01-06
        2025-01-08
        2025-01-10
        2025-01-13

    %snip-start%

    Six sessions, every other day:

        $ cadence expand daily 2025-01-01 -i2 -c6
        2025-01-01
        2025-01-03
        2025-01-05
        2025-01-07
        2025-01-09
        2025-01-11

    Payday review on the 28th of each month, as JSON for the booking flow:

        $ cadence expand monthly 2025-01-05 -d28 -c3 --json
        {"count":3,"dates":["2025-01-28","2025-02-28","2025-03-28"]}

    The last Friday of every month until the end of the year:

        $ cadence expand monthly 2025-01-03 --nth last-fri -u 2025-12-31

    %snip-end%
REQUIRED ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    args::configure(p, USAGE, &mut [&mut config])?;

    let schedule = config.order().schedule()?;
    let occurrences = schedule.expand();
    let mut wtr = std::io::stdout().lock();
    if config.json {
        #[derive(Serialize)]
        struct Expanded<'a> {
            count: usize,
            dates: &'a [Date],
        }
        let expanded = Expanded {
            count: occurrences.count(),
            dates: occurrences.dates(),
        };
        serde_json::to_writer(&mut wtr, &expanded)?;
        writeln!(wtr)?;
    } else {
        for date in &occurrences {
            writeln!(wtr, "{date}")?;
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Config {
    cadence: Option<Cadence>,
    start: Option<Date>,
    interval: Option<i32>,
    on: Vec<flags::Weekdays>,
    day_of_month: Option<i8>,
    nth: Option<flags::NthWeekday>,
    until: Option<Date>,
    count: Option<usize>,
    json: bool,
}

impl Config {
    /// Assemble the meeting order these flags describe.
    ///
    /// The CLI deliberately funnels through the same `MeetingOrder`
    /// validation as JSON orders do, rather than building a `Schedule`
    /// directly. One rule set, one set of error messages.
    fn order(&self) -> MeetingOrder {
        let weekly_days: Vec<String> = self
            .on
            .iter()
            .flat_map(|days| days.get().iter())
            .map(|&wd| flags::weekday_name(wd).to_string())
            .collect();
        MeetingOrder {
            start_date: self.start,
            recurrence: self.cadence.map(|c| c.as_str().to_string()),
            interval: self.interval,
            weekly_days: if weekly_days.is_empty() {
                None
            } else {
                Some(weekly_days)
            },
            monthly_day: self.day_of_month,
            monthly_week: self.nth.map(|nth| nth.week()),
            monthly_weekday: self
                .nth
                .map(|nth| flags::weekday_name(nth.weekday()).to_string()),
            end_date: self.until,
            occurrences: self.count,
            ..MeetingOrder::default()
        }
    }
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        p: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        use lexopt::Arg::*;

        match *arg {
            Value(ref v) => {
                let v = v.to_str().context("argument is not valid UTF-8")?;
                if self.cadence.is_none() {
                    self.cadence = Some(v.parse()?);
                    return Ok(true);
                }
                if self.start.is_none() {
                    let date = v.parse::<Date>().with_context(|| {
                        format!("failed to parse `{v}` as a start date")
                    })?;
                    self.start = Some(date);
                    return Ok(true);
                }
                return Ok(false);
            }
            Short('u') | Long("until") => {
                anyhow::ensure!(
                    self.count.is_none(),
                    "the -u/--until flag cannot be used with -c/--count",
                );
                self.until = Some(args::parse(p, "-u/--until")?);
            }
            Short('c') | Long("count") => {
                anyhow::ensure!(
                    self.until.is_none(),
                    "the -c/--count flag cannot be used with -u/--until",
                );
                self.count = Some(args::parse(p, "-c/--count")?);
            }
            Short('i') | Long("interval") => {
                self.interval = Some(args::parse(p, "-i/--interval")?);
            }
            Short('w') | Long("on") => {
                self.on.push(args::parse(p, "-w/--on")?);
            }
            Short('d') | Long("day-of-month") => {
                anyhow::ensure!(
                    self.nth.is_none(),
                    "the -d/--day-of-month flag cannot be used with --nth",
                );
                self.day_of_month =
                    Some(args::parse(p, "-d/--day-of-month")?);
            }
            Long("nth") => {
                anyhow::ensure!(
                    self.day_of_month.is_none(),
                    "the --nth flag cannot be used with -d/--day-of-month",
                );
                self.nth = Some(args::parse(p, "--nth")?);
            }
            Long("json") => {
                self.json = true;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const START_DATE: Usage = Usage::arg(
            "<start-date>",
            "The first candidate date, e.g., `2025-01-01`.",
            r#"
The first candidate date, in ISO 8601 format. For example, `2025-01-01`.

No occurrence is ever generated before this date. For weekly schedules whose
weekday selection does not include the start date's own weekday, the first
occurrence lands on the next selected weekday after the start.
"#,
        );
        const INTERVAL: Usage = Usage::flag(
            "-i/--interval <number>",
            "Repeat every <number> days, weeks or months.",
            r#"
Repeat every <number> days, weeks or months, according to the cadence.

The default is 1. The ceiling depends on the cadence: 99 for daily, 50 for
weekly and 10 for monthly.
"#,
        );
        const UNTIL: Usage = Usage::flag(
            "-u/--until <date>",
            "Generate occurrences up to this date (inclusive).",
            r#"
Generate occurrences up to this date (inclusive).

The end date must not be before the start date.

This flag conflicts with `-c/--count`. That is, one or the other must be set,
but not both.
"#,
        );
        const COUNT: Usage = Usage::flag(
            "-c/--count <number>",
            "Generate this many occurrences.",
            r#"
Generate this many occurrences.

Legal values are the integers 2 through 99.

This flag conflicts with `-u/--until`. That is, one or the other must be set,
but not both.
"#,
        );
        const DAY_OF_MONTH: Usage = Usage::flag(
            "-d/--day-of-month <day>",
            "Anchor a monthly schedule to this day of the month.",
            r#"
Anchor a monthly schedule to this day of the month.

Legal values are the integers 1 through 31. Days above 28 are treated as 28
so that every month has an occurrence.

This flag is only allowed for monthly cadence, and cannot be used with
--nth. When a monthly schedule has neither anchor, each occurrence falls on
the start date's own day of the month (constrained in shorter months).
"#,
        );
        const JSON: Usage = Usage::flag(
            "--json",
            "Print a JSON object instead of one date per line.",
            r#"
Print a JSON object instead of one date per line.

The object has a `count` field and a `dates` array, matching what the bulk
`orders` command emits per order.
"#,
        );

        &[
            Cadence::USAGE,
            START_DATE,
            INTERVAL,
            UNTIL,
            COUNT,
            flags::Weekdays::USAGE,
            DAY_OF_MONTH,
            flags::NthWeekday::USAGE,
            JSON,
        ]
    }
}

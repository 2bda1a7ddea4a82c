use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use {
    anyhow::Context,
    jiff::civil::{Date, Time},
    serde::Serialize,
};

use crate::{
    args::{self, Usage},
    order::MeetingOrder,
};

const USAGE: &'static str = r#"
Expand meeting orders in bulk.

Orders are read as JSON lines (one JSON document per line) from the given
file, or from stdin when no file is given. For every order, one JSON line
is written to stdout: either the expanded occurrence dates, or the first
validation rule that order violates. A bad order never aborts the batch.

This is the plumbing command behind scheduling and invoicing: downstream
consumers create one meeting per date and price the order as
price-per-session times `count`.

USAGE:
    cadence orders [<path>]

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    %snip-start%
    Expand a batch of orders:

        $ cadence orders < orders.jsonl
        {"topic":"Yoga","time":"08:00:00","count":3,"dates":["2025-01-01","2025-01-03","2025-01-05"]}
        {"topic":"Standup","error":"select at least one weekday for weekly recurrence"}

    %snip-end%
REQUIRED ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    args::configure(p, USAGE, &mut [&mut config])?;

    let mut wtr = std::io::stdout().lock();
    match config.path {
        Some(ref path) => {
            let file = std::fs::File::open(path).with_context(|| {
                format!("failed to open {}", path.display())
            })?;
            process(std::io::BufReader::new(file), &mut wtr)
        }
        None => process(std::io::stdin().lock(), &mut wtr),
    }
}

fn process(
    rdr: impl BufRead,
    mut wtr: impl Write,
) -> anyhow::Result<()> {
    for (i, line) in rdr.lines().enumerate() {
        let line = line.with_context(|| {
            format!("failed to read meeting order on line {}", i + 1)
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let result = expand_one(&line);
        serde_json::to_writer(&mut wtr, &result)?;
        writeln!(wtr)?;
    }
    Ok(())
}

fn expand_one(line: &str) -> Output {
    let order: MeetingOrder = match serde_json::from_str(line) {
        Ok(order) => order,
        Err(err) => {
            return Output::failure(None, anyhow::Error::new(err));
        }
    };
    match order.schedule() {
        Ok(schedule) => {
            let occurrences = schedule.expand();
            Output::Expanded {
                topic: order.topic,
                time: order.start_time,
                count: occurrences.count(),
                dates: occurrences.dates().to_vec(),
            }
        }
        Err(err) => Output::failure(order.topic, err),
    }
}

/// One line of output: an expanded order or the reason it was rejected.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Output {
    Expanded {
        #[serde(skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        time: Option<Time>,
        count: usize,
        dates: Vec<Date>,
    },
    Failure {
        #[serde(skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
        error: String,
    },
}

impl Output {
    fn failure(topic: Option<String>, err: anyhow::Error) -> Output {
        // `{:#}` so that any context chain lands on the one line we have.
        Output::Failure { topic, error: format!("{err:#}") }
    }
}

#[derive(Debug, Default)]
struct Config {
    path: Option<PathBuf>,
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        _: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        use lexopt::Arg::*;

        match *arg {
            Value(ref v) => {
                if self.path.is_some() {
                    return Ok(false);
                }
                self.path = Some(PathBuf::from(v));
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const PATH: Usage = Usage::arg(
            "<path>",
            "A file containing meeting orders as JSON lines.",
            r#"
A file containing meeting orders as JSON lines, one order per line. Blank
lines are skipped.

When absent, orders are read from stdin instead.
"#,
        );
        &[PATH]
    }
}

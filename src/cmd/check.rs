use std::{io::Write, path::PathBuf};

use anyhow::Context;

use crate::{
    args::{self, Usage},
    order::MeetingOrder,
};

const USAGE: &'static str = r#"
Validate a meeting order and summarize its schedule.

The order is read as a single JSON document from the given file, or from
stdin when no file is given. On success, this prints the number of
occurrences and the date span they cover. On failure, it prints the first
validation rule the order violates, worded as the booking form would word
it, and exits with an error code.

USAGE:
    cadence check [<path>]

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Validate an order from a file:

        $ cadence check order.json
        ok: 5 occurrences from 2025-01-01 to 2025-01-15

    Validate an order from stdin:

        $ echo '{"start_date": "2025-01-01"}' | cadence check
        meeting order has no recurrence type

REQUIRED ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    args::configure(p, USAGE, &mut [&mut config])?;

    let json = match config.path {
        Some(ref path) => std::fs::read_to_string(path).with_context(|| {
            format!("failed to read meeting order from {}", path.display())
        })?,
        None => std::io::read_to_string(std::io::stdin().lock())
            .context("failed to read meeting order from stdin")?,
    };
    let order: MeetingOrder = serde_json::from_str(&json)
        .context("failed to parse meeting order JSON")?;
    let occurrences = order.schedule()?.expand();

    let mut wtr = std::io::stdout().lock();
    match (occurrences.first(), occurrences.last()) {
        (Some(first), Some(last)) => {
            writeln!(
                wtr,
                "ok: {count} occurrences from {first} to {last}",
                count = occurrences.count(),
            )?;
        }
        // Unreachable for validated orders, but don't make the summary
        // line lie if it ever happens.
        _ => writeln!(wtr, "ok: 0 occurrences")?,
    }
    Ok(())
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
            "A file containing one meeting order as JSON.",
            r#"
A file containing one meeting order as JSON.

When absent, the order is read from stdin instead.
"#,
        );
        &[PATH]
    }
}

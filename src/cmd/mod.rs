mod check;
mod expand;
mod fee;
mod orders;

const USAGE: &'static str = "\
A utility for expanding recurring meeting schedules into concrete dates.

USAGE:
    cadence <command> ...

COMMANDS:
    check   Validate a meeting order and summarize its schedule
    expand  Expand a recurrence schedule into occurrence dates
    fee     Compute the processing fee for a payment method
    orders  Expand meeting orders in bulk from JSON lines
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let cmd = crate::args::next_as_command(USAGE, p)?;
    match &*cmd {
        "check" => check::run(p),
        "expand" => expand::run(p),
        "fee" => fee::run(p),
        "orders" => orders::run(p),
        unk => anyhow::bail!("unrecognized command '{}'", unk),
    }
}

use std::ffi::OsStr;

mod check;
mod command;

/// Return a command for the `cadence` binary and no arguments.
fn cadence_bare() -> crate::command::Command {
    crate::command::bin("cadence")
}

/// Return a command for the `cadence` binary with the given arguments
/// appended to it.
fn cadence<T: AsRef<OsStr>>(
    args: impl IntoIterator<Item = T>,
) -> crate::command::Command {
    cadence_bare().args(args)
}

/// Running `cadence` with no arguments prints the top-level usage.
#[test]
fn no_args() {
    crate::command::assert_cmd_snapshot!(
        cadence_bare(),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    A utility for expanding recurring meeting schedules into concrete dates.

    USAGE:
        cadence <command> ...

    COMMANDS:
        check   Validate a meeting order and summarize its schedule
        expand  Expand a recurrence schedule into occurrence dates
        fee     Compute the processing fee for a payment method
        orders  Expand meeting orders in bulk from JSON lines
    ",
    );
}

/// An unrecognized command fails with a pointed error.
#[test]
fn unrecognized_command() {
    crate::command::assert_cmd_snapshot!(
        cadence(["frobnicate"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    unrecognized command 'frobnicate'
    ",
    );
}

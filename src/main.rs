use std::{env, io::Write, process::ExitCode};

mod args;
mod cmd;
mod fee;
mod logger;
mod order;
mod recur;
mod style;

fn main() -> ExitCode {
    let err = match run() {
        Ok(code) => return code,
        Err(err) => err,
    };
    if let Some(help) = err.root_cause().downcast_ref::<args::Help>() {
        writeln!(&mut std::io::stdout(), "{help}").unwrap();
        return ExitCode::SUCCESS;
    }
    if let Some(version) = err.root_cause().downcast_ref::<args::Version>() {
        writeln!(&mut std::io::stdout(), "{version}").unwrap();
        return ExitCode::SUCCESS;
    }
    // Look for a broken pipe error. In this case, we generally want
    // to exit "gracefully" with a success exit code. This matches
    // existing Unix convention. We need to handle this explicitly
    // since the Rust runtime doesn't ask for PIPE signals, and thus
    // we get an I/O error instead. Traditional C Unix applications
    // quit by getting a PIPE signal that they don't handle, and thus
    // the unhandled signal causes the process to unceremoniously
    // terminate.
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<std::io::Error>() {
            if err.kind() == std::io::ErrorKind::BrokenPipe {
                return ExitCode::from(0);
            }
        }
        // `serde_json` for whatever reason swallows any
        // `std::io::Error` it may hit when serializing JSON
        // via `to_writer`. So to deal with broken pipe errors,
        // we need to explicitly check it.
        if let Some(err) = cause.downcast_ref::<serde_json::Error>() {
            if let Some(kind) = err.io_error_kind() {
                if kind == std::io::ErrorKind::BrokenPipe {
                    return ExitCode::from(0);
                }
            }
        }
    }
    if std::env::var("RUST_BACKTRACE").map_or(false, |v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        writeln!(&mut std::io::stderr(), "{:?}", err).unwrap();
    } else {
        writeln!(&mut std::io::stderr(), "{:#}", err).unwrap();
    }
    ExitCode::from(1)
}

fn run() -> anyhow::Result<ExitCode> {
    let rustlog = env::var("CADENCE_LOG").unwrap_or_else(|_| String::new());
    let level = match &*rustlog {
        "" | "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        unk => anyhow::bail!("unrecognized log level '{}'", unk),
    };
    log::set_max_level(level);
    logger::Logger::init()?;
    cmd::run(&mut lexopt::Parser::from_env())?;
    Ok(ExitCode::SUCCESS)
}

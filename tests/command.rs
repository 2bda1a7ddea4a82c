/*!
Defines a simple command snapshotting mechanism.

This took some inspiration from `insta-cmd`, but re-works a few things. In
particular, this wraps `std::process::Command` in an owned builder with a
way to feed bytes to stdin, which is all the composition this test suite
needs. The snapshot itself captures the exit status along with everything
written to stdout and stderr.

I specifically wrote this in a way that it has no other dependencies on
other modules in this crate. That means it should be very easy to copy &
paste to other test suites.
*/

use std::{
    collections::BTreeMap,
    env::consts::EXE_SUFFIX,
    ffi::{OsStr, OsString},
    io::Write,
    path::{Path, PathBuf},
    process, thread,
};

macro_rules! run_and_snapshot {
    ($cmd:expr, $body:expr) => {{
        let snap = $cmd.snapshot();
        let mut settings = insta::Settings::clone_current();
        settings.set_info(snap.info());
        settings.set_omit_expression(true);
        settings.bind(|| ($body)(snap.snapshot()));
    }};
}

macro_rules! assert_cmd_snapshot {
    ($spawnable:expr, @$snapshot:literal $(,)?) => {{
        $crate::command::run_and_snapshot!($spawnable, |snapshot: &str| {
            insta::assert_snapshot!(snapshot, @$snapshot);
        });
    }};
    ($name:expr, $spawnable:expr $(,)?) => {{
        $crate::command::run_and_snapshot!($spawnable, |snapshot: &str| {
            insta::assert_snapshot!($name, snapshot);
        });
    }};
    ($spawnable:expr $(,)?) => {{
        $crate::command::run_and_snapshot!($spawnable, |snapshot: &str| {
            insta::assert_snapshot!(snapshot);
        });
    }};
}

pub(crate) use {assert_cmd_snapshot, run_and_snapshot};

/// A snapshot generated from running a command.
///
/// This also comes with some contextual info that is shown in the `cargo
/// insta review` user interface, but is not actually included in the
/// snapshot.
pub struct Snapshot {
    /// The contextual info put into the `cargo insta review` user interface.
    info: CommandInfo,
    /// The actual snapshot contents.
    snapshot: String,
}

impl Snapshot {
    /// Creates a new snapshot from a wrapped command and the process output.
    fn new(cmd: &Command, output: &process::Output) -> Snapshot {
        let info = cmd.info();
        let snapshot = format!(
            "success: {:?}\n\
             exit_code: {}\n\
             ----- stdout -----\n\
             {}\n\
             ----- stderr -----\n\
             {}",
            output.status.success(),
            output.status.code().unwrap_or(!0),
            bytes_to_string(&output.stdout),
            bytes_to_string(&output.stderr),
        );
        Snapshot { info, snapshot }
    }

    /// Returns the Insta "info" that contextualizes the snapshot.
    pub fn info(&self) -> &CommandInfo {
        &self.info
    }

    /// Returns the snapshot derived from running the command.
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }
}

/// An unfortunate wrapper around `std::process::Command`.
///
/// This exposes roughly the same builder API, except methods return
/// `Command` instead of `&mut Command`, which makes test helpers compose
/// without fighting mutable-borrow lifetimes. It probably results in more
/// allocs, but we don't care. We're using this in tests.
#[derive(Clone, Debug)]
pub struct Command {
    bin: OsString,
    current_dir: Option<PathBuf>,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
    stdin: Option<Vec<u8>>,
}

impl Command {
    /// Create a new command wrapper for the given binary program.
    pub fn new(bin: impl AsRef<OsStr>) -> Command {
        Command {
            bin: bin.as_ref().to_os_string(),
            current_dir: None,
            args: vec![],
            envs: vec![],
            stdin: None,
        }
    }

    /// Add an argument to the end of this command invocation.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Command {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Add arguments to the end of this command invocation.
    pub fn args(
        mut self,
        args: impl IntoIterator<Item = impl AsRef<OsStr>>,
    ) -> Command {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Set an environment variable.
    #[expect(dead_code)]
    pub fn env(
        mut self,
        key: impl AsRef<OsStr>,
        val: impl AsRef<OsStr>,
    ) -> Command {
        self.envs
            .push((key.as_ref().to_os_string(), val.as_ref().to_os_string()));
        self
    }

    /// Set the current directory in which to run this command.
    #[expect(dead_code)]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Command {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Pass the provided bytes to the command's stdin.
    pub fn stdin(mut self, bytes: impl Into<Vec<u8>>) -> Command {
        self.stdin = Some(bytes.into());
        self
    }

    /// Turn this wrapper into a fresh `std::process::Command`.
    fn std(&self) -> process::Command {
        let mut cmd = process::Command::new(&self.bin);
        if let Some(ref current_dir) = self.current_dir {
            cmd.current_dir(current_dir);
        }
        cmd.args(self.args.iter());
        for (key, val) in self.envs.iter() {
            cmd.env(key, val);
        }
        cmd
    }

    /// Runs this command and returns a snapshot based on its output.
    pub fn snapshot(&self) -> Snapshot {
        let mut cmd = self.std();
        cmd.stdout(process::Stdio::piped());
        cmd.stderr(process::Stdio::piped());
        let output = match self.stdin {
            None => {
                cmd.stdin(process::Stdio::null());
                cmd.output().unwrap()
            }
            Some(ref bytes) => {
                cmd.stdin(process::Stdio::piped());
                let mut child = cmd.spawn().unwrap();
                let mut child_stdin = child.stdin.take().unwrap();
                let bytes = bytes.clone();
                // Write on a separate thread so that a child that never
                // drains its stdin can't deadlock the test.
                let writer =
                    thread::spawn(move || child_stdin.write_all(&bytes));
                let output = child.wait_with_output().unwrap();
                writer.join().unwrap().unwrap();
                output
            }
        };
        Snapshot::new(self, &output)
    }

    /// Returns the info for this command.
    fn info(&self) -> CommandInfo {
        let bin = {
            let path = Path::new(&self.bin)
                .file_name()
                .unwrap_or(OsStr::new("{UNKNOWN}"));
            let mut bin = path.to_string_lossy().into_owned();
            if bin.ends_with(EXE_SUFFIX) {
                bin.truncate(bin.len() - EXE_SUFFIX.len());
            }
            bin
        };
        CommandInfo {
            bin,
            args: self
                .args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect(),
            env: self
                .envs
                .iter()
                .map(|(k, v)| {
                    (
                        k.to_string_lossy().into_owned(),
                        v.to_string_lossy().into_owned(),
                    )
                })
                .collect(),
            stdin: self.stdin.as_deref().map(bytes_to_string),
        }
    }
}

/// Information about a particular command.
///
/// This is fed into `insta` as contextual information that doesn't appear
/// directly in the snapshot, but instead in the `cargo insta review` user
/// interface.
#[derive(Clone, Debug, serde::Serialize)]
pub struct CommandInfo {
    bin: String,
    args: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    env: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdin: Option<String>,
}

/// Return a command prepared to execute the binary with the given name.
pub fn bin(name: &str) -> Command {
    Command::new(bin_path(name))
}

/// Returns a path to the Cargo project binary with the given name.
fn bin_path(name: &str) -> PathBuf {
    std::env::current_exe()
        .unwrap()
        .parent()
        .expect("executable's directory")
        .parent()
        .expect("target profile directory")
        .join(format!("{name}{}", EXE_SUFFIX))
}

/// Turns a slice of bytes into a human readable string.
///
/// Invalid UTF-8 is replaced rather than escaped; nothing in this test
/// suite deals in binary output.
fn bytes_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

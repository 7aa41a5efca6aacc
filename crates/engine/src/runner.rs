use crate::error::Error;
use crate::event::{StreamEvent, StreamSource};
use crate::executable::Executable;
use config::{Config, OutputLevel};
use std::collections::BTreeSet;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace, warn};

/// What became of a single invocation.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The canonical command line that was (or would have been) executed,
    /// executable path first.
    pub command: Vec<String>,

    /// `None` when the child could not be launched at all (missing binary,
    /// permission denied). That case is deliberately not an error here;
    /// the interpretation layer folds it into the ambiguous-failure
    /// branch.
    pub status: Option<ExitStatus>,
}

impl RunReport {
    pub fn exit_code(&self) -> Option<i32> {
        self.status.and_then(|status| status.code())
    }

    pub fn success(&self) -> bool {
        self.status.is_some_and(|status| status.success())
    }
}

/// Builds a canonical command line for a permitted executable, spawns it,
/// and drains both output pipes concurrently until the child exits.
///
/// Each invocation is self-contained: no state is shared across runs and
/// no timeout is enforced, so a hung scanner blocks its caller.
pub struct CommandRunner<'a> {
    config: &'a Config,
}

impl<'a> CommandRunner<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// The canonical command line for the given executable and caller
    /// arguments.
    ///
    /// Caller arguments are unioned with the configuration's default
    /// arguments, deduplicated, and sorted, so identical inputs yield an
    /// identical line regardless of the order they were supplied in. The
    /// resolved executable path always comes first.
    pub fn command_line(&self, executable: Executable, args: &[String]) -> Vec<String> {
        let mut set: BTreeSet<String> = args.iter().cloned().collect();
        set.extend(self.default_args());

        let mut command = Vec::with_capacity(set.len() + 1);
        command.push(
            executable
                .resolve(&self.config.scanner)
                .display()
                .to_string(),
        );
        command.extend(set);
        command
    }

    fn default_args(&self) -> Vec<String> {
        let scanner = &self.config.scanner;
        let mut args = Vec::new();
        if scanner.daemonize
            && let Some(config_file) = &scanner.config_file
        {
            args.push(format!("--config-file={}", config_file.display()));
        }
        match self.config.output.level {
            OutputLevel::Off => {}
            OutputLevel::Low => args.push("--quiet".to_string()),
            OutputLevel::High => args.push("--verbose".to_string()),
        }
        args
    }

    /// Run an executable by name. Names outside the permitted set fail
    /// with [`Error::NotPermitted`] before any process is spawned.
    pub async fn run_named(
        &self,
        name: &str,
        args: &[String],
        events: Option<UnboundedSender<StreamEvent>>,
    ) -> Result<RunReport, Error> {
        let executable: Executable = name.parse()?;
        self.run(executable, args, events).await
    }

    /// Spawn the executable and block until it exits and both output
    /// streams have been read to end-of-file.
    ///
    /// stdin is closed immediately; the scanner never reads input and
    /// must not stall waiting for it. stdout and stderr are drained on
    /// independent tasks so neither pipe can fill and block the child.
    /// Every line is echoed to the corresponding local stream unless the
    /// output level is `off`, and forwarded to `events` when supplied.
    /// Both drain tasks are joined before the exit status is reported, so
    /// a detection line flushed just before exit is never lost.
    pub async fn run(
        &self,
        executable: Executable,
        args: &[String],
        events: Option<UnboundedSender<StreamEvent>>,
    ) -> Result<RunReport, Error> {
        let command = self.command_line(executable, args);
        debug!(?command, "running scanner command");

        let mut child = match Command::new(&command[0])
            .args(&command[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                warn!(%executable, %err, "failed to launch");
                return Ok(RunReport {
                    command,
                    status: None,
                });
            }
        };

        let echo = self.config.output.level != OutputLevel::Off;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let out_handle =
            tokio::spawn(drain(stdout, StreamSource::Stdout, echo, events.clone()));
        let err_handle = tokio::spawn(drain(stderr, StreamSource::Stderr, echo, events));

        let status = child.wait().await?;
        let _ = out_handle.await;
        let _ = err_handle.await;

        Ok(RunReport {
            command,
            status: Some(status),
        })
    }
}

/// Read a child pipe line by line until end-of-file. Read errors end this
/// drain only; the other stream and the run itself carry on.
#[allow(clippy::print_stdout, clippy::print_stderr)]
async fn drain<R>(
    stream: Option<R>,
    source: StreamSource,
    echo: bool,
    events: Option<UnboundedSender<StreamEvent>>,
) where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return;
    };
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if echo {
                    match source {
                        StreamSource::Stdout => println!("{line}"),
                        StreamSource::Stderr => eprintln!("{line}"),
                    }
                }
                if let Some(events) = &events {
                    // The consumer may have hung up; draining continues
                    // regardless.
                    let _ = events.send(StreamEvent { source, line });
                }
            }
            Ok(None) => break,
            Err(err) => {
                trace!(?source, %err, "stream read error");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn runner_config() -> Config {
        let mut config = Config::default();
        config.output.level = OutputLevel::Off;
        config
    }

    #[test]
    fn executable_path_comes_first() {
        let mut config = runner_config();
        config.scanner.executable_path_clamscan = PathBuf::from("/usr/bin/clamscan");
        let runner = CommandRunner::new(&config);

        let line = runner.command_line(Executable::Scan, &["--no-summary".to_string()]);
        assert_eq!(line, vec!["/usr/bin/clamscan", "--no-summary"]);
    }

    #[test]
    fn arguments_are_deduplicated_and_sorted() {
        let config = runner_config();
        let runner = CommandRunner::new(&config);

        let line = runner.command_line(
            Executable::Scan,
            &[
                "--no-summary".to_string(),
                "--fdpass".to_string(),
                "--no-summary".to_string(),
            ],
        );
        assert_eq!(line, vec!["clamscan", "--fdpass", "--no-summary"]);
    }

    #[test]
    fn quiet_and_verbose_follow_the_output_level() {
        let mut config = runner_config();
        config.output.level = OutputLevel::Low;
        let runner = CommandRunner::new(&config);
        assert!(
            runner
                .command_line(Executable::Scan, &[])
                .contains(&"--quiet".to_string())
        );

        config.output.level = OutputLevel::High;
        let runner = CommandRunner::new(&config);
        assert!(
            runner
                .command_line(Executable::Scan, &[])
                .contains(&"--verbose".to_string())
        );
    }

    #[test]
    fn config_file_flag_requires_daemon_mode() {
        let mut config = runner_config();
        config.scanner.config_file = Some(PathBuf::from("/etc/clamav/clamd.conf"));
        let runner = CommandRunner::new(&config);
        assert_eq!(runner.command_line(Executable::Scan, &[]).len(), 1);

        config.scanner.daemonize = true;
        let runner = CommandRunner::new(&config);
        assert_eq!(
            runner.command_line(Executable::DaemonScan, &[]),
            vec!["clamdscan", "--config-file=/etc/clamav/clamd.conf"]
        );
    }

    #[tokio::test]
    async fn unknown_names_fail_before_spawn() {
        let config = runner_config();
        let runner = CommandRunner::new(&config);

        let err = runner.run_named("shred", &[], None).await.unwrap_err();
        assert!(matches!(err, Error::NotPermitted(name) if name == "shred"));
    }

    proptest! {
        /// The emitted command line is independent of the order the extra
        /// arguments were supplied in.
        #[test]
        fn command_line_is_order_independent(
            mut args in proptest::collection::vec("[a-z-]{1,12}", 0..8),
            seed in any::<u64>(),
        ) {
            let config = runner_config();
            let runner = CommandRunner::new(&config);
            let sorted = runner.command_line(Executable::Scan, &args);

            // cheap deterministic shuffle
            let len = args.len().max(1);
            for i in 0..args.len() {
                let j = (seed as usize).wrapping_mul(i + 1) % len;
                args.swap(i, j);
            }
            let shuffled = runner.command_line(Executable::Scan, &args);

            prop_assert_eq!(sorted.clone(), shuffled);
            prop_assert_eq!(&sorted[0], "clamscan");
            let mut rest = sorted[1..].to_vec();
            rest.sort();
            prop_assert_eq!(rest, sorted[1..].to_vec());
        }
    }
}

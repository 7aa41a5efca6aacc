mod cli;

use clap::Parser;
use cli::{Cli, Command};
use config::Config;
use engine::{Clamav, Error};
use tracing::{debug, error, trace};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // NOTE: The verbosity flag takes precedence over the environment
    // variable for log control; `CLAMWRAP_LOG` can only set the level per
    // crate, not override the flag.
    let env_filter = EnvFilter::builder()
        .with_env_var("CLAMWRAP_LOG")
        .from_env()?
        .add_directive(cli.verbosity.log_level_filter().as_str().parse()?);

    let layer = tracing_subscriber::fmt::layer()
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .init();

    // load config
    let config = match &cli.conffile {
        Some(path) => Config::load(path)?,
        _ => {
            let mut candidates = glob::glob("/etc/clamwrap/config.d/*.toml")?
                .filter_map(Result::ok)
                .collect::<Vec<_>>();
            candidates.insert(0, "/etc/clamwrap/config.toml".into());
            trace!(?candidates, "config file candidates");
            Config::load_multiple(candidates)?
        }
    };
    debug!(?config, ?cli);

    let clamav = Clamav::new(&config);
    let code = match cli.command {
        Command::Scan { path } => match clamav.scan(&path).await {
            Ok(verdict) => {
                debug!(?verdict, "scan finished");
                if verdict.is_clean() { 0 } else { 1 }
            }
            Err(err @ Error::VirusDetected { .. }) => {
                error!("{err}");
                1
            }
            Err(err @ Error::ClamscanClient) => {
                error!("{err}");
                2
            }
            Err(err) => return Err(err.into()),
        },
        Command::Version => match clamav.version().await? {
            Some(version) => {
                print_line(&version);
                0
            }
            None => {
                error!("no version available");
                1
            }
        },
        Command::Update => {
            let report = clamav.update().await?;
            if report.success() {
                0
            } else {
                error!(code = ?report.exit_code(), "freshclam failed");
                report.exit_code().unwrap_or(1)
            }
        }
    };

    std::process::exit(code);
}

// stdout is the contract for `version`; everything else goes through
// tracing.
#[allow(clippy::print_stdout)]
fn print_line(line: &str) {
    println!("{line}");
}

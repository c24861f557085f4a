use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use rerun::config::RunConfig;
use rerun::filter::PathFilter;
use rerun::log_event;
use rerun::logging;
use rerun::pipeline::Pipeline;

/// Watch directories and re-run a command when files change.
#[derive(Debug, Parser)]
#[command(
    name = "rerun",
    version,
    about = "Re-run a command when watched files change",
    after_help = "Changed file paths are appended to the command's arguments unless -s 0 \
                  is given. RERUN_BLACKLIST extends the built-in basename blacklist with \
                  colon-separated regular expressions."
)]
struct Cli {
    /// Quiet period before a pending batch triggers the command
    #[arg(
        short = 'w',
        long = "wait",
        value_name = "DURATION",
        default_value = "100ms"
    )]
    wait: humantime::Duration,

    /// Soft max number of changed files passed to the command; 0 disables
    /// passing files entirely
    #[arg(short = 's', long = "size", value_name = "COUNT", default_value_t = 42)]
    size: usize,

    /// Clear the terminal before each run
    #[arg(short = 'c', long = "clear")]
    clear: bool,

    /// Directory to watch; repeat for multiple (default: current directory)
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    dirs: Vec<PathBuf>,

    /// The command to run and its base arguments
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    command: Vec<String>,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        let watch_dirs = if cli.dirs.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            cli.dirs
        };
        RunConfig {
            watch_dirs,
            quiet_period: cli.wait.into(),
            size_threshold: cli.size,
            clear_terminal: cli.clear,
            command: cli.command,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli.into()).await {
        Ok(()) => {
            log_event!("rerun", "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: RunConfig) -> anyhow::Result<()> {
    let filter = PathFilter::from_env().context("compiling blacklist")?;
    let pipeline = Pipeline::start(config, filter).context("starting pipeline")?;

    // The interrupt signal is the sole shutdown trigger; it closes the
    // source end and lets closure drain through the stages.
    let canceller = pipeline.canceller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log_event!("rerun", "interrupt", "shutting down");
            canceller.close();
        }
    });

    pipeline.wait().await;
    Ok(())
}

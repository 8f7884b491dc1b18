//! treemirror - Periodic one-way directory mirroring.
//!
//! Usage:
//!   treemirror SOURCE REPLICA INTERVAL LOGFILE     Mirror every INTERVAL seconds
//!   treemirror SOURCE REPLICA INTERVAL LOGFILE --once
//!   treemirror --help                             Show help

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Context, Result, bail};

use treemirror_core::MirrorConfig;
use treemirror_daemon::logging;

#[derive(Parser)]
#[command(
    name = "treemirror",
    version,
    about = "Keep a replica directory identical to a source directory",
    long_about = "treemirror copies new and changed files from SOURCE to REPLICA and \
                  removes anything in REPLICA that SOURCE does not have, repeating \
                  every INTERVAL seconds until interrupted with Ctrl-C."
)]
struct Cli {
    /// Source directory (created if missing)
    source: PathBuf,

    /// Replica directory (created if missing)
    replica: PathBuf,

    /// Seconds to wait between passes
    interval: u64,

    /// File to append mutation events to
    logfile: PathBuf,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,

    /// Report what would change without touching the replica
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Do not copy modification times onto replica files
    #[arg(long)]
    no_preserve_timestamps: bool,

    /// Cancel a pass that runs longer than this many seconds
    #[arg(long, value_name = "SECS", env = "TREEMIRROR_TIMEOUT")]
    timeout: Option<u64>,

    /// Increase diagnostic output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let mut builder = MirrorConfig::builder();
    builder
        .source(cli.source)
        .replica(cli.replica)
        .interval(Duration::from_secs(cli.interval))
        .log_file(cli.logfile)
        .dry_run(cli.dry_run)
        .preserve_timestamps(!cli.no_preserve_timestamps)
        .run_once(cli.once);
    if let Some(secs) = cli.timeout {
        builder.pass_timeout(Duration::from_secs(secs));
    }
    let config = builder.build().context("Invalid arguments")?;

    logging::init_from_config(&config, cli.verbose).context("Failed to set up logging")?;

    if !config.run_once {
        println!("press ctrl+c to exit program.");
    }

    let stats = treemirror_daemon::run(config).context("Mirroring stopped")?;

    if cli.once && stats.passes_failed > 0 {
        bail!("Pass failed, see the log for details");
    }

    Ok(())
}

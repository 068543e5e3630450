use clap::{Parser, Subcommand};

/// herald — market-intelligence alert evaluation and dispatch worker.
#[derive(Parser, Debug)]
#[command(name = "herald", version, about)]
pub struct Cli {
    /// Path to the herald config file.
    #[arg(long, env = "HERALD_CONFIG", default_value = "config/herald.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one evaluation + dispatch cycle from a snapshot file.
    Cycle {
        /// Snapshot JSON file, or `-` to read from stdin.
        #[arg(long, env = "HERALD_SNAPSHOT")]
        snapshot: String,

        /// Log the message instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Poll a snapshot file on a fixed period and run cycles until Ctrl-C.
    Watch {
        /// Snapshot JSON file, re-read each tick.
        #[arg(long, env = "HERALD_SNAPSHOT")]
        snapshot: String,

        /// Poll period override in seconds (defaults to worker.interval_secs).
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Log messages instead of sending them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Load and validate the config, then print a redacted summary.
    CheckConfig,
}

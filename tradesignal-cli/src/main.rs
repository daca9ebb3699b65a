//! tradesignal CLI: features, labels and trading signals from bar data.
//!
//! Commands:
//! - `features`: latest feature record per symbol
//! - `signals`: scored and explained trading signals
//! - `labels`: labeled training rows and their class balance
//!
//! Output is JSON on stdout; logs go to stderr (`RUST_LOG` overrides the
//! default `info` filter).

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tradesignal_cli::commands::{self, BarSource, SignalOptions};
use tradesignal_cli::data::parse_timestamp;
use tradesignal_core::ScoringStrategy;

#[derive(Parser)]
#[command(
    name = "tradesignal",
    about = "Technical-indicator features and trading signals"
)]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// CSV with columns symbol,timestamp,open,high,low,close,volume.
    #[arg(long, conflicts_with = "synthetic")]
    bars: Option<PathBuf>,

    /// Generate deterministic synthetic bars for these symbols.
    #[arg(long, num_args = 1..)]
    synthetic: Vec<String>,

    /// Bars per synthetic symbol.
    #[arg(long, default_value_t = 250)]
    synthetic_bars: usize,
}

impl InputArgs {
    fn source(self) -> Result<BarSource> {
        match (self.bars, self.synthetic.is_empty()) {
            (Some(path), _) => Ok(BarSource::Csv(path)),
            (None, false) => Ok(BarSource::Synthetic {
                symbols: self.synthetic,
                bars: self.synthetic_bars,
            }),
            (None, true) => bail!("provide --bars FILE or --synthetic SYMBOL..."),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the latest feature record for each symbol.
    Features {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Score every symbol and print trading signals.
    Signals {
        #[command(flatten)]
        input: InputArgs,

        /// Scoring strategy: rule or classifier. Overrides the config file.
        #[arg(long)]
        strategy: Option<ScoringStrategy>,

        /// Include per-action probabilities when the scorer reports them.
        #[arg(long, default_value_t = false)]
        probabilities: bool,

        /// Evaluation instant (RFC 3339 or YYYY-MM-DD). Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Build labeled training rows from bar history.
    Labels {
        #[command(flatten)]
        input: InputArgs,

        /// Print only the label distribution.
        #[arg(long, default_value_t = false)]
        summary: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Features { input } => {
            let histories = input.source()?.load()?;
            emit(&commands::features(&config, &histories), cli.pretty)
        }
        Commands::Signals {
            input,
            strategy,
            probabilities,
            at,
        } => {
            let histories = input.source()?.load()?;
            let options = SignalOptions {
                strategy,
                probabilities,
                at: at.as_deref().map(parse_timestamp).transpose()?,
            };
            emit(&commands::signals(&config, &histories, &options)?, cli.pretty)
        }
        Commands::Labels { input, summary } => {
            let histories = input.source()?.load()?;
            emit(&commands::labels(&config, &histories, summary), cli.pretty)
        }
    }
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

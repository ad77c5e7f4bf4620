//! CLI entry point for the feed replay tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use decibook_replay::config::Config;
use decibook_replay::feed;
use decibook_replay::replay::Replay;

#[derive(Parser)]
#[command(name = "replay")]
#[command(about = "Replay recorded order book feeds through decibook")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a feed and print the final books
    Run {
        /// Path to a JSON-lines feed
        feed: PathBuf,
    },

    /// Validate a feed: report rejected rows and stale messages
    Check {
        /// Path to a JSON-lines feed
        feed: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(&cli.config).context("loading config")?;

    match &cli.command {
        Command::Run { feed } => {
            let replay = replay_feed(&config, feed)?;
            print!("{}", replay.render()?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { feed } => {
            let replay = replay_feed(&config, feed)?;
            let summary = replay.summary();

            println!(
                "{} messages ({} snapshots, {} deltas), {} symbols",
                summary.messages,
                summary.snapshots,
                summary.deltas,
                replay.books().len()
            );
            println!("stale messages skipped: {}", summary.skipped_stale);
            println!("rejected rows: {}", summary.rejected.len());
            for (line, rejected) in &summary.rejected {
                println!(
                    "  line {line}: {} row {}: {}",
                    rejected.side, rejected.index, rejected.error
                );
            }

            if summary.rejected.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(2))
            }
        }
    }
}

fn replay_feed<'a>(config: &'a Config, path: &Path) -> anyhow::Result<Replay<'a>> {
    let messages = feed::load(path).with_context(|| format!("loading feed {}", path.display()))?;
    let mut replay = Replay::new(config);
    replay.apply_all(&messages)?;
    Ok(replay)
}

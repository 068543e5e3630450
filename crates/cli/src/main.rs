//! herald — market-intelligence alert worker.
//!
//! One invocation of `cycle` runs a single evaluate + dispatch pass over
//! a snapshot file; `watch` polls the file on a fixed period against the
//! same in-memory state. Cooldown and dedup state is process-local: run
//! exactly one herald instance per delivery channel.

mod cli;
mod context;

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use herald_core::config::ChannelConfig;
use herald_core::{HeraldConfig, Snapshot};
use herald_notify::console::ConsoleChannel;
use herald_notify::telegram::TelegramChannel;
use herald_notify::webhook::WebhookChannel;
use herald_notify::{Channel, Dispatcher};
use herald_rules::AlertEngine;

use crate::cli::{Cli, Command};
use crate::context::context_map_from_snapshot;

#[tokio::main]
async fn main() -> Result<()> {
    herald_core::config::load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = HeraldConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config))?;

    match cli.command {
        Command::CheckConfig => {
            config.log_summary();
            Ok(())
        }
        Command::Cycle { snapshot, dry_run } => {
            let snap = read_snapshot(&snapshot)?;
            let mut engine = AlertEngine::in_memory(config.alerts.clone());
            let mut dispatcher =
                Dispatcher::in_memory(build_channel(&config.channel, dry_run)?, config.alerts.cooldown());
            run_cycle(&mut engine, &mut dispatcher, &config, &snap).await;
            Ok(())
        }
        Command::Watch {
            snapshot,
            interval_secs,
            dry_run,
        } => {
            let period = interval_secs.unwrap_or(config.worker.interval_secs);
            watch(&config, &snapshot, period, dry_run).await
        }
    }
}

/// Poll the snapshot file every `period_secs`, evaluating each advance of
/// the cycle timestamp against the same process-lifetime state.
async fn watch(config: &HeraldConfig, path: &str, period_secs: u64, dry_run: bool) -> Result<()> {
    let mut engine = AlertEngine::in_memory(config.alerts.clone());
    let mut dispatcher =
        Dispatcher::in_memory(build_channel(&config.channel, dry_run)?, config.alerts.cooldown());

    config.log_summary();
    info!(path, period_secs, "watch started");

    let mut last_seen = None;
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(period_secs));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("watch stopped");
                return Ok(());
            }
            _ = ticker.tick() => {
                let snap = match read_snapshot(path) {
                    Ok(snap) => snap,
                    Err(e) => {
                        warn!(error = %e, path, "snapshot unreadable, skipping tick");
                        continue;
                    }
                };
                if last_seen.is_some_and(|seen| snap.captured_at <= seen) {
                    continue;
                }
                last_seen = Some(snap.captured_at);
                run_cycle(&mut engine, &mut dispatcher, config, &snap).await;
            }
        }
    }
}

async fn run_cycle(
    engine: &mut AlertEngine,
    dispatcher: &mut Dispatcher,
    config: &HeraldConfig,
    snapshot: &Snapshot,
) {
    let candidates = engine.evaluate(snapshot);
    if candidates.is_empty() {
        info!(at = %snapshot.captured_at, "cycle complete, no candidates");
        return;
    }

    let contexts = context_map_from_snapshot(snapshot, &config.worker.symbol);
    let outcomes = dispatcher.dispatch(&candidates, &contexts).await;

    for outcome in &outcomes {
        match (outcome.dispatched, &outcome.reason) {
            (true, _) => info!(
                kind = %outcome.kind,
                message_id = ?outcome.message_id,
                "dispatched"
            ),
            (false, Some(reason)) => info!(kind = %outcome.kind, %reason, "not dispatched"),
            (false, None) => {}
        }
    }
}

fn read_snapshot(path: &str) -> Result<Snapshot> {
    let raw = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read snapshot from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot file {path}"))?
    };
    serde_json::from_str(&raw).context("failed to parse snapshot JSON")
}

fn build_channel(config: &ChannelConfig, dry_run: bool) -> Result<Box<dyn Channel>> {
    if dry_run {
        return Ok(Box::new(ConsoleChannel::new()));
    }
    let channel: Box<dyn Channel> = match config {
        ChannelConfig::Telegram {
            bot_token,
            chat_id,
            parse_mode,
        } => Box::new(TelegramChannel::from_config(
            bot_token.clone(),
            chat_id.clone(),
            parse_mode.clone(),
        )?),
        ChannelConfig::Webhook {
            url,
            method,
            headers,
        } => Box::new(WebhookChannel::from_config(
            url.clone(),
            method.clone(),
            headers.clone(),
        )?),
        ChannelConfig::Console {} => Box::new(ConsoleChannel::new()),
    };
    Ok(channel)
}

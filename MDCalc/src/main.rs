mod cli;
mod report;
mod session;

use anyhow::Result;
use cli::Options;
use mdcconfig::{Config, get_config};
use mdcledger::{Ledger, ThresholdBanner};
use mdcprobe::LoftyResolver;
use session::Session;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::from_env()?;
    if options.help {
        print!("{}", cli::USAGE);
        return Ok(());
    }

    let config = match &options.config_dir {
        Some(dir) => Arc::new(Config::load_config(dir)?),
        None => get_config()?,
    };
    init_tracing(&config.get_log_min_level());
    info!(config_dir = %config.config_directory(), "Configuration loaded");

    let timeout = match options.timeout_secs {
        Some(secs) if secs > 0.0 => Some(Duration::from_secs_f64(secs)),
        Some(_) => None,
        None => config.get_resolve_timeout(),
    };
    let mut ledger = Ledger::new().with_resolve_timeout(timeout);
    ledger.set_rate(config.charge_rate());
    if let Some(rate) = &options.rate {
        ledger.set_rate_input(rate);
    }

    let banner = if options.no_banner {
        ThresholdBanner::disabled()
    } else {
        config.banner()
    };

    let resolver = LoftyResolver::new();

    // ========== Initial batch ==========
    if !options.files.is_empty() {
        session::ingest_paths(&mut ledger, &options.files, &resolver).await;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if options.interactive {
        let mut session = Session::new(ledger, &resolver, banner);
        write!(out, "{}", session::HELP)?;
        out.flush()?;
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        session.run(stdin, &mut out).await?;
        return Ok(());
    }

    let summary = ledger.summary(&banner);
    if options.json {
        report::render_json(&summary, &mut out)?;
    } else {
        report::render(&summary, &mut out)?;
    }
    Ok(())
}

/// Logs go to stderr; `RUST_LOG` wins over the configured level.
fn init_tracing(min_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(min_level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

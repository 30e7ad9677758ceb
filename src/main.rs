//! Codox Signals - Signal Generation & Market Regime Engine
//!
//! Driver binary: scheduled analysis loop and one-shot JSON commands.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use codox_signals::adapters::cli::{self, AnalyzeCmd, Command, RegimeCmd, RunCmd};
use codox_signals::adapters::{JsonFileMarketData, StaticSentiment};
use codox_signals::application::{
    AnalysisEngine, AnalysisOrchestrator, OrchestratorSettings, SignalCache, TimeframeWindow,
};
use codox_signals::config::{load_config, Config};
use codox_signals::ports::MarketDataPort;
use codox_signals::strategy::EngineParams;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (CODOX_DATA_DIR, RUST_LOG)
    dotenvy::dotenv().ok();

    let app = cli::init();
    let config = load_config(app.command.config_path()).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            app.command.config_path().display()
        )
    })?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd, config).await,
        Command::Analyze(cmd) => analyze_command(cmd, config).await,
        Command::Regime(cmd) => regime_command(cmd, config).await,
    }
}

fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
    };

    fmt().with_env_filter(filter).with_target(false).init();
    Ok(())
}

fn build_engine(config: &Config) -> Result<Arc<AnalysisEngine>> {
    let cache = SignalCache::with_capacity(config.orchestrator.cache_max_entries);
    let engine = AnalysisEngine::with_cache(EngineParams::from(config), cache)
        .context("Invalid engine parameters")?;
    Ok(Arc::new(engine))
}

fn data_dir(config: &Config, cli_override: Option<PathBuf>) -> PathBuf {
    cli_override.unwrap_or_else(|| config.data.get_data_dir())
}

async fn run_command(cmd: RunCmd, config: Config) -> Result<()> {
    tracing::info!("Starting codox-signals...");

    let engine = build_engine(&config)?;
    let feed = JsonFileMarketData::new(data_dir(&config, cmd.data_dir));
    tracing::info!("Reading bars from {}", feed.data_dir().display());

    let mut orchestrator = AnalysisOrchestrator::new(
        engine,
        Arc::new(feed),
        OrchestratorSettings::from(&config),
    )
    .context("Failed to create orchestrator")?
    .with_sentiment(Arc::new(StaticSentiment::from(&config.sentiment)));

    if let Some(secs) = cmd.interval {
        orchestrator = orchestrator.with_poll_interval(Duration::from_secs(secs.max(1)));
    }

    // Setup Ctrl+C handler
    let orch = orchestrator.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        orch.stop().await;
    });

    orchestrator.run().await?;
    tracing::info!("codox-signals stopped");
    Ok(())
}

async fn analyze_command(cmd: AnalyzeCmd, config: Config) -> Result<()> {
    let engine = build_engine(&config)?;
    let feed = JsonFileMarketData::new(data_dir(&config, cmd.data_dir));
    let symbol = cmd.symbol.to_uppercase();

    let mut windows = Vec::new();
    for &timeframe in &engine.params().timeframes {
        match feed.fetch_bars(&symbol, timeframe).await {
            Ok(bars) => windows.push(TimeframeWindow::from_bars(timeframe, bars)),
            Err(e) => tracing::warn!("Skipping {} {}: {}", symbol, timeframe, e),
        }
    }
    if windows.is_empty() {
        anyhow::bail!("No bar data found for {} in {}", symbol, feed.data_dir().display());
    }

    let signals = engine.generate_signals(&symbol, &windows);
    let sentiment = if cmd.no_sentiment {
        None
    } else {
        let source = StaticSentiment::from(&config.sentiment);
        Some(engine.analyze_sentiment(&symbol, &source).await)
    };

    let output = serde_json::json!({
        "symbol": symbol,
        "signals": signals,
        "sentiment": sentiment,
    });
    print_json(&output, cmd.pretty)
}

async fn regime_command(cmd: RegimeCmd, config: Config) -> Result<()> {
    let mut params = EngineParams::from(&config);
    if let Some(reference) = cmd.reference {
        params = params.with_reference_symbol(reference.to_uppercase());
    }
    let engine = AnalysisEngine::new(params).context("Invalid engine parameters")?;
    let feed = JsonFileMarketData::new(data_dir(&config, cmd.data_dir));

    let reference = engine.params().reference_symbol.clone();
    let bars = feed
        .fetch_bars(&reference, config.orchestrator.regime_timeframe)
        .await
        .with_context(|| format!("Failed to load reference series for {}", reference))?;

    let mut market = HashMap::new();
    market.insert(reference, bars);
    let regime = engine.detect_market_regime(&market);

    print_json(&regime, cmd.pretty)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

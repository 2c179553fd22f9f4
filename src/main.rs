use autotrader::config::Config;
use autotrader::execution::Driver;
use autotrader::gateway::BridgeGateway;
use autotrader::telemetry::TradeLog;
use autotrader::Result;

// The loop is strictly sequential; one worker thread is all it ever uses.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    tracing::info!("starting trading system");

    let config = Config::from_env();
    tracing::info!(
        symbol = %config.symbol,
        volume = config.volume,
        timeframe = %config.timeframe,
        sma_period = config.sma_period,
        deviation = config.deviation,
        poll_interval_secs = config.poll_interval.as_secs(),
        error_backoff_secs = config.error_backoff.as_secs(),
        "configuration"
    );

    let gateway = BridgeGateway::new(&config.bridge_url);
    if let Err(e) = gateway.initialize().await {
        tracing::error!("terminal initialization failed: {}", e);
        return Err(e.into());
    }
    tracing::info!("terminal initialized successfully");

    let mut trade_log = TradeLog::create_in(&config.log_dir)?;
    tracing::info!("trade data file: {}", trade_log.path().display());

    let driver = Driver::new(config);
    driver.run(&gateway, &gateway, &mut trade_log).await;

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autotrader=info".into()),
        )
        .init();
}

use anyhow::Result;
use liquidity_monitor::{
    chain::{MarketSource, MoolahClient},
    clock::{Clock, SystemClock},
    config::AppConfig,
    fetcher::MarketStateFetcher,
    monitor::Monitor,
    notify::{NotificationSender, Notifier, TelegramNotifier},
    retry::RetryPolicy,
    units::{UnitConverter, format_amount},
    utils,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();
    let shutdown = utils::listen_for_shutdown();

    // Configuration
    let config = AppConfig::load()?;
    tracing::info!(
        loan = %config.loan_symbol,
        collateral = %config.collateral_symbol,
        threshold = %format_amount(&config.threshold, 0),
        "[INIT] liquidity-monitor starting"
    );
    tracing::info!(
        market = %config.market_id,
        moolah = ?config.moolah_address,
        loan_token = ?config.loan_token,
        collateral_token = ?config.collateral_token,
        "[INIT] market"
    );

    // Startup failures below abort the process before any heartbeat exists
    let chain = Arc::new(MoolahClient::connect(&config.rpc_url, config.moolah_address).await?);
    let converter = UnitConverter::load(&*chain, config.loan_token).await?;
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(&config.telegram)?);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let source: Arc<dyn MarketSource> = chain;
    let fetcher = MarketStateFetcher::new(
        source,
        config.market_id,
        RetryPolicy::MARKET_FETCH,
        clock.clone(),
    );
    let sender = NotificationSender::new(notifier, RetryPolicy::NOTIFICATION, clock.clone());

    let mut monitor = Monitor::new(
        fetcher,
        sender,
        converter,
        config.monitor_settings(),
        clock,
    );
    monitor.run(shutdown).await;

    tracing::info!("[EXIT] liquidity-monitor stopped");
    Ok(())
}

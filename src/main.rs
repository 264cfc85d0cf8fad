use anyhow::Result;
use dex_price_logger::{
    core::shutdown::shutdown_signal, display::logger, PresetConfig, PriceFormatter, Settings,
    StreamerBuilder,
};
use dotenv::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env first so RUST_LOG from it applies
    dotenv().ok();
    logger::init();

    let settings = Settings::from_env();
    let formatter = PriceFormatter::new(&settings.target);

    let mut builder = StreamerBuilder::new(PresetConfig::pumpfun_trending());
    if let Some(url) = &settings.feed_url {
        builder = builder.url(url);
    }

    info!("Watching price of {}", settings.target);

    let runner = builder.on_data(move |data| formatter.display(&data));

    tokio::select! {
        result = runner.start() => result?,
        _ = shutdown_signal() => info!("Shutting down..."),
    }

    Ok(())
}

use anyhow::Result;
use dex_price_logger::{
    core::{
        bridge::{self, Bridge},
        shutdown::shutdown_signal,
    },
    display::logger,
    Settings,
};
use dotenv::dotenv;
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    logger::init();

    // DEX_URL wins over the first CLI argument
    let settings = Settings::from_lookup_with_upstream(|key| env::var(key).ok(), env::args().nth(1));

    info!("DexScreener worker started");

    let listener = bridge::bind(&settings.bridge_addr).await?;
    info!("Local WS server started on ws://{}", listener.local_addr()?);

    let bridge = Bridge::new();
    bridge
        .run(&settings.upstream_url, listener, shutdown_signal())
        .await?;

    info!("Shutting down worker...");
    Ok(())
}

//! # DEX Price Logger
//!
//! Subscribes to a DexScreener screener feed, finds one target token in every
//! delivered batch and logs its price with a millisecond timestamp.
//!
//! ## Features
//!
//! - Callback-driven feed subscription
//! - Current token batches and legacy trading-pair lists
//! - Case-insensitive lookup by pair address, token address or symbol
//! - Feed presets (Solana trending, pump.fun trending)
//! - Local relay (`dex_bridge`) that re-broadcasts an upstream feed
//!
//! ## Example
//!
//! ```rust,no_run
//! use dex_price_logger::{PresetConfig, PriceFormatter, StreamerBuilder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let formatter = PriceFormatter::new("BONK");
//!
//!     StreamerBuilder::new(PresetConfig::pumpfun_trending())
//!         .on_data(move |data| formatter.display(&data))
//!         .start()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod display;
pub mod error;
pub mod types;

use anyhow::Result;

pub use config::{PresetConfig, Settings, TARGET_TOKEN};
pub use display::formatter::PriceFormatter;
pub use error::StreamError;
pub use types::{PriceData, StreamData, TokenBatch, TokenProfile, TradingPair};

use crate::core::streamer::FeedStreamer;

/// Builder for configuring and starting a feed subscription
pub struct StreamerBuilder {
    preset: PresetConfig,
    url: Option<String>,
}

impl StreamerBuilder {
    /// Create a builder subscribing with the given preset
    pub fn new(preset: PresetConfig) -> Self {
        Self { preset, url: None }
    }

    /// Subscribe to an explicit URL instead of the preset's
    ///
    /// # Example
    /// ```rust,no_run
    /// use dex_price_logger::{PresetConfig, StreamerBuilder};
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// StreamerBuilder::new(PresetConfig::solana_trending())
    ///     .url("ws://127.0.0.1:9999")
    ///     .on_data(|data| println!("{} record(s)", data.len()))
    ///     .start()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// URL the subscription will connect to
    pub fn feed_url(&self) -> String {
        self.url.clone().unwrap_or_else(|| self.preset.to_url())
    }

    /// Set the callback invoked once per delivered batch
    ///
    /// The callback runs on the streaming task, so it must stay short.
    pub fn on_data<F>(self, callback: F) -> StreamerRunner<F>
    where
        F: Fn(StreamData) + Send + Sync + 'static,
    {
        StreamerRunner {
            builder: self,
            callback,
        }
    }
}

/// Runner that holds the callback and starts the subscription
pub struct StreamerRunner<F> {
    builder: StreamerBuilder,
    callback: F,
}

impl<F> StreamerRunner<F>
where
    F: Fn(StreamData) + Send + Sync + 'static,
{
    /// Stream until the feed closes. Connection and transport errors are returned.
    pub async fn start(self) -> Result<()> {
        let streamer = FeedStreamer::new(self.builder.feed_url());
        streamer.start(self.callback).await?;
        Ok(())
    }
}

use std::env;
use std::fmt::Write;

/// Token watched by the price logger unless `TARGET_TOKEN` overrides it
pub const TARGET_TOKEN: &str = "2TRAviWGVy7V1y8mGbLanrEawZoK7JxQTEAjE5xRpump";

// DexScreener screener stream
pub const DEXSCREENER_WS_BASE: &str = "wss://io.dexscreener.com/dex/screener/v5/pairs";

// Local relay served by dex_bridge
pub const DEFAULT_BRIDGE_ADDR: &str = "127.0.0.1:9999";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    M5,
    H1,
    H6,
    H24,
}

impl Timeframe {
    pub fn as_str(&self) -> &str {
        match self {
            Timeframe::M5 => "m5",
            Timeframe::H1 => "h1",
            Timeframe::H6 => "h6",
            Timeframe::H24 => "h24",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    TrendingScoreH6,
    TrendingScoreH24,
    Volume,
    PriceChangeH24,
}

impl RankBy {
    pub fn as_str(&self) -> &str {
        match self {
            RankBy::TrendingScoreH6 => "trendingScoreH6",
            RankBy::TrendingScoreH24 => "trendingScoreH24",
            RankBy::Volume => "volume",
            RankBy::PriceChangeH24 => "priceChangeH24",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// Named feed subscription, rendered into the screener stream URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetConfig {
    pub timeframe: Timeframe,
    pub page: u32,
    pub rank_by: RankBy,
    pub order: Order,
    pub chain_ids: Vec<String>,
    pub dex_ids: Vec<String>,
}

impl PresetConfig {
    /// Solana pairs ranked by 6h trending score
    pub fn solana_trending() -> Self {
        Self {
            timeframe: Timeframe::H24,
            page: 1,
            rank_by: RankBy::TrendingScoreH6,
            order: Order::Desc,
            chain_ids: vec!["solana".to_string()],
            dex_ids: Vec::new(),
        }
    }

    /// Trending Solana pairs restricted to pump.fun
    pub fn pumpfun_trending() -> Self {
        Self {
            dex_ids: vec!["pumpfun".to_string()],
            ..Self::solana_trending()
        }
    }

    pub fn to_url(&self) -> String {
        let mut url = format!(
            "{}/{}/{}?rankBy[key]={}&rankBy[order]={}",
            DEXSCREENER_WS_BASE,
            self.timeframe.as_str(),
            self.page,
            self.rank_by.as_str(),
            self.order.as_str()
        );

        for (i, chain) in self.chain_ids.iter().enumerate() {
            let _ = write!(url, "&filters[chainIds][{}]={}", i, chain);
        }
        for (i, dex) in self.dex_ids.iter().enumerate() {
            let _ = write!(url, "&filters[dexIds][{}]={}", i, dex);
        }

        url
    }
}

/// Runtime settings, read from the environment (and `.env`) with built-in defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Address or symbol to look for in each batch
    pub target: String,
    /// Feed the price logger subscribes to; `None` means the preset's URL
    pub feed_url: Option<String>,
    /// Upstream stream relayed by the bridge
    pub upstream_url: String,
    /// Listen address of the bridge
    pub bridge_addr: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            target: get("TARGET_TOKEN").unwrap_or_else(|| TARGET_TOKEN.to_string()),
            feed_url: get("FEED_URL"),
            upstream_url: get("DEX_URL")
                .unwrap_or_else(|| PresetConfig::solana_trending().to_url()),
            bridge_addr: get("BRIDGE_ADDR").unwrap_or_else(|| DEFAULT_BRIDGE_ADDR.to_string()),
        }
    }

    /// Like `from_lookup`, but a missing or blank `DEX_URL` falls back to `upstream_arg`
    pub fn from_lookup_with_upstream<F>(lookup: F, upstream_arg: Option<String>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| {
            let value = lookup(key).filter(|value| !value.trim().is_empty());
            match key {
                "DEX_URL" => value.or_else(|| upstream_arg.clone()),
                _ => value,
            }
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

use tracing::info;

use crate::core::matcher::TargetMatcher;
use crate::types::{StreamData, TokenBatch, TradingPair};

/// Printed in place of a missing pair address or symbol
pub const PLACEHOLDER: &str = "—";

pub const NOT_FOUND_IN_BATCH: &str = "Token not found in current batch";
pub const NOT_FOUND_IN_PAIRS: &str = "Token not found in current pair list";
pub const PRICE_UNAVAILABLE: &str = "Price unavailable, try again later";

/// Renders the target token's price line for each delivery
pub struct PriceFormatter {
    matcher: TargetMatcher,
}

impl PriceFormatter {
    pub fn new(target: &str) -> Self {
        Self {
            matcher: TargetMatcher::new(target),
        }
    }

    pub fn target(&self) -> &str {
        self.matcher.target()
    }

    /// Log the line for one delivery
    pub fn display(&self, data: &StreamData) {
        info!("{}", self.render(data));
    }

    pub fn render(&self, data: &StreamData) -> String {
        match data {
            StreamData::Tokens(batch) => self.render_batch(batch),
            StreamData::Pairs(pairs) => self.render_pairs(pairs),
        }
    }

    pub fn render_batch(&self, batch: &TokenBatch) -> String {
        let Some(token) = self.matcher.find_token(&batch.tokens) else {
            return NOT_FOUND_IN_BATCH.to_string();
        };

        let Some(price) = token.price else {
            return PRICE_UNAVAILABLE.to_string();
        };

        let change = token
            .change_24h
            .map(|change| format!(", 24h: {:+.2}%", change))
            .unwrap_or_default();

        format!(
            "Price {}: {:.8} USD{} (pair: {}, symbol: {})",
            self.target(),
            price,
            change,
            token.pair_address.as_deref().unwrap_or(PLACEHOLDER),
            token.symbol.as_deref().unwrap_or(PLACEHOLDER)
        )
    }

    pub fn render_pairs(&self, pairs: &[TradingPair]) -> String {
        match self.matcher.find_pair(pairs) {
            Some(pair) => format!(
                "Price {}: {:.8} USD (DEX {})",
                self.target(),
                pair.price_data.as_ref().and_then(|p| p.usd).unwrap_or(0.0),
                pair.protocol
            ),
            None => NOT_FOUND_IN_PAIRS.to_string(),
        }
    }
}

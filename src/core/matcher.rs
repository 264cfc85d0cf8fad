use crate::types::{TokenProfile, TradingPair};

/// Case-insensitive lookup of a single address or symbol inside a batch
#[derive(Debug, Clone)]
pub struct TargetMatcher {
    target: String,
    lowered: String,
}

impl TargetMatcher {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            lowered: target.to_lowercase(),
        }
    }

    /// The identifier as it was configured (original casing)
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn matches(&self, candidate: &str) -> bool {
        !candidate.is_empty() && candidate.to_lowercase() == self.lowered
    }

    /// First token whose pair address, token address or symbol equals the target.
    ///
    /// Records are checked in batch order, identifiers in that field order;
    /// iteration stops at the first hit.
    pub fn find_token<'a>(&self, tokens: &'a [TokenProfile]) -> Option<&'a TokenProfile> {
        tokens
            .iter()
            .find(|token| token.identifiers().any(|id| self.matches(id)))
    }

    /// First legacy pair whose pair address equals the target
    pub fn find_pair<'a>(&self, pairs: &'a [TradingPair]) -> Option<&'a TradingPair> {
        pairs.iter().find(|pair| self.matches(&pair.pair_address))
    }
}

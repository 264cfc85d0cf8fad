use serde::{Deserialize, Deserializer};

/// One token snapshot in the current feed format.
///
/// Every field is optional: the feed omits whatever it could not extract.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenProfile {
    #[serde(default, alias = "pairAddress")]
    pub pair_address: Option<String>,
    #[serde(default, alias = "tokenAddress")]
    pub token_address: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, alias = "priceUsd", deserialize_with = "de_opt_decimal")]
    pub price: Option<f64>,
    #[serde(
        default,
        alias = "change24h",
        alias = "priceChange24h",
        deserialize_with = "de_opt_decimal"
    )]
    pub change_24h: Option<f64>,
}

impl TokenProfile {
    /// Identifier candidates in match order: pair address, token address, symbol.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        [
            self.pair_address.as_deref(),
            self.token_address.as_deref(),
            self.symbol.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}

/// A batch of token profiles delivered in a single feed frame
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenBatch {
    pub tokens: Vec<TokenProfile>,
    /// Feed-side extraction time (unix seconds), when the feed sends one
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub timestamp: Option<f64>,
}

/// Legacy DEX pair shape
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradingPair {
    #[serde(alias = "pairAddress")]
    pub pair_address: String,
    #[serde(default, alias = "priceData")]
    pub price_data: Option<PriceData>,
    #[serde(alias = "dexId")]
    pub protocol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PriceData {
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub usd: Option<f64>,
}

/// Everything the feed can hand to a stream callback
#[derive(Debug, Clone, PartialEq)]
pub enum StreamData {
    /// Current format: a batch of token profiles
    Tokens(TokenBatch),
    /// Legacy format: a plain list of trading pairs
    Pairs(Vec<TradingPair>),
}

impl StreamData {
    /// Decode one JSON text frame.
    ///
    /// `{"tokens": [...]}` is the current shape; `[...]` and `{"pairs": [...]}`
    /// are both read as the legacy pair list.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawFrame>(text).map(Self::from)
    }

    /// Number of records carried by this delivery
    pub fn len(&self) -> usize {
        match self {
            StreamData::Tokens(batch) => batch.tokens.len(),
            StreamData::Pairs(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StreamData::Tokens(_) => "token batch",
            StreamData::Pairs(_) => "legacy pairs",
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFrame {
    Tokens(TokenBatch),
    Pairs(Vec<TradingPair>),
    PairsEnvelope { pairs: Vec<TradingPair> },
}

impl From<RawFrame> for StreamData {
    fn from(frame: RawFrame) -> Self {
        match frame {
            RawFrame::Tokens(batch) => StreamData::Tokens(batch),
            RawFrame::Pairs(pairs) | RawFrame::PairsEnvelope { pairs } => StreamData::Pairs(pairs),
        }
    }
}

// DexScreener sends prices both as JSON numbers and as numeric strings
fn de_opt_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Number(f64),
        Text(String),
    }

    match Option::<Decimal>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Decimal::Number(value)) => Ok(Some(value)),
        // Blank or non-numeric text ("N/A", "-") means the value is unknown
        Some(Decimal::Text(text)) => Ok(text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())),
    }
}

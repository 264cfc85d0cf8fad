use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors raised while talking to a feed or serving the local relay
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to connect to feed {url}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("feed transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("failed to decode feed frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to bind local relay on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StreamError>;

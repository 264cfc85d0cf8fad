use futures::{Stream, StreamExt};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message},
};
use tracing::{debug, info, warn};

use crate::error::{Result, StreamError};
use crate::types::StreamData;

/// Subscribes to a JSON feed and hands every decoded batch to a callback
pub struct FeedStreamer {
    url: String,
}

impl FeedStreamer {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connect and stream until the feed closes or the transport fails.
    ///
    /// Returns the number of batches delivered to the callback.
    pub async fn start<F>(&self, callback: F) -> Result<usize>
    where
        F: Fn(StreamData),
    {
        info!("Connecting to feed: {}", self.url);

        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|source| StreamError::Connect {
                url: self.url.clone(),
                source,
            })?;

        info!("Feed connected, waiting for batches...");

        let delivered = pump(ws_stream, callback).await?;
        info!("Feed finished after {} batch(es)", delivered);

        Ok(delivered)
    }
}

/// Drive a frame stream, dispatching each decodable text frame to `callback`.
///
/// Undecodable frames are skipped with a warning. A close frame ends the
/// subscription; a transport error is returned to the caller.
pub async fn pump<S, F>(mut frames: S, callback: F) -> Result<usize>
where
    S: Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin,
    F: Fn(StreamData),
{
    let mut delivered = 0;

    while let Some(frame) = frames.next().await {
        match frame? {
            Message::Text(text) => match decode_frame(&text) {
                Ok(data) => {
                    debug!("Received {} with {} record(s)", data.kind(), data.len());
                    callback(data);
                    delivered += 1;
                }
                Err(e) => warn!("Skipping frame: {}", e),
            },
            Message::Close(frame) => {
                match frame {
                    Some(frame) => info!(
                        "Feed closed by server: {} {}",
                        u16::from(frame.code),
                        frame.reason
                    ),
                    None => info!("Feed closed by server"),
                }
                return Ok(delivered);
            }
            // Ping/pong are answered by tungstenite; binary frames carry nothing we decode
            _ => {}
        }
    }

    info!("Feed stream ended");
    Ok(delivered)
}

fn decode_frame(text: &str) -> Result<StreamData> {
    Ok(StreamData::decode(text)?)
}

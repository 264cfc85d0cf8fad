pub mod bridge;
pub mod matcher;
pub mod shutdown;
pub mod streamer;

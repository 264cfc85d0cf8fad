pub mod formatter;
pub mod logger;

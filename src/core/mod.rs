//! Core bot logic: command routing, conversion and reply formatting

pub mod command;
pub mod config;
pub mod currency;
pub mod log;
pub mod reply;

// Re-export main types for cleaner imports
pub use command::{BotCommand, ConversionRequest};
pub use currency::{ConversionResult, RateEntry, RateError, RateTable, RateTableProvider};

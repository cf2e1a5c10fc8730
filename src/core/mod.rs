//! Core business logic abstractions

pub mod config;
pub mod convert;
pub mod error;
pub mod history;
pub mod log;
pub mod mapper;
pub mod rates;
pub mod state;

// Re-export main types for cleaner imports
pub use error::{ErrorKind, RateError};
pub use history::{HistoryPoint, HistoryWindow};
pub use rates::{HistoricalRate, RateProvider, RateSet};
pub use state::ConversionState;

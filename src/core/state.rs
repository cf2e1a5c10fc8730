//! The single UI-facing state record owned by the orchestrator.

use crate::core::history::HistoryPoint;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionState {
    pub currencies: Vec<String>,
    pub selected_currency_from: String,
    pub selected_currency_to: String,
    pub amount_from: String,
    /// Only meaningful while `current_rate` is set.
    pub amount_to: String,
    pub current_rate: Option<f64>,
    pub rate_timestamp: Option<DateTime<Utc>>,
    /// Successful samples only, oldest first.
    pub history_points: Vec<HistoryPoint>,
    pub is_loading_conversion: bool,
    pub is_loading_history: bool,
    pub error_message: Option<String>,
}

impl Default for ConversionState {
    fn default() -> Self {
        ConversionState {
            currencies: Vec::new(),
            selected_currency_from: String::new(),
            selected_currency_to: String::new(),
            amount_from: String::new(),
            amount_to: "0".to_string(),
            current_rate: None,
            rate_timestamp: None,
            history_points: Vec::new(),
            is_loading_conversion: false,
            is_loading_history: false,
            error_message: None,
        }
    }
}

impl ConversionState {
    pub fn with_base(base: &str) -> Self {
        ConversionState {
            selected_currency_from: base.to_string(),
            ..Default::default()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading_conversion || self.is_loading_history
    }
}

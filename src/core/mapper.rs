//! Normalizes raw provider responses into `Result<T, RateError>`.
//!
//! Each provider describes its JSON envelope through [`ProviderEnvelope`];
//! [`map_response`] applies the same priority to all of them: a structured
//! provider error wins, then the HTTP status, then a missing payload.

use crate::core::error::{RateError, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

pub trait ProviderEnvelope: DeserializeOwned {
    type Payload;

    /// Human-readable text of a provider error object, if the body carries one.
    fn provider_error(&self) -> Option<String>;

    /// The requested data, or `None` when the field was absent.
    fn into_payload(self) -> Option<Self::Payload>;
}

pub fn map_response<E: ProviderEnvelope>(status: u16, body: &str) -> Result<E::Payload> {
    let success = (200..300).contains(&status);

    match serde_json::from_str::<E>(body) {
        Ok(envelope) => {
            if let Some(info) = envelope.provider_error() {
                debug!(status, %info, "Provider reported an error");
                return Err(RateError::ProviderReported(info));
            }
            if !success {
                return Err(server_error(status, body));
            }
            envelope.into_payload().ok_or(RateError::EmptyResponse)
        }
        Err(e) if success => Err(RateError::ServerError {
            status: Some(status),
            detail: format!("Malformed response: {e}"),
        }),
        Err(_) => Err(server_error(status, body)),
    }
}

fn server_error(status: u16, body: &str) -> RateError {
    let mut detail: String = body.chars().take(200).collect();
    if detail.is_empty() {
        detail = format!("HTTP {status}");
    }
    RateError::ServerError {
        status: Some(status),
        detail,
    }
}

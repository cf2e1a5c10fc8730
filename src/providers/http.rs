use crate::core::error::{RateError, Result};
use crate::core::mapper::{ProviderEnvelope, map_response};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "swiftfx/1.0";

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| RateError::Unexpected(format!("Failed to build HTTP client: {e}")))
}

pub fn build_url(base_url: &str, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
    let raw = format!("{}/{}", base_url.trim_end_matches('/'), endpoint);
    Url::parse_with_params(&raw, params)
        .map_err(|e| RateError::Unexpected(format!("Invalid provider URL {raw}: {e}")))
}

/// Logs `url` with the value of `secret_param` masked.
fn redacted(url: &Url, secret_param: &str) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == secret_param { "***".into() } else { v };
            (k.into_owned(), v.into_owned())
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

/// Sends a GET and maps transport failures, status and body into `E::Payload`.
pub async fn get_mapped<E: ProviderEnvelope>(
    client: &Client,
    url: Url,
    secret_param: &str,
) -> Result<E::Payload> {
    debug!("Requesting {}", redacted(&url, secret_param));

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| RateError::from_transport(&e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| RateError::from_transport(&e))?;
    debug!(status = status.as_u16(), bytes = body.len(), "Received response");

    map_response::<E>(status.as_u16(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Ping {
        pong: Option<bool>,
    }

    impl ProviderEnvelope for Ping {
        type Payload = bool;

        fn provider_error(&self) -> Option<String> {
            None
        }

        fn into_payload(self) -> Option<bool> {
            self.pong
        }
    }

    async fn ping(base_url: &str, timeout: Duration) -> Result<bool> {
        let client = build_client(timeout)?;
        let url = build_url(base_url, "ping", &[("key", "secret")])?;
        get_mapped::<Ping>(&client, url, "key").await
    }

    #[tokio::test]
    async fn test_successful_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"pong": true}"#))
            .mount(&server)
            .await;

        assert_eq!(ping(&server.uri(), Duration::from_secs(5)).await, Ok(true));
    }

    #[tokio::test]
    async fn test_timeout_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"pong": true}"#)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = ping(&server.uri(), Duration::from_millis(100)).await.unwrap_err();
        assert_eq!(err, RateError::Timeout);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_classified() {
        // Grab a free port, then release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = ping(&format!("http://127.0.0.1:{port}"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err, RateError::NoConnectivity);
    }

    #[tokio::test]
    async fn test_server_error_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = ping(&server.uri(), Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, RateError::ServerError { status: Some(500), .. }));
    }

    #[test]
    fn test_build_url() {
        let url = build_url(
            "http://localhost:1234/api/",
            "latest",
            &[("base", "EUR"), ("symbols", "USD,GBP")],
        )
        .unwrap();
        assert_eq!(url.path(), "/api/latest");
        assert_eq!(url.query(), Some("base=EUR&symbols=USD%2CGBP"));
    }

    #[test]
    fn test_redacted_masks_secret() {
        let url = build_url("http://x", "latest", &[("access_key", "s3cret"), ("base", "EUR")])
            .unwrap();
        let shown = redacted(&url, "access_key");
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("access_key=***"));
        assert!(shown.contains("base=EUR"));
    }
}

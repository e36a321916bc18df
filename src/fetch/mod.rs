mod client;
mod basic;
pub mod auth;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

use self::auth::ApiKey;

pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    url: &str,
) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("invalid URL '{url}'"))?,
    );

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

pub async fn fetch_json<C: HttpClient, T: DeserializeOwned>(
    client: &C,
    url: &str,
) -> Result<T> {
    let bytes = fetch_bytes(client, url).await?;
    serde_json::from_slice(&bytes).with_context(|| format!("unexpected JSON from {url}"))
}

/// A [`BasicClient`] with `timeout`, wrapped in a bearer [`ApiKey`] when a key is set.
pub fn client_for(api_key: Option<&str>, timeout: Duration) -> Result<Box<dyn HttpClient>> {
    let basic = BasicClient::with_timeout(timeout)?;
    Ok(match api_key {
        Some(key) => Box::new(ApiKey::bearer(basic, key)?),
        None => Box::new(basic),
    })
}


#[cfg(test)]
mod tests {
    use super::testing::StubClient;
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Health {
        status: String,
    }

    #[tokio::test]
    async fn test_fetch_json() {
        let client = StubClient::default().route("/health", 200, r#"{"status":"ok"}"#);
        let health: Health = fetch_json(&client, "http://localhost:8002/health").await.unwrap();
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_error_status_is_an_error() {
        let client = StubClient::default().route("/health", 500, "boom");
        assert!(fetch_bytes(&client, "http://localhost:8002/health").await.is_err());
        assert!(fetch_bytes(&client, "http://localhost:8002/missing").await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_url_and_json() {
        let client = StubClient::default().route("/health", 200, "<html>");
        assert!(fetch_bytes(&client, "not a url").await.is_err());
        assert!(fetch_json::<_, Health>(&client, "http://localhost:8002/health").await.is_err());
    }

    #[test]
    fn test_client_for_rejects_bad_key() {
        assert!(client_for(Some("bad\nkey"), Duration::from_secs(5)).is_err());
        assert!(client_for(None, Duration::from_secs(5)).is_ok());
    }
}

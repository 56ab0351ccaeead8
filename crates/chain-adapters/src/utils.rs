//! Shared HTTP plumbing for the provider and fee-oracle clients.
//!
//! Requests are issued exactly once. Timeouts come from the underlying
//! `reqwest` client and surface as `ProviderClientError::Http`, which the
//! adapters wrap into `ChainAdapterError::Provider`.

use chain_types::{ChainAdapterError, ProviderClientError, ProviderResult};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;

/// JSON-over-HTTP client bound to one base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
	base_url: String,
	client: reqwest::Client,
}

impl HttpClient {
	/// Creates a client for `base_url` with a per-request timeout.
	///
	/// # Errors
	///
	/// Returns `ProviderClientError::InvalidUrl` if the URL does not parse and
	/// `ProviderClientError::Http` if the TLS backend cannot be initialized.
	pub fn new(base_url: &str, timeout: Duration) -> ProviderResult<Self> {
		let parsed = reqwest::Url::parse(base_url)
			.map_err(|e| ProviderClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
		if !matches!(parsed.scheme(), "http" | "https") {
			return Err(ProviderClientError::InvalidUrl(format!(
				"{}: scheme must be http or https",
				base_url
			)));
		}

		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(transport)?;

		Ok(Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			client,
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Joins `path` onto the base URL. An empty path addresses the base URL itself.
	pub fn url(&self, path: &str) -> String {
		if path.is_empty() {
			self.base_url.clone()
		} else {
			format!("{}/{}", self.base_url, path.trim_start_matches('/'))
		}
	}

	pub async fn get_json<R: DeserializeOwned>(
		&self,
		path: &str,
		query: &[(&str, String)],
	) -> ProviderResult<R> {
		let url = self.url(path);
		debug!("GET {}", url);

		let response = self
			.client
			.get(&url)
			.query(query)
			.send()
			.await
			.map_err(transport)?;

		Self::decode(response).await
	}

	pub async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
		&self,
		path: &str,
		body: &B,
	) -> ProviderResult<R> {
		let url = self.url(path);
		debug!("POST {}", url);

		let response = self
			.client
			.post(&url)
			.json(body)
			.send()
			.await
			.map_err(transport)?;

		Self::decode(response).await
	}

	async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> ProviderResult<R> {
		let status = response.status();
		let body = response.text().await.map_err(transport)?;

		if !status.is_success() {
			return Err(ProviderClientError::Status {
				status: status.as_u16(),
				body,
			});
		}

		serde_json::from_str(&body).map_err(|e| ProviderClientError::Decode(e.to_string()))
	}
}

/// Builds an `HttpClient` for a configured endpoint, treating a bad URL as
/// a fatal configuration error.
pub fn client_for(chain: &str, base_url: &str, timeout: Duration) -> chain_types::Result<HttpClient> {
	chain_types::configs::validate_base_url(chain, base_url)?;
	HttpClient::new(base_url, timeout).map_err(|e| ChainAdapterError::Config(e.to_string()))
}

fn transport(error: reqwest::Error) -> ProviderClientError {
	ProviderClientError::Http(Box::new(error))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_url_joining() {
		let client = HttpClient::new("https://api.example.com/", Duration::from_secs(5)).unwrap();
		assert_eq!(client.base_url(), "https://api.example.com");
		assert_eq!(
			client.url("/api/v1/fees"),
			"https://api.example.com/api/v1/fees"
		);
		assert_eq!(client.url(""), "https://api.example.com");
	}

	#[test]
	fn test_rejects_bad_urls() {
		assert!(matches!(
			HttpClient::new("not a url", Duration::from_secs(5)),
			Err(ProviderClientError::InvalidUrl(_))
		));
		assert!(matches!(
			HttpClient::new("ftp://api.example.com", Duration::from_secs(5)),
			Err(ProviderClientError::InvalidUrl(_))
		));
	}

	#[test]
	fn test_client_for_requires_url() {
		let result = client_for("bitcoin", "", Duration::from_secs(5));
		assert!(matches!(result, Err(ChainAdapterError::Config(_))));
	}
}

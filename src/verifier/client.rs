//! Identity directory client
//!
//! Signed GET against the directory's user search, filtered by phone number.
//! Every failure mode resolves to "treat as active".

use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

use super::types::{DirectoryResponse, DirectoryVerdict};
use crate::config::DirectoryConfig;
use crate::error::VerifyError;

pub const HEADER_APP_TOKEN: &str = "X-App-Token";
pub const HEADER_APP_ID: &str = "X-App-Id";
pub const HEADER_TIMESTAMP: &str = "X-Timestamp";

/// Hex SHA-256 of `app_id ‖ app_secret ‖ timestamp`
pub fn sign(app_id: &str, app_secret: &str, timestamp: i64) -> String {
    let digest = Sha256::digest(format!("{}{}{}", app_id, app_secret, timestamp).as_bytes());
    hex::encode(digest)
}

/// Directory filter expression for a phone number
pub fn phone_filter(correlation_key: &str) -> String {
    format!("phoneNumbers eq \"{}\"", correlation_key)
}

#[derive(Debug, Clone)]
pub struct DirectoryClient {
    client: Client,
    config: DirectoryConfig,
}

impl DirectoryClient {
    pub fn new(config: DirectoryConfig) -> Result<Self, VerifyError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Build the signed lookup request for a given unix timestamp
    pub fn build_request(
        &self,
        correlation_key: &str,
        timestamp: i64,
    ) -> Result<reqwest::Request, VerifyError> {
        let mut url = Url::parse(&self.config.api_url)?;
        url.query_pairs_mut()
            .clear()
            .append_pair("filter", &phone_filter(correlation_key));

        let token = sign(&self.config.app_id, &self.config.app_secret, timestamp);
        let request = self
            .client
            .get(url)
            .header(HEADER_APP_TOKEN, token)
            .header(HEADER_APP_ID, self.config.app_id.as_str())
            .header(HEADER_TIMESTAMP, timestamp.to_string())
            .header(CONTENT_TYPE, "application/json")
            .build()?;
        Ok(request)
    }

    /// Raw lookup. Errors here are reported, not swallowed.
    pub async fn lookup(&self, correlation_key: &str) -> Result<DirectoryResponse, VerifyError> {
        let request = self.build_request(correlation_key, Utc::now().timestamp())?;
        debug!(url = %request.url(), "Querying identity directory");

        let response = self.client.execute(request).await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(VerifyError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(VerifyError::EmptyBody);
        }

        Ok(serde_json::from_slice(&body)?)
    }

    /// Classify the directory's answer for a correlation key
    pub async fn check(&self, correlation_key: &str) -> DirectoryVerdict {
        let response = match self.lookup(correlation_key).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    correlation_key,
                    error = %e,
                    "Directory lookup failed, treating account as active"
                );
                return DirectoryVerdict::Unverifiable;
            }
        };

        if response.total_results <= 0 {
            info!(correlation_key, "No directory account for correlation key");
            return DirectoryVerdict::NoMatch;
        }

        match response.resources.first() {
            Some(user) => {
                info!(
                    correlation_key,
                    user_name = %user.user_name,
                    active = user.active,
                    "Directory account found"
                );
                if user.active {
                    DirectoryVerdict::Active
                } else {
                    DirectoryVerdict::Inactive
                }
            }
            None => {
                let e = VerifyError::MissingResource {
                    total: response.total_results,
                };
                warn!(correlation_key, error = %e, "Treating account as active");
                DirectoryVerdict::Unverifiable
            }
        }
    }
}

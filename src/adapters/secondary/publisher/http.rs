/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! HTTP data publisher for sending records to iommu.info

use crate::domain::{HardwareRecord, PublishConfig, PublishError, SubmissionReceipt};
use crate::ports::DataPublisher;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::time::Duration;

/// HTTP data publisher that posts records to the API root
pub struct HttpDataPublisher {
    client: Client,
}

impl HttpDataPublisher {
    /// Create a new HTTP data publisher
    ///
    /// # Arguments
    /// * `timeout` - HTTP request timeout
    pub fn new(timeout: Duration) -> Result<Self, PublishError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            PublishError::NetworkFailed(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self { client })
    }

    /// Create with default settings
    pub fn with_defaults() -> Result<Self, PublishError> {
        Self::new(Duration::from_secs(30))
    }
}

/// Browse URL for a board: `<site>/mainboard?board_vendor=..&board_name=..`
pub fn mainboard_url(api_url: &str, board_vendor: &str, board_name: &str) -> Option<Url> {
    let mut url = Url::parse(api_url).ok()?;
    url.set_path("/mainboard");
    url.query_pairs_mut()
        .clear()
        .append_pair("board_vendor", board_vendor)
        .append_pair("board_name", board_name);
    Some(url)
}

/// Read the board the server stored from a successful response body
pub fn parse_receipt(api_url: &str, body: &str) -> SubmissionReceipt {
    let value: serde_json::Value = serde_json::from_str(body).unwrap_or_default();
    let text = |pointer: &str| {
        value
            .pointer(pointer)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    let board_name = text("/board/name");
    let board_vendor = text("/board/board_vendor/name");
    let view_url = match (&board_vendor, &board_name) {
        (Some(vendor), Some(name)) => mainboard_url(api_url, vendor, name).map(String::from),
        _ => None,
    };

    SubmissionReceipt {
        board_name,
        board_vendor,
        view_url,
    }
}

#[async_trait]
impl DataPublisher for HttpDataPublisher {
    async fn submit(
        &self,
        record: &HardwareRecord,
        config: &PublishConfig,
    ) -> Result<SubmissionReceipt, PublishError> {
        if config.api_url.is_empty() {
            return Err(PublishError::NetworkFailed(
                "No API URL provided".to_string(),
            ));
        }

        let payload = serde_json::to_string(record)
            .map_err(|e| PublishError::SerializationFailed(e.to_string()))?;

        log::info!("Submitting record to {}", config.api_url);
        let response = self
            .client
            .post(&config.api_url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| PublishError::NetworkFailed(format!("Failed to send request: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status.is_success() {
            Ok(parse_receipt(&config.api_url, &body))
        } else {
            Err(PublishError::Rejected {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            })
        }
    }
}

//! HTTP calls to the extraction backend.
//!
//! Three endpoints, all `POST` with a JSON body. Any non-2xx status is a failure
//! whose body is expected to be `{"error": "..."}`.

use crate::error::{Error, Result, UNKNOWN_ERROR};
use crate::model::{Format, Video};
use reqwest::header::CONTENT_DISPOSITION;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const METADATA_PATH: &str = "/get_info";
const SINGLE_PATH: &str = "/download_single";
const BATCH_PATH: &str = "/download_all";

/// A binary response body plus the header the filename may come from
#[derive(Debug, Clone)]
pub struct Payload {
    pub bytes: Vec<u8>,
    pub content_disposition: Option<String>,
}

#[derive(Serialize)]
struct MetadataRequest<'a> {
    urls: &'a [String],
}

#[derive(Deserialize)]
struct MetadataResponse {
    videos: Vec<Video>,
}

#[derive(Serialize)]
struct SingleRequest<'a> {
    url: &'a str,
    format: Format,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    urls: &'a [String],
    format: Format,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ExtractorClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExtractorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_metadata(&self, urls: &[String]) -> Result<Vec<Video>> {
        let response = self.post(METADATA_PATH, &MetadataRequest { urls }).await?;
        let body: MetadataResponse = response.json().await?;
        debug!(count = body.videos.len(), "metadata received");
        Ok(body.videos)
    }

    pub async fn download_single(&self, url: &str, format: Format) -> Result<Payload> {
        let response = self.post(SINGLE_PATH, &SingleRequest { url, format }).await?;
        into_payload(response).await
    }

    pub async fn download_batch(&self, urls: &[String], format: Format) -> Result<Payload> {
        let response = self.post(BATCH_PATH, &BatchRequest { urls, format }).await?;
        into_payload(response).await
    }

    /// Send the request and turn non-success statuses into `Error::Remote`.
    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let endpoint = format!("{}{}", self.base_url, path);
        debug!(%endpoint, "sending request");
        let response = self.http.post(&endpoint).json(body).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.bytes().await {
            Ok(raw) => remote_message(&raw),
            Err(_) => UNKNOWN_ERROR.to_string(),
        };
        warn!(%endpoint, status = status.as_u16(), %message, "backend reported failure");
        Err(Error::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

async fn into_payload(response: reqwest::Response) -> Result<Payload> {
    let content_disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await?.to_vec();
    debug!(len = bytes.len(), ?content_disposition, "payload received");
    Ok(Payload {
        bytes,
        content_disposition,
    })
}

/// Extract the `error` field from a failure body, falling back to a generic message.
fn remote_message(raw: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(raw)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

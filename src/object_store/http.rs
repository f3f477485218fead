//! HTTP object store (S3-style path addressing)

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_LENGTH, RANGE};
use tracing::debug;

use crate::error::{NbsError, Result};

use super::{ByteRange, ObjectStore, RangeResponse};

/// Object store reached over HTTP at `<endpoint>/<bucket>/<key>`
#[derive(Debug)]
pub struct HttpObjectStore {
    base_url: String,
    client: Client,
}

impl HttpObjectStore {
    /// Create a store for one bucket; `timeout` bounds every request
    pub fn new(endpoint: &str, bucket: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = format!("{}/{}/", endpoint.trim_end_matches('/'), bucket);
        Ok(Self { base_url, client })
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, key: &str) -> String {
        self.base_url.clone() + key
    }
}

impl ObjectStore for HttpObjectStore {
    fn get_range(&self, key: &str, range: ByteRange) -> Result<RangeResponse> {
        let url = self.url(key);
        debug!("http get: {}, range: {}", url, range);
        let resp = self
            .client
            .get(&url)
            .header(RANGE, range.to_string())
            .send()?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(NbsError::ObjectNotFound(key.to_string()));
        }
        if !status.is_success() {
            return Err(NbsError::HttpStatus {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }

        let declared = resp.content_length();
        let body = resp.bytes()?;
        Ok(RangeResponse {
            content_length: declared.unwrap_or(body.len() as u64),
            body,
        })
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let url = self.url(key);
        debug!("http put: {}, bytes: {}", url, data.len());
        let resp = self
            .client
            .put(&url)
            .header(CONTENT_LENGTH, data.len())
            .body(data.to_vec())
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NbsError::HttpStatus {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

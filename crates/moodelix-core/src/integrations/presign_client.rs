//! Client for a remote `POST /api/wallpapers` signing endpoint.
//!
//! Used when this process holds no AWS credentials and another Moodelix
//! server does the signing.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::WallpaperError;
use crate::wallpaper::Presigner;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub s3_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub signed_url: String,
}

pub struct RemotePresigner {
    client: Client,
    endpoint: String,
}

impl RemotePresigner {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl Presigner for RemotePresigner {
    async fn presign(&self, key: &str) -> Result<String, WallpaperError> {
        if key.is_empty() {
            return Err(WallpaperError::EmptyKey);
        }
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&PresignRequest {
                s3_key: key.to_string(),
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(WallpaperError::Rejected {
                status: resp.status().as_u16(),
            });
        }
        let body: PresignResponse = resp.json().await?;
        Ok(body.signed_url)
    }
}

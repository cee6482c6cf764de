//! Local S3 presigning (AWS Signature Version 4, query-string auth).
//!
//! Produces a time-limited GET URL for an object key without any network
//! round-trip. Only the `host` header is signed and the payload is
//! `UNSIGNED-PAYLOAD`, which is what browsers and `<video>` tags can use.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::WallpaperError;
use crate::storage::WallpaperConfig;
use crate::wallpaper::Presigner;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const DEFAULT_EXPIRY_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct S3Presigner {
    bucket: String,
    region: String,
    access_key_id: String,
    secret_access_key: String,
    host: String,
    expires_secs: u64,
}

impl S3Presigner {
    pub fn new(bucket: &str, region: &str, access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            region: region.to_string(),
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            host: format!("{bucket}.s3.{region}.amazonaws.com"),
            expires_secs: DEFAULT_EXPIRY_SECS,
        }
    }

    /// Build from config; `None` unless bucket and both credentials are set.
    pub fn from_config(cfg: &WallpaperConfig) -> Option<Self> {
        if cfg.bucket.is_empty() || cfg.access_key_id.is_empty() || cfg.secret_access_key.is_empty()
        {
            return None;
        }
        Some(
            Self::new(&cfg.bucket, &cfg.region, &cfg.access_key_id, &cfg.secret_access_key)
                .with_expiry(cfg.presign_expiry_secs),
        )
    }

    pub fn with_expiry(mut self, secs: u64) -> Self {
        self.expires_secs = secs;
        self
    }

    /// Override the virtual-hosted endpoint (path-style proxies, test vectors).
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Presigned GET URL for `key` as of `now`.
    pub fn presign_at(&self, key: &str, now: DateTime<Utc>) -> String {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{date}/{}/s3/aws4_request", self.region);

        let canonical_uri = format!(
            "/{}",
            key.trim_start_matches('/')
                .split('/')
                .map(|seg| urlencoding::encode(seg).into_owned())
                .collect::<Vec<_>>()
                .join("/")
        );

        // Already in lexical order.
        let query = [
            ("X-Amz-Algorithm", ALGORITHM.to_string()),
            (
                "X-Amz-Credential",
                format!("{}/{scope}", self.access_key_id),
            ),
            ("X-Amz-Date", amz_date.clone()),
            ("X-Amz-Expires", self.expires_secs.to_string()),
            ("X-Amz-SignedHeaders", "host".to_string()),
        ]
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

        let canonical_request = format!(
            "GET\n{canonical_uri}\n{query}\nhost:{}\n\nhost\nUNSIGNED-PAYLOAD",
            self.host
        );

        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signing_key = [self.region.as_str(), "s3", "aws4_request"].iter().fold(
            hmac(
                format!("AWS4{}", self.secret_access_key).as_bytes(),
                date.as_bytes(),
            ),
            |key, part| hmac(&key, part.as_bytes()),
        );
        let signature = hex::encode(hmac(&signing_key, string_to_sign.as_bytes()));

        format!(
            "https://{}{canonical_uri}?{query}&X-Amz-Signature={signature}",
            self.host
        )
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[async_trait]
impl Presigner for S3Presigner {
    async fn presign(&self, key: &str) -> Result<String, WallpaperError> {
        if key.is_empty() {
            return Err(WallpaperError::EmptyKey);
        }
        Ok(self.presign_at(key, Utc::now()))
    }
}

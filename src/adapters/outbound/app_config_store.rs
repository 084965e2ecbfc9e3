//! App Configuration Store
//!
//! Implements ConfigStore using the Azure App Configuration key-value REST API.
//!
//! Requests are authenticated with the HMAC-SHA256 scheme described in
//! https://learn.microsoft.com/azure/azure-app-configuration/rest-api-authentication-hmac
//! Feature flags live under the reserved `.appconfig.featureflag/` prefix and
//! carry a JSON document as value.

use crate::domain::ports::{ConfigStore, ConfigStoreError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// REST API version sent with every request.
pub const API_VERSION: &str = "1.0";

/// Key prefix under which feature flags are stored.
pub const FEATURE_FLAG_PREFIX: &str = ".appconfig.featureflag/";

/// Parsed connection string: `Endpoint=https://...;Id=...;Secret=...`.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub endpoint: String,
    pub id: String,
    secret: Vec<u8>,
}

impl ConnectionString {
    /// Parse a connection string. Field names are case-insensitive and the
    /// secret must be valid base64.
    pub fn parse(raw: &str) -> Result<Self, ConfigStoreError> {
        let mut endpoint = None;
        let mut id = None;
        let mut secret = None;

        for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = part.split_once('=').ok_or_else(|| {
                ConfigStoreError::InvalidConnectionString(format!("malformed segment '{}'", part))
            })?;
            match name.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.trim().trim_end_matches('/').to_string()),
                "id" => id = Some(value.trim().to_string()),
                "secret" => secret = Some(value.trim().to_string()),
                _ => {}
            }
        }

        let endpoint = endpoint
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ConfigStoreError::InvalidConnectionString("missing Endpoint".into()))?;
        Url::parse(&endpoint)
            .map_err(|e| ConfigStoreError::InvalidConnectionString(format!("bad Endpoint: {}", e)))?;
        let id = id
            .filter(|i| !i.is_empty())
            .ok_or_else(|| ConfigStoreError::InvalidConnectionString("missing Id".into()))?;
        let secret = secret
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigStoreError::InvalidConnectionString("missing Secret".into()))?;
        let secret = STANDARD.decode(secret.as_bytes()).map_err(|e| {
            ConfigStoreError::InvalidConnectionString(format!("Secret is not base64: {}", e))
        })?;

        Ok(Self { endpoint, id, secret })
    }
}

// Debug output redacts the secret.
impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint)
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Authentication headers for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub date: String,
    pub content_hash: String,
    pub authorization: String,
}

/// Sign a request with the HMAC-SHA256 scheme.
///
/// `host` includes the port when it is not the scheme default, matching the
/// `Host` header the HTTP client sends.
pub fn sign_request(
    credential: &ConnectionString,
    method: &str,
    path_and_query: &str,
    host: &str,
    body: &[u8],
    now: DateTime<Utc>,
) -> Result<SignedHeaders, ConfigStoreError> {
    let date = now.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
    let content_hash = STANDARD.encode(Sha256::digest(body));

    let string_to_sign = format!(
        "{}\n{}\n{};{};{}",
        method.to_ascii_uppercase(),
        path_and_query,
        date,
        host,
        content_hash
    );

    let mut mac = HmacSha256::new_from_slice(&credential.secret)
        .map_err(|e| ConfigStoreError::InvalidConnectionString(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    let authorization = format!(
        "HMAC-SHA256 Credential={}&SignedHeaders=x-ms-date;host;x-ms-content-sha256&Signature={}",
        credential.id, signature
    );

    Ok(SignedHeaders {
        date,
        content_hash,
        authorization,
    })
}

/// Key-value document returned by `GET /kv/{key}`.
#[derive(Debug, Deserialize)]
struct KeyValue {
    #[allow(dead_code)]
    key: String,
    #[serde(default)]
    value: Option<String>,
}

/// Feature flag document stored as the value of a flag key.
#[derive(Debug, Deserialize)]
struct FeatureFlagDocument {
    #[allow(dead_code)]
    id: String,
    #[serde(default)]
    enabled: bool,
}

/// ConfigStore backed by an App Configuration instance.
pub struct AppConfigStore {
    credential: ConnectionString,
    client: reqwest::Client,
}

impl AppConfigStore {
    pub fn new(credential: ConnectionString) -> Self {
        Self {
            credential,
            client: reqwest::Client::new(),
        }
    }

    /// Parse the connection string and build the store.
    pub fn connect(connection_string: &str) -> Result<Self, ConfigStoreError> {
        let credential = ConnectionString::parse(connection_string)?;
        tracing::info!(endpoint = %credential.endpoint, "using remote configuration store");
        Ok(Self::new(credential))
    }

    /// Build the URL for a key, with an optional label.
    pub fn key_url(&self, key: &str, label: Option<&str>) -> Result<Url, ConfigStoreError> {
        let mut url = Url::parse(&self.credential.endpoint)
            .map_err(|e| ConfigStoreError::InvalidConnectionString(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| ConfigStoreError::InvalidConnectionString("endpoint cannot be a base".into()))?
            .pop_if_empty()
            .push("kv")
            .push(key);

        {
            let mut query = url.query_pairs_mut();
            if let Some(label) = label {
                query.append_pair("label", label);
            }
            query.append_pair("api-version", API_VERSION);
        }

        Ok(url)
    }

    /// Fetch the raw value of a key. `Ok(None)` when the key does not exist.
    async fn get_value(&self, key: &str, label: Option<&str>) -> Result<Option<String>, ConfigStoreError> {
        let url = self.key_url(key, label)?;

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(ConfigStoreError::InvalidConnectionString(
                    "endpoint has no host".into(),
                ))
            }
        };
        let path_and_query = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        let signed = sign_request(&self.credential, "GET", &path_and_query, &host, b"", Utc::now())?;

        tracing::debug!(key, ?label, "reading configuration key");

        let response = self
            .client
            .get(url)
            .header("x-ms-date", &signed.date)
            .header("x-ms-content-sha256", &signed.content_hash)
            .header("authorization", &signed.authorization)
            .header("accept", "application/vnd.microsoft.appconfig.kv+json, application/problem+json")
            .send()
            .await
            .map_err(|e| ConfigStoreError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConfigStoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ConfigStoreError::Transport(e.to_string()))?;
        let kv: KeyValue =
            serde_json::from_slice(&bytes).map_err(|e| ConfigStoreError::Decode(e.to_string()))?;

        Ok(kv.value)
    }
}

#[async_trait]
impl ConfigStore for AppConfigStore {
    async fn get_setting(
        &self,
        key: &str,
        label: Option<&str>,
    ) -> Result<Option<String>, ConfigStoreError> {
        self.get_value(key, label).await
    }

    async fn get_feature_flag(
        &self,
        name: &str,
        label: Option<&str>,
    ) -> Result<Option<bool>, ConfigStoreError> {
        let key = format!("{}{}", FEATURE_FLAG_PREFIX, name);
        let Some(raw) = self.get_value(&key, label).await? else {
            return Ok(None);
        };

        let doc: FeatureFlagDocument =
            serde_json::from_str(&raw).map_err(|e| ConfigStoreError::InvalidValue {
                key,
                reason: e.to_string(),
            })?;

        Ok(Some(doc.enabled))
    }
}

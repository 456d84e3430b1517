//! Azure Blob Storage uploads authorised with a storage account shared key

use crate::error::{ConnectorError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method};
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const API_VERSION: &str = "2021-08-06";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AzureBlobOptions {
    pub account_name: String,
    pub account_key: String,
    pub container: String,
    /// Blob service base URL. Defaults to the public endpoint of the account.
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for AzureBlobOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureBlobOptions")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("container", &self.container)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Uploads block blobs into one container
pub struct AzureBlobStorage {
    client: Client,
    endpoint: Url,
    account_name: String,
    key: Vec<u8>,
    container: String,
}

impl std::fmt::Debug for AzureBlobStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureBlobStorage")
            .field("endpoint", &self.endpoint.as_str())
            .field("account_name", &self.account_name)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

impl AzureBlobStorage {
    /// Build the client and try to create the container.
    ///
    /// A failed container creation is ignored since the container usually
    /// exists already.
    pub async fn new(options: AzureBlobOptions) -> Result<Self> {
        let storage = Self::build(options)?;
        match storage.create_container().await {
            Ok(()) => info!(container = %storage.container, "Created blob container"),
            Err(e) => debug!(container = %storage.container, error = %e, "Container not created"),
        }
        Ok(storage)
    }

    fn build(options: AzureBlobOptions) -> Result<Self> {
        let target = format!("azureblob/{}", options.container);
        let key = STANDARD
            .decode(options.account_key.trim())
            .map_err(|e| ConnectorError::storage(&target, format!("invalid account key: {}", e)))?;

        let raw_endpoint = options
            .endpoint
            .unwrap_or_else(|| format!("https://{}.blob.core.windows.net", options.account_name));
        let mut endpoint = Url::parse(&raw_endpoint)
            .map_err(|e| ConnectorError::storage(&target, format!("invalid endpoint: {}", e)))?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint,
            account_name: options.account_name,
            key,
            container: options.container,
        })
    }

    pub fn container_url(&self) -> String {
        format!("{}{}", self.endpoint, self.container)
    }

    async fn create_container(&self) -> Result<()> {
        let mut url = self.url_for(&self.container)?;
        url.set_query(Some("restype=container"));
        self.send(Method::PUT, url, &[], None, Vec::new()).await
    }

    /// Upload `content` as a block blob named `name`, replacing any previous blob.
    pub async fn put_blob(&self, name: &str, content: &[u8]) -> Result<()> {
        let url = self.url_for(&format!("{}/{}", self.container, name))?;
        self.send(
            Method::PUT,
            url,
            &[("x-ms-blob-type", "BlockBlob")],
            Some("application/octet-stream"),
            content.to_vec(),
        )
        .await?;
        debug!(container = %self.container, blob = %name, bytes = content.len(), "Uploaded blob");
        Ok(())
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        self.endpoint
            .join(path)
            .map_err(|e| ConnectorError::storage(self.container_url(), e))
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        extra_headers: &[(&str, &str)],
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> Result<()> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();

        let mut ms_headers: Vec<(&str, &str)> =
            vec![("x-ms-date", date.as_str()), ("x-ms-version", API_VERSION)];
        ms_headers.extend_from_slice(extra_headers);

        let string_to_sign = string_to_sign(
            method.as_str(),
            body.len(),
            content_type.unwrap_or(""),
            &ms_headers,
            &canonicalized_resource(&self.account_name, &url),
        );
        let signature = sign(&self.key, &string_to_sign)?;

        let mut request = self
            .client
            .request(method, url.clone())
            .header("Authorization", format!("SharedKey {}:{}", self.account_name, signature));
        for (name, value) in &ms_headers {
            request = request.header(*name, *value);
        }
        if let Some(content_type) = content_type {
            request = request.header("Content-Type", content_type);
        }

        let response = request.body(body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ConnectorError::storage(
                url.as_str(),
                format!("Azure error ({}): {}", status, text),
            ));
        }
        Ok(())
    }
}

/// Canonical string for the Shared Key scheme
fn string_to_sign(
    verb: &str,
    content_length: usize,
    content_type: &str,
    ms_headers: &[(&str, &str)],
    canonicalized_resource: &str,
) -> String {
    let content_length = if content_length == 0 {
        String::new()
    } else {
        content_length.to_string()
    };

    let mut headers: Vec<(String, &str)> = ms_headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim()))
        .collect();
    headers.sort();
    let canonicalized_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();

    // Content-Encoding, Content-Language, Content-Length, Content-MD5,
    // Content-Type, Date, If-Modified-Since, If-Match, If-None-Match,
    // If-Unmodified-Since, Range
    format!(
        "{}\n\n\n{}\n\n{}\n\n\n\n\n\n\n{}{}",
        verb, content_length, content_type, canonicalized_headers, canonicalized_resource
    )
}

fn canonicalized_resource(account_name: &str, url: &Url) -> String {
    let mut resource = format!("/{}{}", account_name, url.path());

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.into_owned()))
        .collect();
    params.sort();
    for (name, value) in params {
        resource.push('\n');
        resource.push_str(&name);
        resource.push(':');
        resource.push_str(&value);
    }
    resource
}

fn sign(key: &[u8], string_to_sign: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ConnectorError::storage("azureblob", e))?;
    mac.update(string_to_sign.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

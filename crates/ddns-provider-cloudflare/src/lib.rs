// # Cloudflare Record Directory
//
// This crate implements `RecordDirectory` against the Cloudflare v4 API.
//
// ## Architectural Constraints
//
// ### Trust Level: Untrusted (DNS Provider)
//
// **Allowed Capabilities**:
// - ✅ Perform HTTPS API calls to api.cloudflare.com only
// - ✅ Parse Cloudflare envelopes into the tagged lookup results
//
// **Forbidden Capabilities**:
// - ❌ Retry or back off (the next scheduled pass retries)
// - ❌ Decide whether a record needs changing (owned by the Reconciler)
// - ❌ Cache anything beyond a single request
//
// ## Security Requirements
//
// - The auth key NEVER appears in logs or Debug output
//
// ## API Reference
//
// Every reply is wrapped in `{"success": bool, "result": ..., "errors": [...]}`.
//
// - List accounts: GET `/accounts?page=1&per_page=5`
// - Find zone: GET `/zones?name=...`
// - Find record: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - Read record: GET `/zones/:zone_id/dns_records/:record_id`
// - Create record: POST `/zones/:zone_id/dns_records`
// - Update record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Delete record: DELETE `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::Credentials;
use ddns_core::traits::{
    Account, RecordDirectory, RecordLookupResult, RecordReadResult, ZoneLookupResult,
};
use ddns_core::{Error, RecordFamily, RecordPayload, Result};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// Cloudflare API host, also checked for reachability at startup
const CLOUDFLARE_HOST: &str = "https://api.cloudflare.com";

/// Path of the v4 API below the host
const API_V4_PATH: &str = "/client/v4";

const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(3);

/// Cloudflare v4 API client
///
/// One long-lived `reqwest::Client` is reused for every call so connections
/// are pooled; no response is ever cached.
pub struct CloudflareClient {
    /// ⚠️ NEVER log this value
    credentials: Credentials,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("email", &self.credentials.email)
            .field("key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareClient {
    /// Create a client authenticating with `X-Auth-Email` / `X-Auth-Key`
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_base_url(credentials, CLOUDFLARE_HOST)
    }

    /// Talk to a different host; the v4 API is expected below `/client/v4`
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Check that the Cloudflare API host answers at all
    ///
    /// Any HTTP response counts as reachable, whatever its status.
    pub async fn check_connectivity(&self) -> Result<()> {
        tracing::debug!("Checking connectivity to {}", self.base_url);

        self.client
            .get(&self.base_url)
            .timeout(CONNECTIVITY_TIMEOUT)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| {
                Error::connectivity(format!("Cannot reach {}: {}", self.base_url, e))
            })
    }

    /// Issue one API call and unwrap its envelope
    ///
    /// Query values are URL-encoded by reqwest.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&RecordPayload>,
    ) -> Result<Value> {
        let url = format!("{}{}{}", self.base_url, API_V4_PATH, path);
        tracing::debug!("{} {}", method, path);

        let mut request = self
            .client
            .request(method, &url)
            .header("X-Auth-Email", &self.credentials.email)
            .header("X-Auth-Key", &self.credentials.key)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::directory(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::directory(format!("Failed to read response: {}", e)))?;

        let json: Value = serde_json::from_str(&text).map_err(|e| {
            Error::directory(format!("Failed to parse response (HTTP {}): {}", status, e))
        })?;

        envelope_result(json)
    }
}

/// Unwrap `result` from a Cloudflare envelope
///
/// `success: false`, or a missing `success`, becomes `DirectoryCallFailed`
/// with the `errors` array as returned by the API.
pub fn envelope_result(mut envelope: Value) -> Result<Value> {
    if envelope["success"].as_bool() == Some(true) {
        return Ok(envelope["result"].take());
    }

    Err(Error::directory(format!("API error: {}", envelope["errors"])))
}

/// Interpret the `result` of the accounts listing
///
/// Only `name` is required per entry.
pub fn accounts_from(result: &Value) -> Result<Vec<Account>> {
    let entries = result
        .as_array()
        .ok_or_else(|| Error::directory("Invalid response format: result is not an array"))?;

    entries
        .iter()
        .map(|entry| {
            let name = entry["name"]
                .as_str()
                .ok_or_else(|| Error::directory("Invalid response format: account without name"))?;
            Ok(Account {
                id: entry["id"].as_str().map(str::to_string),
                name: name.to_string(),
            })
        })
        .collect()
}

/// Interpret the `result` of a zone search
pub fn zone_lookup_from(result: &Value) -> ZoneLookupResult {
    let Some(zones) = result.as_array() else {
        return ZoneLookupResult::Malformed("result is not an array".into());
    };

    match zones.first() {
        None => ZoneLookupResult::NotFound,
        Some(zone) => match zone["id"].as_str() {
            Some(id) => ZoneLookupResult::Found(id.to_string()),
            None => ZoneLookupResult::Malformed("zone.id is not a string".into()),
        },
    }
}

/// Interpret the `result` of a record search
///
/// The first entry wins; `candidates` tells the caller how many matched.
pub fn record_lookup_from(result: &Value) -> RecordLookupResult {
    let Some(records) = result.as_array() else {
        return RecordLookupResult::Malformed("result is not an array".into());
    };

    match records.first() {
        None => RecordLookupResult::NotFound,
        Some(record) => match record["id"].as_str() {
            Some(id) => RecordLookupResult::Found {
                record_id: id.to_string(),
                candidates: records.len(),
            },
            None => RecordLookupResult::Malformed("record.id is not a string".into()),
        },
    }
}

/// Interpret the `result` of a single-record read
pub fn record_read_from(result: &Value) -> RecordReadResult {
    if result.is_null() {
        return RecordReadResult::NotFound;
    }

    match result["content"].as_str() {
        Some(content) => RecordReadResult::Found(content.to_string()),
        None => RecordReadResult::Malformed("record content not found".into()),
    }
}

#[async_trait]
impl RecordDirectory for CloudflareClient {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let result = self
            .request(
                Method::GET,
                "/accounts",
                &[("page", "1"), ("per_page", "5")],
                None,
            )
            .await?;
        accounts_from(&result)
    }

    async fn find_zone_id(&self, zone_name: &str) -> Result<ZoneLookupResult> {
        tracing::debug!("Looking up zone ID for: {}", zone_name);

        let result = self
            .request(Method::GET, "/zones", &[("name", zone_name)], None)
            .await?;
        Ok(zone_lookup_from(&result))
    }

    async fn find_record(
        &self,
        zone_id: &str,
        name: &str,
        family: RecordFamily,
    ) -> Result<RecordLookupResult> {
        tracing::debug!("Looking up record ID: {} (type: {})", name, family);

        let result = self
            .request(
                Method::GET,
                &format!("/zones/{}/dns_records", zone_id),
                &[("name", name), ("type", family.as_str())],
                None,
            )
            .await?;
        Ok(record_lookup_from(&result))
    }

    async fn read_record_content(
        &self,
        zone_id: &str,
        record_id: &str,
    ) -> Result<RecordReadResult> {
        let result = self
            .request(
                Method::GET,
                &format!("/zones/{}/dns_records/{}", zone_id, record_id),
                &[],
                None,
            )
            .await?;
        Ok(record_read_from(&result))
    }

    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<()> {
        self.request(
            Method::POST,
            &format!("/zones/{}/dns_records", zone_id),
            &[],
            Some(payload),
        )
        .await?;
        Ok(())
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<()> {
        self.request(
            Method::PUT,
            &format!("/zones/{}/dns_records/{}", zone_id, record_id),
            &[],
            Some(payload),
        )
        .await?;
        Ok(())
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        self.request(
            Method::DELETE,
            &format!("/zones/{}/dns_records/{}", zone_id, record_id),
            &[],
            None,
        )
        .await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

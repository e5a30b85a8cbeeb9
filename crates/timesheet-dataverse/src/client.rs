use anyhow::Context;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use timesheet_core::{Candidate, Event, HostSettings, RemoteSync, SyncError, WorkOrder};
use tracing::{debug, info, instrument, warn};

use crate::query::{self, TIME_ENTRY_SET, WORK_ORDER_SET};
use crate::records::{
    Collection, TimeEntryRecord, WorkOrderRecord, WorkOrderWithEntries, flatten_entries,
    merge_saved, to_payload,
};

/// Host integration context, handed over explicitly instead of being looked
/// up from ambient state.
#[derive(Debug, Clone)]
pub struct HostContext {
    pub api_root: Url,
    pub access_token: Option<String>,
    pub user_id: String,
}

impl HostContext {
    pub fn from_settings(settings: &HostSettings) -> anyhow::Result<Self> {
        let root = format!(
            "{}/api/data/v{}/",
            settings.url.trim_end_matches('/'),
            settings.api_version
        );
        let api_root =
            Url::parse(&root).with_context(|| format!("invalid dataverse url: {root}"))?;
        Ok(Self {
            api_root,
            access_token: settings.access_token.clone(),
            user_id: query::normalize_user_id(&settings.user_id),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DataverseClient {
    http: Client,
    host: HostContext,
}

impl DataverseClient {
    pub fn new(settings: &HostSettings) -> anyhow::Result<Self> {
        let host = HostContext::from_settings(settings)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("odata-maxversion", HeaderValue::from_static("4.0"));
        headers.insert("odata-version", HeaderValue::from_static("4.0"));
        if let Some(token) = &host.access_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("access token is not a valid header value")?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()
            .context("failed building HTTP client for dataverse")?;

        info!(api_root = %host.api_root, user_id = %host.user_id, "dataverse client ready");
        Ok(Self { http, host })
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, SyncError> {
        let mut url = self
            .host
            .api_root
            .join(path)
            .map_err(|e| SyncError::request_failed(path, e))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send<T>(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        body: Option<String>,
    ) -> Result<T, SyncError>
    where
        T: DeserializeOwned,
    {
        debug!(operation, %method, %url, "dataverse request");
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json; charset=utf-8")
                .header("Prefer", "return=representation")
                .body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::request_failed(operation, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SyncError::request_failed(operation, e))?;

        if !status.is_success() {
            warn!(operation, %status, "dataverse returned non-success status");
            return Err(SyncError::request_failed(
                operation,
                describe_failure(status, &text),
            ));
        }

        serde_json::from_str(&text).map_err(|e| SyncError::invalid_response(operation, e))
    }
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    // Dataverse wraps errors as {"error":{"code":..,"message":..}}.
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });
    match message {
        Some(message) => format!("HTTP {status}: {message}"),
        None => format!("HTTP {status}"),
    }
}

impl RemoteSync for DataverseClient {
    #[instrument(skip(self))]
    async fn list_work_orders(&self) -> Result<Vec<WorkOrder>, SyncError> {
        let url = self.url(WORK_ORDER_SET, &query::work_order_params(&self.host.user_id))?;
        let page: Collection<WorkOrderRecord> = self
            .send("list_work_orders", Method::GET, url, None)
            .await?;
        Ok(page.value.into_iter().map(WorkOrder::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_events(&self) -> Result<Vec<Event>, SyncError> {
        let url = self.url(WORK_ORDER_SET, &query::time_entry_params(&self.host.user_id))?;
        let page: Collection<WorkOrderWithEntries> =
            self.send("list_events", Method::GET, url, None).await?;
        let events = flatten_entries(page.value);
        debug!(count = events.len(), "time entries fetched");
        Ok(events)
    }

    #[instrument(skip(self, candidate), fields(id = %candidate.event.id, new = candidate.is_new()))]
    async fn submit_event(&self, candidate: &Candidate) -> Result<Event, SyncError> {
        let (operation, method, path) = if candidate.is_new() {
            ("create_time_entry", Method::POST, TIME_ENTRY_SET.to_string())
        } else {
            (
                "update_time_entry",
                Method::PATCH,
                format!("{TIME_ENTRY_SET}({})", candidate.event.id),
            )
        };
        let url = self.url(&path, &[])?;
        let body = serde_json::to_string(&to_payload(candidate))
            .map_err(|e| SyncError::invalid_response(operation, e))?;

        let saved: TimeEntryRecord = self.send(operation, method, url, Some(body)).await?;
        Ok(merge_saved(candidate, saved))
    }
}

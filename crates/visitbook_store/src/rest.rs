use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{
    GuestbookEntry, NewGuestbookEntry, NewViewRecord, StoreError, StoreErrorKind, ViewRecord,
};

/// Table holding one `ViewRecord` per page slug.
pub const VIEWS_TABLE: &str = "posts";
/// Table holding the shared guestbook board.
pub const GUESTBOOK_TABLE: &str = "guestbook";

/// Backend error code for "zero rows matched". Confined to this adapter; the
/// contract below surfaces the condition as an absent record instead.
const NO_ROWS_CODE: &str = "PGRST116";

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub base_url: String,
    pub anon_key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl StoreSettings {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Persistence collaborator contract. The remote table store owns all data;
/// this client holds no authority and every call may fail.
#[async_trait::async_trait]
pub trait TableStore: Send + Sync {
    /// Point lookup by slug. An absent row is `Ok(None)`, never an error.
    async fn fetch_view_record(&self, slug: &str) -> Result<Option<ViewRecord>, StoreError>;

    /// Creates the view record. A collision on the unique slug key is
    /// reported as `StoreErrorKind::Conflict`.
    async fn insert_view_record(&self, record: &NewViewRecord) -> Result<(), StoreError>;

    /// Conditional update: sets the count to `next` only while it still
    /// equals `expected`. `Ok(false)` means the counter moved underneath us.
    async fn compare_and_set_count(
        &self,
        slug: &str,
        expected: u64,
        next: u64,
    ) -> Result<bool, StoreError>;

    /// Full list of guestbook entries, newest first.
    async fn list_entries(&self) -> Result<Vec<GuestbookEntry>, StoreError>;

    async fn insert_entry(&self, entry: &NewGuestbookEntry) -> Result<(), StoreError>;

    /// Change-feed probe: id of the newest entry, if any.
    async fn latest_entry_id(&self) -> Result<Option<i64>, StoreError>;
}

/// PostgREST-style HTTP adapter for the contract above.
#[derive(Debug, Clone)]
pub struct RestTableStore {
    settings: StoreSettings,
    client: reqwest::Client,
}

impl RestTableStore {
    pub fn new(settings: StoreSettings) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&settings.anon_key)
            .map_err(|err| StoreError::new(StoreErrorKind::Network, err.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.anon_key))
            .map_err(|err| StoreError::new(StoreErrorKind::Network, err.to_string()))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| StoreError::new(StoreErrorKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.settings.base_url.trim_end_matches('/'),
            table
        )
    }
}

#[async_trait::async_trait]
impl TableStore for RestTableStore {
    async fn fetch_view_record(&self, slug: &str) -> Result<Option<ViewRecord>, StoreError> {
        let response = self
            .client
            .get(self.table_url(VIEWS_TABLE))
            .query(&[
                ("slug", format!("eq.{slug}")),
                ("select", "slug,title,view_count".to_string()),
            ])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_no_rows_body(&body) {
                return Ok(None);
            }
            return Err(http_failure(status, body));
        }

        let rows: Vec<ViewRecord> = response.json().await.map_err(map_reqwest_error)?;
        Ok(rows.into_iter().next())
    }

    async fn insert_view_record(&self, record: &NewViewRecord) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.table_url(VIEWS_TABLE))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(http_failure(status, body))
    }

    async fn compare_and_set_count(
        &self,
        slug: &str,
        expected: u64,
        next: u64,
    ) -> Result<bool, StoreError> {
        let response = self
            .client
            .patch(self.table_url(VIEWS_TABLE))
            .query(&[
                ("slug", format!("eq.{slug}")),
                ("view_count", format!("eq.{expected}")),
            ])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "view_count": next }))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http_failure(status, body));
        }

        // An empty representation means no row matched the filter.
        let rows: Vec<ViewRecord> = response.json().await.map_err(map_reqwest_error)?;
        Ok(!rows.is_empty())
    }

    async fn list_entries(&self) -> Result<Vec<GuestbookEntry>, StoreError> {
        let response = self
            .client
            .get(self.table_url(GUESTBOOK_TABLE))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http_failure(status, body));
        }
        response.json().await.map_err(map_reqwest_error)
    }

    async fn insert_entry(&self, entry: &NewGuestbookEntry) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.table_url(GUESTBOOK_TABLE))
            .header("Prefer", "return=minimal")
            .json(entry)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(http_failure(status, body))
    }

    async fn latest_entry_id(&self) -> Result<Option<i64>, StoreError> {
        #[derive(Deserialize)]
        struct IdRow {
            id: i64,
        }

        let response = self
            .client
            .get(self.table_url(GUESTBOOK_TABLE))
            .query(&[("select", "id"), ("order", "id.desc"), ("limit", "1")])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http_failure(status, body));
        }
        let rows: Vec<IdRow> = response.json().await.map_err(map_reqwest_error)?;
        Ok(rows.first().map(|row| row.id))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        return StoreError::new(StoreErrorKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return StoreError::new(StoreErrorKind::Decode, err.to_string());
    }
    StoreError::new(StoreErrorKind::Network, err.to_string())
}

fn http_failure(status: StatusCode, body: String) -> StoreError {
    let kind = if status == StatusCode::CONFLICT {
        StoreErrorKind::Conflict
    } else {
        StoreErrorKind::HttpStatus(status.as_u16())
    };
    let message = if body.is_empty() {
        status.to_string()
    } else {
        body
    };
    StoreError::new(kind, message)
}

fn is_no_rows_body(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("code")
                .and_then(|code| code.as_str().map(ToOwned::to_owned))
        })
        .is_some_and(|code| code == NO_ROWS_CODE)
}

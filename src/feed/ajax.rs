use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{error::FetchError, state::ElectionCatalog, stats::StatsTable};

use super::{
    ElectionFeed, PrecinctListing,
    contact::{ContactMessage, PcoDirectory},
};

/// `{ "success": bool, "data": ... }` wrapper used by every action.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
}

/// Feed speaking the host's form-encoded AJAX protocol.
#[derive(Debug, Clone)]
pub struct AjaxFeed {
    client: Client,
    endpoint: String,
    nonce: String,
    catalog_url: Option<String>,
    pco_url: Option<String>,
}

impl AjaxFeed {
    pub fn new(endpoint: impl Into<String>, nonce: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            nonce: nonce.into(),
            catalog_url: None,
            pco_url: None,
        })
    }

    /// Static JSON export listing elections and races.
    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = Some(url.into());
        self
    }

    /// Static JSON export of the PCO directory.
    pub fn with_pco_url(mut self, url: impl Into<String>) -> Self {
        self.pco_url = Some(url.into());
        self
    }

    fn post(&self, action: &str, fields: &[(&str, &str)]) -> Result<Value, FetchError> {
        let mut form = vec![("action", action), ("nonce", self.nonce.as_str())];
        form.extend_from_slice(fields);

        tracing::debug!(action, endpoint = %self.endpoint, "[feed::ajax] POST");
        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .map_err(|e| FetchError::Transport(format!("{action}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.bytes().map_err(|e| FetchError::Transport(format!("{action}: {e}")))?;
        unwrap_envelope(&body)
    }

    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport(format!("GET {url}: {e}")))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.bytes().map_err(|e| FetchError::Transport(format!("GET {url}: {e}")))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Unwrap the `{success, data}` envelope; a failure message in `data` becomes `Rejected`.
fn unwrap_envelope(body: &[u8]) -> Result<Value, FetchError> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    if envelope.success {
        return Ok(envelope.data);
    }
    let message = match &envelope.data {
        Value::String(text) => text.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| envelope.data.to_string(), str::to_string),
        Value::Null => "request was not successful".to_string(),
        other => other.to_string(),
    };
    Err(FetchError::Rejected(message))
}

impl ElectionFeed for AjaxFeed {
    fn fetch_election_votes(&self, date: &str) -> Result<StatsTable, FetchError> {
        let data = self.post("get_election_votes", &[("election_date", date)])?;
        StatsTable::from_votes_payload(&data)
    }

    fn fetch_election_results(&self, date: &str, race: &str) -> Result<StatsTable, FetchError> {
        let data = self.post("get_election_results", &[("election_date", date), ("race_name", race)])?;
        StatsTable::from_results_payload(&data)
    }

    fn fetch_precinct_list(&self) -> Result<Vec<PrecinctListing>, FetchError> {
        let data = self.post("lcd_get_precincts", &[])?;
        let listings: Vec<PrecinctListing> = serde_json::from_value(data)?;
        Ok(listings.into_iter().filter(|p| p.number.is_geographic()).collect())
    }

    fn submit_contact_message(&self, message: &ContactMessage) -> Result<(), FetchError> {
        message.validate().map_err(|e| FetchError::Rejected(e.to_string()))?;
        let precinct = message.precinct_number.to_string();
        let become_pco = if message.is_become_pco { "1" } else { "0" };
        self.post(
            "lcd_contact_pco",
            &[
                ("precinct_number", precinct.as_str()),
                ("sender_name", message.sender_name.as_str()),
                ("sender_email", message.sender_email.as_str()),
                ("message", message.message.as_str()),
                ("is_become_pco", become_pco),
            ],
        )?;
        tracing::info!(precinct = %message.precinct_number, "[feed::ajax] contact message sent");
        Ok(())
    }

    fn fetch_catalog(&self) -> Result<ElectionCatalog, FetchError> {
        let url = self.catalog_url.as_deref().ok_or_else(|| FetchError::NotFound("election catalog".into()))?;
        let catalog: ElectionCatalog = serde_json::from_value(self.get_json(url)?)?;
        Ok(catalog.normalized())
    }

    fn fetch_pco_directory(&self) -> Result<PcoDirectory, FetchError> {
        let url = self.pco_url.as_deref().ok_or_else(|| FetchError::NotFound("PCO directory".into()))?;
        Ok(serde_json::from_value(self.get_json(url)?)?)
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, Url};

use crate::models::Event;
use crate::source::{EventSource, QueryError};

const EVENTS_TABLE: &str = "events";
const RSVP_TABLE: &str = "rsvp_responses";

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout: Duration,
}

/// Reads events and RSVP counts from the hosted database's REST endpoint.
pub struct SupabaseSource {
    base_url: String,
    client: Client,
}

impl SupabaseSource {
    pub fn new(config: &SupabaseConfig) -> Result<Self, QueryError> {
        let key = config.anon_key.trim();
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key).map_err(|err| QueryError::Http(err.to_string()))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|err| QueryError::Http(err.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|err| QueryError::Http(err.to_string()))?;

        Ok(Self {
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, QueryError> {
        Url::parse(&format!("{}/rest/v1/{table}", self.base_url))
            .map_err(|err| QueryError::Http(err.to_string()))
    }
}

#[async_trait]
impl EventSource for SupabaseSource {
    async fn list_events(&self) -> Result<Vec<Event>, QueryError> {
        let mut url = self.table_url(EVENTS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "date.asc");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| QueryError::Http(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| QueryError::Http(err.to_string()))?;
        if !status.is_success() {
            return Err(QueryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|err| QueryError::Parse(err.to_string()))
    }

    async fn count_rsvps(&self, event_id: &str) -> Result<u64, QueryError> {
        let mut url = self.table_url(RSVP_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("event_id", &format!("eq.{event_id}"));

        let response = self
            .client
            .head(url)
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|err| QueryError::Http(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .ok_or_else(|| QueryError::Parse("missing content-range header".into()))?
            .to_str()
            .map_err(|err| QueryError::Parse(err.to_string()))?;
        parse_content_range(range)
    }
}

/// Extracts the total from a PostgREST `Content-Range` header such as
/// `0-24/312` or `*/0`.
pub fn parse_content_range(value: &str) -> Result<u64, QueryError> {
    let total = value
        .trim()
        .rsplit_once('/')
        .map(|(_, total)| total)
        .ok_or_else(|| QueryError::Parse(format!("malformed content-range: {value}")))?;
    if total == "*" {
        return Err(QueryError::Parse(format!(
            "content-range has no exact count: {value}"
        )));
    }
    total
        .parse::<u64>()
        .map_err(|err| QueryError::Parse(format!("bad content-range total {total:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ranged_and_empty_totals() {
        assert_eq!(parse_content_range("0-4/5").unwrap(), 5);
        assert_eq!(parse_content_range("*/0").unwrap(), 0);
        assert_eq!(parse_content_range(" 0-24/312 ").unwrap(), 312);
    }

    #[test]
    fn rejects_unknown_totals() {
        assert!(matches!(
            parse_content_range("0-24/*"),
            Err(QueryError::Parse(_))
        ));
        assert!(matches!(parse_content_range("12"), Err(QueryError::Parse(_))));
        assert!(matches!(
            parse_content_range("0-1/-3"),
            Err(QueryError::Parse(_))
        ));
    }

    #[test]
    fn trims_trailing_slashes_from_base_url() {
        let source = SupabaseSource::new(&SupabaseConfig {
            url: "https://project.supabase.co//".into(),
            anon_key: "anon".into(),
            timeout: Duration::from_secs(5),
        })
        .expect("build source");
        assert_eq!(
            source.table_url("events").unwrap().as_str(),
            "https://project.supabase.co/rest/v1/events"
        );
    }
}

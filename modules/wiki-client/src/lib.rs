pub mod error;
pub mod types;

pub use error::{Result, WikiError};
pub use types::{
    Claim, Entity, EntityData, FeedEntry, FeedKind, FeedPage, OnThisDayResponse, PageSummary,
};

use std::time::Duration;

use tracing::debug;

const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/api/rest_v1";
const WIKIDATA_URL: &str = "https://www.wikidata.org";

pub struct WikiClient {
    client: reqwest::Client,
    base_url: String,
    wikidata_url: String,
}

impl WikiClient {
    pub fn new(user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: WIKIPEDIA_API_URL.to_string(),
            wikidata_url: WIKIDATA_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_wikidata_url(mut self, url: &str) -> Self {
        self.wikidata_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Fetch the on-this-day feed for one category.
    pub async fn on_this_day(
        &self,
        kind: FeedKind,
        mm: &str,
        dd: &str,
    ) -> Result<OnThisDayResponse> {
        let url = format!("{}/feed/onthisday/{}/{mm}/{dd}", self.base_url, kind.path());
        debug!(kind = kind.path(), mm, dd, "Fetching on-this-day feed");
        self.get_json(&url).await
    }

    /// Fetch the lead summary for a page title.
    pub async fn page_summary(&self, title: &str) -> Result<PageSummary> {
        let url = format!("{}/page/summary/{}", self.base_url, encode_title(title));
        self.get_json(&url).await
    }

    /// Fetch the rendered article HTML for a page title.
    pub async fn page_html(&self, title: &str) -> Result<String> {
        let url = format!("{}/page/html/{}", self.base_url, encode_title(title));
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(WikiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }

    /// Fetch raw entity claims for a Wikidata id (Qxxx).
    pub async fn entity_data(&self, qid: &str) -> Result<EntityData> {
        let url = format!("{}/wiki/Special:EntityData/{qid}.json", self.wikidata_url);
        self.get_json(&url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(WikiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}

/// Percent-encode the characters that would break a title used as a
/// path segment; everything else passes through for the URL layer.
fn encode_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '%' => out.push_str("%25"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            '&' => out.push_str("%26"),
            '/' => out.push_str("%2F"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_title_handles_reserved_chars() {
        assert_eq!(encode_title("Quit India Movement"), "Quit%20India%20Movement");
        assert_eq!(encode_title("AC/DC"), "AC%2FDC");
        assert_eq!(encode_title("100% pure"), "100%25%20pure");
    }

    #[test]
    fn feed_kind_paths() {
        assert_eq!(FeedKind::Events.path(), "events");
        assert_eq!(FeedKind::Births.path(), "births");
        assert_eq!(FeedKind::Deaths.path(), "deaths");
    }
}

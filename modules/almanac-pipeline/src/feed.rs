use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use almanac_common::text::{strip_html, trim_summary};
use almanac_common::{Category, RawRecord};
use wiki_client::{FeedEntry, FeedKind, WikiClient};

use crate::traits::FeedSource;

/// Production feed source backed by the Wikipedia on-this-day API.
pub struct WikiFeedSource {
    client: Arc<WikiClient>,
}

impl WikiFeedSource {
    pub fn new(client: Arc<WikiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedSource for WikiFeedSource {
    async fn fetch(&self, category: Category, mm: &str, dd: &str) -> Result<Vec<RawRecord>> {
        let kind = feed_kind(category);
        let resp = self
            .client
            .on_this_day(kind, mm, dd)
            .await
            .map_err(|e| anyhow!("on-this-day {} feed: {e}", kind.path()))?;
        Ok(extract_records(category, resp.entries(kind)))
    }
}

fn feed_kind(category: Category) -> FeedKind {
    match category {
        Category::Event => FeedKind::Events,
        Category::Birth => FeedKind::Births,
        Category::Death => FeedKind::Deaths,
    }
}

/// Map feed entries to raw records with sanitized titles. Entries with
/// no usable title are dropped here so everything downstream can rely
/// on a non-empty one.
pub fn extract_records(category: Category, entries: Vec<FeedEntry>) -> Vec<RawRecord> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let page = entry.pages.first();

            // Prefer the normalized plain-text title, then the legacy
            // field, then the display title, then the entry text.
            let normalized = page
                .and_then(|p| p.titles.as_ref())
                .and_then(|t| t.normalized.clone())
                .or_else(|| page.and_then(|p| p.normalizedtitle.clone()));
            let raw_display = normalized
                .clone()
                .or_else(|| {
                    page.and_then(|p| p.titles.as_ref())
                        .and_then(|t| t.display.clone())
                })
                .or_else(|| entry.text.clone())
                .unwrap_or_default();

            let display_title = strip_html(raw_display.trim());
            if display_title.is_empty() {
                return None;
            }

            let page_url = page
                .and_then(|p| p.content_urls.as_ref())
                .and_then(|c| c.desktop.as_ref())
                .and_then(|d| d.page.clone());

            Some(RawRecord {
                category,
                year: entry.year,
                display_title,
                page_title: normalized,
                excerpt: trim_summary(entry.text.as_deref().unwrap_or_default()),
                page_url,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: &str) -> FeedEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn prefers_normalized_title_and_keeps_page_title() {
        let e = entry(
            r#"{
                "year": 1947,
                "text": "India gains independence from British rule.",
                "pages": [{
                    "titles": {"normalized": "Indian independence movement", "display": "<b>Indian</b> independence movement"},
                    "content_urls": {"desktop": {"page": "https://en.wikipedia.org/wiki/Indian_independence_movement"}}
                }]
            }"#,
        );
        let records = extract_records(Category::Event, vec![e]);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.display_title, "Indian independence movement");
        assert_eq!(r.page_title.as_deref(), Some("Indian independence movement"));
        assert_eq!(r.year, Some(1947));
        assert!(r.page_url.as_deref().unwrap().contains("wikipedia.org"));
    }

    #[test]
    fn falls_back_to_display_then_text() {
        let display_only = entry(
            r#"{"year": 1969, "pages": [{"titles": {"display": "Apollo <i>11</i>"}}]}"#,
        );
        let text_only = entry(r#"{"year": 1969, "text": "Apollo 11 lands on the Moon."}"#);

        let records =
            extract_records(Category::Event, vec![display_only, text_only]);
        assert_eq!(records[0].display_title, "Apollo 11");
        assert_eq!(records[1].display_title, "Apollo 11 lands on the Moon.");
    }

    #[test]
    fn titleless_entries_are_dropped() {
        let e = entry(r#"{"year": 1900, "pages": [{}]}"#);
        assert!(extract_records(Category::Birth, vec![e]).is_empty());
    }
}

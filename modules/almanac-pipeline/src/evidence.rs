use std::sync::Arc;
use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use regex::Regex;

use almanac_common::text::{to_iso, MONTHS_LOWER};
use wiki_client::{Entity, WikiClient};

use crate::traits::{DateEvidence, SummaryFetcher};

/// Structured-fact properties checked for a corroborating date, in
/// priority order: point in time, date of death, date of birth,
/// publication date. Only referenced claims count.
const FACT_PROPERTIES: [&str; 4] = ["P585", "P570", "P569", "P577"];

static ARTICLE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let months = MONTHS_LOWER.join("|");
    Regex::new(&format!(
        r"(?i)(?:signed|born|died|launched|declared|independence|assassinated|founded|started|arrested|storming|crash(?:ed|es)?)[^\w]{{0,30}}(\d{{1,2}})\s+({months})\s+(\d{{3,4}})"
    ))
    .unwrap()
});

// Narrower fallback for treaty/signing phrasing such as
// "Date signed: 10 August 1920".
static SIGNING_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let months = MONTHS_LOWER.join("|");
    Regex::new(&format!(
        r"(?i)(?:date\s*(?:signed|of\s*signing)|signed)[^A-Za-z0-9]{{0,10}}(\d{{1,2}})\s+({months})\s+(\d{{3,4}})"
    ))
    .unwrap()
});

/// Scan article text for a date-bearing phrase near a verb cue and
/// return it as an ISO date.
pub fn scan_article_date(html: &str) -> Option<String> {
    let caps = ARTICLE_DATE_RE
        .captures(html)
        .or_else(|| SIGNING_DATE_RE.captures(html))?;

    let day: u32 = caps[1].parse().ok()?;
    let month = MONTHS_LOWER
        .iter()
        .position(|m| m.eq_ignore_ascii_case(&caps[2]))? as u32
        + 1;
    let year: i32 = caps[3].parse().ok()?;
    if day == 0 || day > 31 {
        return None;
    }
    Some(to_iso(year, month, day))
}

/// First referenced date across the prioritized fact properties.
pub fn pick_fact_date(entity: &Entity) -> Option<String> {
    for prop in FACT_PROPERTIES {
        if let Some(claims) = entity.claims.get(prop) {
            if let Some(iso) = claims.iter().find_map(|c| c.referenced_iso_date()) {
                return Some(iso);
            }
        }
    }
    None
}

/// Production date evidence and summary source backed by the Wikipedia
/// REST API and Wikidata EntityData.
pub struct WikiEvidence {
    client: Arc<WikiClient>,
}

impl WikiEvidence {
    pub fn new(client: Arc<WikiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DateEvidence for WikiEvidence {
    async fn article_date(&self, title: &str) -> Result<Option<String>> {
        let html = self
            .client
            .page_html(title)
            .await
            .map_err(|e| anyhow!("article html for {title:?}: {e}"))?;
        Ok(scan_article_date(&html))
    }

    async fn fact_date(&self, title: &str) -> Result<Option<String>> {
        let summary = self
            .client
            .page_summary(title)
            .await
            .map_err(|e| anyhow!("page summary for {title:?}: {e}"))?;
        let Some(qid) = summary.wikibase_item else {
            return Ok(None);
        };

        let data = self
            .client
            .entity_data(&qid)
            .await
            .map_err(|e| anyhow!("entity data for {qid}: {e}"))?;
        Ok(data.entities.get(&qid).and_then(pick_fact_date))
    }
}

#[async_trait]
impl SummaryFetcher for WikiEvidence {
    async fn lead_summary(&self, title: &str) -> Result<Option<String>> {
        let summary = self
            .client
            .page_summary(title)
            .await
            .map_err(|e| anyhow!("page summary for {title:?}: {e}"))?;
        Ok(summary.extract.filter(|s| !s.is_empty()))
    }
}

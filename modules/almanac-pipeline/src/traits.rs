use anyhow::Result;
use async_trait::async_trait;

use almanac_common::{CandidateRecord, Category, RawRecord};

/// Per-category encyclopedic on-this-day feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, category: Category, mm: &str, dd: &str) -> Result<Vec<RawRecord>>;
}

/// Optional generative candidate provider. Absence or failure of this
/// source leaves the pipeline in single-source mode.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch(
        &self,
        readable_date: &str,
        mm: &str,
        dd: &str,
    ) -> Result<Vec<CandidateRecord>>;
}

/// Independent date evidence for a page title. A failed lookup is
/// indistinguishable from "no evidence found" to the consensus gate.
#[async_trait]
pub trait DateEvidence: Send + Sync {
    /// ISO date from a date-bearing phrase near a verb cue in the
    /// article text.
    async fn article_date(&self, title: &str) -> Result<Option<String>>;

    /// ISO date from a referenced point-in-time fact in the
    /// structured store.
    async fn fact_date(&self, title: &str) -> Result<Option<String>>;
}

/// Longer lead summaries, fetched by title during enrichment.
#[async_trait]
pub trait SummaryFetcher: Send + Sync {
    async fn lead_summary(&self, title: &str) -> Result<Option<String>>;
}

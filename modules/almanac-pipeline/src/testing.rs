//! Test doubles and fixture builders shared by unit and integration
//! tests.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use almanac_common::{CandidateRecord, Category, CuratedItem, RawRecord};

use crate::traits::{CandidateSource, DateEvidence, FeedSource, SummaryFetcher};

// --- Fixture builders ---

pub fn raw_record(
    category: Category,
    year: Option<i32>,
    title: &str,
    excerpt: &str,
) -> RawRecord {
    RawRecord {
        category,
        year,
        display_title: title.to_string(),
        page_title: Some(title.to_string()),
        excerpt: excerpt.to_string(),
        page_url: None,
    }
}

pub fn candidate(rank: u32, title: &str, year: &str, note: &str) -> CandidateRecord {
    CandidateRecord {
        rank,
        title: title.to_string(),
        year: year.to_string(),
        note: note.to_string(),
    }
}

pub fn curated(
    title: &str,
    year: &str,
    score: u8,
    is_regional: bool,
    candidate_rank: Option<u32>,
) -> CuratedItem {
    CuratedItem {
        category: Category::Event,
        title: title.to_string(),
        year: year.to_string(),
        summary: String::new(),
        date_iso: None,
        verified_day: false,
        is_regional,
        score,
        candidate_rank,
        source_url: None,
    }
}

pub fn curated_in(
    category: Category,
    title: &str,
    year: &str,
    score: u8,
    is_regional: bool,
) -> CuratedItem {
    CuratedItem {
        category,
        ..curated(title, year, score, is_regional, None)
    }
}

// --- Feed doubles ---

/// Returns the seeded records filtered by requested category.
pub struct MockFeedSource {
    records: Vec<RawRecord>,
}

impl MockFeedSource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl FeedSource for MockFeedSource {
    async fn fetch(&self, category: Category, _mm: &str, _dd: &str) -> Result<Vec<RawRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect())
    }
}

pub struct FailingFeedSource;

#[async_trait]
impl FeedSource for FailingFeedSource {
    async fn fetch(&self, _: Category, _: &str, _: &str) -> Result<Vec<RawRecord>> {
        Err(anyhow!("feed unavailable"))
    }
}

pub struct SlowFeedSource {
    delay: Duration,
}

impl SlowFeedSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl FeedSource for SlowFeedSource {
    async fn fetch(&self, _: Category, _: &str, _: &str) -> Result<Vec<RawRecord>> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}

// --- Candidate doubles ---

pub struct MockCandidateSource {
    candidates: Vec<CandidateRecord>,
}

impl MockCandidateSource {
    pub fn new(candidates: Vec<CandidateRecord>) -> Self {
        Self { candidates }
    }
}

#[async_trait]
impl CandidateSource for MockCandidateSource {
    async fn fetch(&self, _: &str, _: &str, _: &str) -> Result<Vec<CandidateRecord>> {
        Ok(self.candidates.clone())
    }
}

// --- Evidence doubles ---

/// Seeded date evidence: title -> ISO date, per source.
#[derive(Default)]
pub struct MockEvidence {
    article: HashMap<String, String>,
    fact: HashMap<String, String>,
}

impl MockEvidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_article(mut self, title: &str, iso: &str) -> Self {
        self.article.insert(title.to_string(), iso.to_string());
        self
    }

    pub fn with_fact(mut self, title: &str, iso: &str) -> Self {
        self.fact.insert(title.to_string(), iso.to_string());
        self
    }
}

#[async_trait]
impl DateEvidence for MockEvidence {
    async fn article_date(&self, title: &str) -> Result<Option<String>> {
        Ok(self.article.get(title).cloned())
    }

    async fn fact_date(&self, title: &str) -> Result<Option<String>> {
        Ok(self.fact.get(title).cloned())
    }
}

// --- Summary doubles ---

#[derive(Default)]
pub struct MockSummaryFetcher {
    summaries: HashMap<String, String>,
    failing: bool,
}

impl MockSummaryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_summary(mut self, title: &str, text: &str) -> Self {
        self.summaries.insert(title.to_string(), text.to_string());
        self
    }
}

#[async_trait]
impl SummaryFetcher for MockSummaryFetcher {
    async fn lead_summary(&self, title: &str) -> Result<Option<String>> {
        if self.failing {
            return Err(anyhow!("summary endpoint unavailable"));
        }
        Ok(self.summaries.get(title).cloned())
    }
}

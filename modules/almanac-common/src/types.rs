use serde::{Deserialize, Serialize};

// --- Record categories ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Event,
    Birth,
    Death,
}

impl Category {
    /// Births and deaths are treated as biographical for caps and
    /// lenient date handling.
    pub fn is_biographical(&self) -> bool {
        matches!(self, Category::Birth | Category::Death)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Event => write!(f, "event"),
            Category::Birth => write!(f, "birth"),
            Category::Death => write!(f, "death"),
        }
    }
}

// --- Source records ---

/// A single entry from the encyclopedic on-this-day feed, one of the
/// three per-category lists. Immutable once extracted; discarded after
/// the merge stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub category: Category,
    pub year: Option<i32>,
    /// Sanitized display title (HTML stripped).
    pub display_title: String,
    /// Exact page title when the feed names one; used first for
    /// date corroboration.
    pub page_title: Option<String>,
    pub excerpt: String,
    pub page_url: Option<String>,
}

/// A ranked suggestion from the generative candidate provider.
/// Never trusted on its own; must fuzzy-match a feed record to survive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub rank: u32,
    pub title: String,
    /// Possibly signed, possibly empty (the provider may omit it).
    pub year: String,
    pub note: String,
}

// --- Pipeline working unit ---

/// A merged, corroborated, scored item. Created once by the merge
/// stage; replaced (not mutated) on dedupe conflicts; only `summary`
/// changes afterwards, during enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedItem {
    pub category: Category,
    /// Semantically rewritten display title, never empty.
    pub title: String,
    /// String form of the resolved year, may be empty.
    pub year: String,
    pub summary: String,
    /// Corroborated ISO date, or a best-effort `year-mm-dd` guess.
    pub date_iso: Option<String>,
    /// True only when an independent source confirmed the month/day.
    pub verified_day: bool,
    pub is_regional: bool,
    /// 0-100.
    pub score: u8,
    /// Present only for items matched to a generative candidate.
    pub candidate_rank: Option<u32>,
    pub source_url: Option<String>,
}

impl CuratedItem {
    /// Membership identity across selection copies. Never compare by
    /// reference; two copies of the same item must collide here.
    pub fn identity(&self) -> String {
        format!("{}|{}", self.title, self.year)
    }
}

// --- Wire shapes ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    pub title: String,
    pub summary: String,
    pub date_iso: Option<String>,
    pub year: String,
    pub category: Category,
    pub is_regionally_relevant: bool,
    pub verified_day: bool,
    pub score: u8,
    pub source_url: Option<String>,
}

impl From<CuratedItem> for EventEntry {
    fn from(item: CuratedItem) -> Self {
        Self {
            title: item.title,
            summary: item.summary,
            date_iso: item.date_iso,
            year: item.year,
            category: item.category,
            is_regionally_relevant: item.is_regional,
            verified_day: item.verified_day,
            score: item.score,
            source_url: item.source_url,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurationTotals {
    pub returned: usize,
    pub regionally_relevant: usize,
    pub other: usize,
    pub biographical: usize,
    pub battles: usize,
}

/// The single response shape callers see. Failures inside the pipeline
/// surface as `success: false` with an error string, never as a
/// panicked or half-built body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationResult {
    pub success: bool,
    /// The YYYY-MM-DD actually curated (resolved when the input was
    /// omitted).
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub totals: CurationTotals,
    pub events: Vec<EventEntry>,
}

impl CurationResult {
    pub fn failure(date: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            date: date.into(),
            error: Some(error.into()),
            totals: CurationTotals::default(),
            events: Vec::new(),
        }
    }
}

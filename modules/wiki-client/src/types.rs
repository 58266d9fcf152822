use std::collections::HashMap;

use serde::Deserialize;

// --- On-this-day feed ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Events,
    Births,
    Deaths,
}

impl FeedKind {
    pub fn path(&self) -> &'static str {
        match self {
            FeedKind::Events => "events",
            FeedKind::Births => "births",
            FeedKind::Deaths => "deaths",
        }
    }
}

/// The feed returns one populated list per requested kind; the other
/// lists default to empty so one shape covers all three endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnThisDayResponse {
    #[serde(default)]
    pub events: Vec<FeedEntry>,
    #[serde(default)]
    pub births: Vec<FeedEntry>,
    #[serde(default)]
    pub deaths: Vec<FeedEntry>,
}

impl OnThisDayResponse {
    /// The list for the requested kind.
    pub fn entries(self, kind: FeedKind) -> Vec<FeedEntry> {
        match kind {
            FeedKind::Events => self.events,
            FeedKind::Births => self.births,
            FeedKind::Deaths => self.deaths,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedEntry {
    pub year: Option<i32>,
    pub text: Option<String>,
    #[serde(default)]
    pub pages: Vec<FeedPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedPage {
    pub titles: Option<FeedTitles>,
    pub normalizedtitle: Option<String>,
    pub content_urls: Option<ContentUrls>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedTitles {
    pub normalized: Option<String>,
    pub display: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentUrls {
    pub desktop: Option<DesktopUrls>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DesktopUrls {
    pub page: Option<String>,
}

// --- Page summary ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageSummary {
    pub extract: Option<String>,
    /// Wikidata entity id (Qxxx) backing this page, when linked.
    pub wikibase_item: Option<String>,
}

// --- Wikidata EntityData ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityData {
    #[serde(default)]
    pub entities: HashMap<String, Entity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub claims: HashMap<String, Vec<Claim>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claim {
    pub mainsnak: Option<MainSnak>,
    #[serde(default)]
    pub references: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MainSnak {
    pub datavalue: Option<DataValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataValue {
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Claim {
    /// ISO date from this claim's time value, accepted only when the
    /// claim carries at least one reference. Wikidata times look like
    /// `+1947-08-15T00:00:00Z`.
    pub fn referenced_iso_date(&self) -> Option<String> {
        if self.references.is_empty() {
            return None;
        }
        let time = self
            .mainsnak
            .as_ref()?
            .datavalue
            .as_ref()?
            .value
            .get("time")?
            .as_str()?;
        parse_wikidata_time(time)
    }
}

fn parse_wikidata_time(time: &str) -> Option<String> {
    let t = time.strip_prefix(['+', '-']).unwrap_or(time);
    if t.len() < 10 {
        return None;
    }
    let b = t.as_bytes();
    let digits = |range: std::ops::Range<usize>| b[range].iter().all(u8::is_ascii_digit);
    if digits(0..4) && b[4] == b'-' && digits(5..7) && b[7] == b'-' && digits(8..10) {
        Some(t[..10].to_string())
    } else {
        None
    }
}

use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use almanac_common::CandidateRecord;
use perplexity_client::{ChatMessage, ChatRequest, PerplexityClient, SONAR_PRO};

use crate::traits::CandidateSource;

/// Upper bound on candidates taken from one provider response.
const CANDIDATE_CAP: usize = 36;

const SCHEMA_HINT: &str = r#"Return MINIFIED JSON ONLY EXACTLY like: {"events":[{"year":"YYYY or -YY","title":"...","note":"why newsworthy"}]}"#;

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)```json|```").unwrap());

static EMBEDDED_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)\{.*?"events"\s*:\s*\[.*\}"#).unwrap());

static MD_YEAR_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\*{0,2}\s*\**\s*(-?\d{1,4})(\s*BCE)?\**[^\w]+(.+?)\s*:\s*(.+)$").unwrap()
});

static MD_BIO_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\*{0,2}\s*\**\s*(Birthday of|Death of)\s+(.+?)\**\s*:\s*(.+)$").unwrap()
});

/// Outcome of parsing one provider payload. Parsing never fails; the
/// worst case is `Empty`.
#[derive(Debug)]
pub enum CandidateParse {
    /// Strict (or embedded) JSON parsed cleanly.
    Parsed(Vec<CandidateRecord>),
    /// JSON was malformed but line-oriented recovery salvaged items.
    Recovered(Vec<CandidateRecord>),
    Empty,
}

pub fn parse_candidates(content: &str) -> CandidateParse {
    if let Some(records) = parse_events_json(content) {
        return CandidateParse::Parsed(records);
    }
    let recovered = recover_markdown_lines(content);
    if recovered.is_empty() {
        CandidateParse::Empty
    } else {
        CandidateParse::Recovered(recovered)
    }
}

/// Strict JSON parse, with a second attempt on a fenced or embedded
/// object. Returns None when no events array can be found.
fn parse_events_json(content: &str) -> Option<Vec<CandidateRecord>> {
    let value: Option<serde_json::Value> = serde_json::from_str(content).ok().or_else(|| {
        let cleaned = FENCE_RE.replace_all(content, "");
        let m = EMBEDDED_OBJECT_RE.find(&cleaned)?;
        serde_json::from_str(m.as_str()).ok()
    });

    let events = value?.get("events")?.as_array()?.clone();
    Some(to_records(events.iter().map(|e| {
        (
            e.get("title").and_then(|v| v.as_str()).unwrap_or_default(),
            e.get("year")
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_default(),
            e.get("note").and_then(|v| v.as_str()).unwrap_or_default(),
        )
    })))
}

/// Line-oriented recovery for prose/markdown payloads: recognizes
/// `**1947** Title: note` and `Birthday of X: note` line shapes.
fn recover_markdown_lines(content: &str) -> Vec<CandidateRecord> {
    let mut triples: Vec<(String, String, String)> = Vec::new();

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = MD_YEAR_LINE_RE.captures(line) {
            let digits = caps[1].trim_start_matches('-').to_string();
            let year = if caps.get(2).is_some() || caps[1].starts_with('-') {
                format!("-{digits}")
            } else {
                digits
            };
            triples.push((
                caps[3].replace("**", "").trim().to_string(),
                year,
                caps[4].replace("**", "").trim().to_string(),
            ));
            continue;
        }

        if let Some(caps) = MD_BIO_LINE_RE.captures(line) {
            triples.push((
                format!("{} {}", &caps[1], caps[2].replace("**", "").trim()),
                String::new(),
                caps[3].replace("**", "").trim().to_string(),
            ));
        }
    }

    to_records(
        triples
            .iter()
            .map(|(t, y, n)| (t.as_str(), y.clone(), n.as_str())),
    )
}

fn to_records<'a>(
    triples: impl Iterator<Item = (&'a str, String, &'a str)>,
) -> Vec<CandidateRecord> {
    triples
        .filter(|(title, _, _)| !title.trim().is_empty())
        .take(CANDIDATE_CAP)
        .enumerate()
        .map(|(i, (title, year, note))| CandidateRecord {
            rank: i as u32 + 1,
            title: title.trim().to_string(),
            year: year.trim().to_string(),
            note: note.trim().to_string(),
        })
        .collect()
}

/// Prompt for the candidate request: combined regional + global list,
/// minified JSON, battles de-emphasized.
pub fn candidate_prompt(
    readable_date: &str,
    mm: &str,
    dd: &str,
    region: &str,
    share_low: u32,
    share_high: u32,
) -> String {
    format!(
        "{SCHEMA_HINT}\n\
         Date: {readable_date} ({mm}-{dd})\n\
         Rules:\n\
         - Prioritize {region}-related items ({share_low}\u{2013}{share_high}%) across constitutional/judiciary, space programme, economy, elections, cultural/sports milestones.\n\
         - Include major global items (treaties, space, Nobel, Olympics/records).\n\
         - Strongly de-emphasise medieval battles unless highly consequential.\n\
         - 20\u{2013}30 items total."
    )
}

/// Production candidate source backed by the Perplexity API.
pub struct PerplexityCandidates {
    client: PerplexityClient,
    region: String,
    share_low: u32,
    share_high: u32,
}

impl PerplexityCandidates {
    pub fn new(client: PerplexityClient, region: &str, share_low: u32, share_high: u32) -> Self {
        Self {
            client,
            region: region.to_string(),
            share_low,
            share_high,
        }
    }

    async fn call(&self, prompt: &str) -> Option<String> {
        let request = ChatRequest {
            model: SONAR_PRO.to_string(),
            temperature: 0.1,
            max_tokens: 2200,
            messages: vec![
                ChatMessage::system(
                    "You output VALID MINIFIED JSON only. No markdown, no prose.",
                ),
                ChatMessage::user(prompt),
            ],
        };

        match self.client.chat(&request).await {
            Ok(resp) => resp.content().map(str::to_string),
            Err(e) => {
                warn!(error = %e, "Candidate provider call failed");
                None
            }
        }
    }
}

#[async_trait]
impl CandidateSource for PerplexityCandidates {
    async fn fetch(
        &self,
        readable_date: &str,
        mm: &str,
        dd: &str,
    ) -> Result<Vec<CandidateRecord>> {
        let prompt = candidate_prompt(
            readable_date,
            mm,
            dd,
            &self.region,
            self.share_low,
            self.share_high,
        );

        let Some(content) = self.call(&prompt).await else {
            return Ok(Vec::new());
        };

        match parse_candidates(&content) {
            CandidateParse::Parsed(records) => Ok(records),
            // Malformed payload: one retry with the bare schema before
            // settling for whatever line recovery salvaged.
            fallback => {
                debug!("Candidate payload malformed, retrying with bare schema");
                if let Some(retry) = self.call(SCHEMA_HINT).await {
                    if let CandidateParse::Parsed(records) = parse_candidates(&retry) {
                        return Ok(records);
                    }
                }
                match fallback {
                    CandidateParse::Recovered(records) => Ok(records),
                    _ => Ok(Vec::new()),
                }
            }
        }
    }
}

use tracing::debug;

use almanac_common::text::strip_html;
use almanac_common::{Category, CurationPolicy};

use crate::traits::DateEvidence;

/// How a record cleared (or failed) the date-consensus gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVia {
    /// Article text carried a matching date phrase.
    Article,
    /// The structured fact store carried a matching referenced date.
    Fact,
    /// Biographical record with no date evidence anywhere; trusted
    /// without a confirmed day.
    LenientNoEvidence,
    /// Strict record whose evidence did not confirm the day.
    StrictMismatch,
    Mismatch,
}

#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub ok: bool,
    /// Full corroborated ISO date; None for lenient passes.
    pub iso: Option<String>,
    pub via: GateVia,
}

impl GateOutcome {
    fn pass(via: GateVia, iso: String) -> Self {
        Self {
            ok: true,
            iso: Some(iso),
            via,
        }
    }

    fn reject(via: GateVia) -> Self {
        Self {
            ok: false,
            iso: None,
            via,
        }
    }
}

fn iso_matches_day(iso: &str, mm: &str, dd: &str) -> bool {
    iso.len() >= 10 && &iso[5..7] == mm && &iso[8..10] == dd
}

/// Corroborate that a record's true calendar day equals the requested
/// one, against up to two independent evidence sources, trying the
/// exact page title before the display title. The feed's own year
/// field is not proof of day accuracy and plays no part here.
pub async fn require_date_consensus(
    evidence: &dyn DateEvidence,
    policy: &CurationPolicy,
    page_title: Option<&str>,
    display_title: &str,
    category: Category,
    mm: &str,
    dd: &str,
    strict: bool,
) -> GateOutcome {
    let mut titles: Vec<String> = Vec::new();
    for t in [page_title, Some(display_title)].into_iter().flatten() {
        let t = strip_html(t);
        if !t.is_empty() && !titles.contains(&t) {
            titles.push(t);
        }
    }

    let mut saw_date = false;

    for title in &titles {
        match evidence.article_date(title).await {
            Ok(Some(iso)) => {
                if iso_matches_day(&iso, mm, dd) {
                    return GateOutcome::pass(GateVia::Article, iso);
                }
                saw_date = true;
            }
            Ok(None) => {}
            Err(e) => debug!(title = title.as_str(), error = %e, "Article evidence unavailable"),
        }

        match evidence.fact_date(title).await {
            Ok(Some(iso)) => {
                if iso_matches_day(&iso, mm, dd) {
                    return GateOutcome::pass(GateVia::Fact, iso);
                }
                saw_date = true;
            }
            Ok(None) => {}
            Err(e) => debug!(title = title.as_str(), error = %e, "Fact evidence unavailable"),
        }
    }

    if strict {
        return GateOutcome::reject(GateVia::StrictMismatch);
    }

    // Biographical subjects frequently lack day-level public facts;
    // the feed's curation is trusted when nothing contradicts it.
    if policy.is_lenient_category(category) && !saw_date {
        return GateOutcome {
            ok: true,
            iso: None,
            via: GateVia::LenientNoEvidence,
        };
    }

    GateOutcome::reject(GateVia::Mismatch)
}

use futures::{stream, StreamExt};
use tracing::{debug, info};

use almanac_common::text::{jaccard, strip_known_prefixes, trim_summary};
use almanac_common::{
    CandidateRecord, CuratedItem, CurationPolicy, RawRecord, RegionProfile,
};

use crate::consensus::{require_date_consensus, GateOutcome};
use crate::normalize::DateKey;
use crate::score::{score_item, ScoreInput};
use crate::title::semantic_title;
use crate::traits::DateEvidence;

/// Concurrent per-item corroboration calls.
const CONSENSUS_CONCURRENCY: usize = 8;

/// Minimum token-overlap similarity for a candidate to merge with a
/// feed record.
const MATCH_THRESHOLD: f64 = 0.60;

/// Similarity above which two same-year items are duplicates.
const DUP_THRESHOLD: f64 = 0.72;

/// Cross-source merge: corroborate every feed record, fuzzy-match the
/// generative candidates against the feed, rewrite titles, score, and
/// dedupe. Candidate-backed items come first in the output, then the
/// rest by score.
pub async fn merge_sources(
    evidence: &dyn DateEvidence,
    profile: &RegionProfile,
    policy: &CurationPolicy,
    key: &DateKey,
    records: &[RawRecord],
    candidates: &[CandidateRecord],
) -> Vec<CuratedItem> {
    // Candidates first: dedupe prefers earlier entries on equal
    // preference, and provider-backed items win ties.
    let mut items = from_candidates(evidence, profile, policy, key, records, candidates).await;
    items.extend(from_feed(evidence, profile, policy, key, records).await);

    let mut out = dedupe(items);
    sort_merged(&mut out);

    info!(
        records = records.len(),
        candidates = candidates.len(),
        merged = out.len(),
        "Merge complete"
    );
    out
}

async fn gate_record(
    evidence: &dyn DateEvidence,
    policy: &CurationPolicy,
    key: &DateKey,
    record: &RawRecord,
) -> GateOutcome {
    let strict =
        policy.is_strict_text(&record.display_title) || policy.is_strict_text(&record.excerpt);
    require_date_consensus(
        evidence,
        policy,
        record.page_title.as_deref(),
        &record.display_title,
        record.category,
        &key.mm,
        &key.dd,
        strict,
    )
    .await
}

async fn from_feed(
    evidence: &dyn DateEvidence,
    profile: &RegionProfile,
    policy: &CurationPolicy,
    key: &DateKey,
    records: &[RawRecord],
) -> Vec<CuratedItem> {
    let gated: Vec<(usize, GateOutcome)> = stream::iter((0..records.len()).map(|idx| async move {
        (idx, gate_record(evidence, policy, key, &records[idx]).await)
    }))
    .buffered(CONSENSUS_CONCURRENCY)
    .collect()
    .await;

    let mut items = Vec::new();
    for (idx, gate) in gated {
        let record = &records[idx];
        if !gate.ok {
            debug!(title = record.display_title.as_str(), via = ?gate.via, "Record rejected");
            continue;
        }
        items.push(build_item(profile, policy, key, record, &gate, None, None));
    }
    items
}

async fn from_candidates(
    evidence: &dyn DateEvidence,
    profile: &RegionProfile,
    policy: &CurationPolicy,
    key: &DateKey,
    records: &[RawRecord],
    candidates: &[CandidateRecord],
) -> Vec<CuratedItem> {
    let matched: Vec<(&CandidateRecord, &RawRecord)> = candidates
        .iter()
        .filter_map(|c| best_feed_match(c, records).map(|(r, _)| (c, r)))
        .collect();

    let matched_ref = &matched;
    let gated: Vec<(usize, GateOutcome)> =
        stream::iter((0..matched_ref.len()).map(|idx| async move {
            (idx, gate_record(evidence, policy, key, matched_ref[idx].1).await)
        }))
        .buffered(CONSENSUS_CONCURRENCY)
        .collect()
        .await;

    let mut items = Vec::new();
    for (idx, gate) in gated {
        let (candidate, record) = matched[idx];
        if !gate.ok {
            debug!(
                title = candidate.title.as_str(),
                via = ?gate.via,
                "Candidate match rejected"
            );
            continue;
        }
        items.push(build_item(
            profile,
            policy,
            key,
            record,
            &gate,
            Some(candidate),
            record.year.is_none().then(|| candidate.year.trim().to_string()),
        ));
    }
    items
}

fn build_item(
    profile: &RegionProfile,
    policy: &CurationPolicy,
    key: &DateKey,
    record: &RawRecord,
    gate: &GateOutcome,
    candidate: Option<&CandidateRecord>,
    fallback_year: Option<String>,
) -> CuratedItem {
    let year = record
        .year
        .map(|y| y.to_string())
        .or(fallback_year)
        .unwrap_or_default();

    let note = candidate.map(|c| c.note.as_str()).unwrap_or_default();
    let blob = format!("{} {} {}", record.display_title, record.excerpt, note);
    let is_regional = profile.is_regional(&blob, policy.regional_threshold);

    let summary = if note.is_empty() {
        trim_summary(&record.excerpt)
    } else {
        trim_summary(&format!("{} {}", record.excerpt, note))
    };

    let score = score_item(
        profile,
        &ScoreInput {
            title: &record.display_title,
            summary: &summary,
            year: &year,
            category: record.category,
            is_regional,
            candidate_rank: candidate.map(|c| c.rank),
        },
    );

    CuratedItem {
        category: record.category,
        title: semantic_title(record.category, &record.display_title, &record.excerpt),
        date_iso: resolve_date_iso(gate, &year, key),
        verified_day: gate.iso.is_some(),
        is_regional,
        score,
        candidate_rank: candidate.map(|c| c.rank),
        source_url: record.page_url.clone(),
        year,
        summary,
    }
}

/// Corroborated ISO date when the gate produced one, else a
/// best-effort guess from the item's own year, else nothing.
fn resolve_date_iso(gate: &GateOutcome, year: &str, key: &DateKey) -> Option<String> {
    if gate.iso.is_some() {
        return gate.iso.clone();
    }
    let y: i32 = year.trim().parse().ok()?;
    Some(format!("{y:04}-{}-{}", key.mm, key.dd))
}

/// Best token-overlap match for a candidate among the feed records,
/// restricted to records whose year agrees when both sides state one.
pub(crate) fn best_feed_match<'a>(
    candidate: &CandidateRecord,
    records: &'a [RawRecord],
) -> Option<(&'a RawRecord, f64)> {
    let candidate_year: Option<i64> = candidate.year.trim().parse().ok();

    let mut best: Option<(&RawRecord, f64)> = None;
    for record in records {
        if let (Some(cy), Some(ry)) = (candidate_year, record.year) {
            if cy != i64::from(ry) {
                continue;
            }
        }
        let sim = jaccard(&candidate.title, &record.display_title)
            .max(jaccard(&candidate.title, &record.excerpt));
        if best.map_or(true, |(_, s)| sim > s) {
            best = Some((record, sim));
        }
    }

    best.filter(|(_, sim)| *sim > MATCH_THRESHOLD)
}

fn preference(item: &CuratedItem) -> f64 {
    f64::from(u8::from(item.candidate_rank.is_some()) + u8::from(item.is_regional))
        + f64::from(item.score) / 100.0
}

/// Same-year near-identical titles collapse to one item; the higher
/// composite preference wins, replacing in place.
pub(crate) fn dedupe(items: Vec<CuratedItem>) -> Vec<CuratedItem> {
    let mut out: Vec<CuratedItem> = Vec::new();
    for item in items {
        let dup = out.iter().position(|existing| {
            !item.year.is_empty()
                && !existing.year.is_empty()
                && item.year == existing.year
                && jaccard(
                    &strip_known_prefixes(&item.title),
                    &strip_known_prefixes(&existing.title),
                ) > DUP_THRESHOLD
        });
        match dup {
            None => out.push(item),
            Some(i) => {
                if preference(&item) > preference(&out[i]) {
                    out[i] = item;
                }
            }
        }
    }
    out
}

pub(crate) fn sort_merged(items: &mut [CuratedItem]) {
    items.sort_by(|a, b| match (a.candidate_rank, b.candidate_rank) {
        (Some(ra), Some(rb)) => ra.cmp(&rb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => b.score.cmp(&a.score),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{candidate, curated, raw_record, MockEvidence};
    use almanac_common::Category;

    fn key() -> DateKey {
        DateKey {
            date: "1947-08-15".to_string(),
            mm: "08".to_string(),
            dd: "15".to_string(),
            readable: "August 15".to_string(),
        }
    }

    #[tokio::test]
    async fn corroborated_event_survives_with_verified_day() {
        let evidence = MockEvidence::new()
            .with_article("Indian independence movement", "1947-08-15");
        let records = vec![raw_record(
            Category::Event,
            Some(1947),
            "Indian independence movement",
            "India declared independence from British rule",
        )];

        let merged = merge_sources(
            &evidence,
            &RegionProfile::india(),
            &CurationPolicy::default(),
            &key(),
            &records,
            &[],
        )
        .await;

        assert_eq!(merged.len(), 1);
        let item = &merged[0];
        assert!(item.verified_day);
        assert_eq!(item.date_iso.as_deref(), Some("1947-08-15"));
        assert_eq!(item.title, "Independence of Indian independence movement");
        assert!(item.is_regional);
        assert!(item.score >= 45);
    }

    #[tokio::test]
    async fn uncorroborated_event_is_dropped() {
        let evidence = MockEvidence::new();
        let records = vec![raw_record(
            Category::Event,
            Some(1903),
            "Some Forgotten Event",
            "nothing verifiable here",
        )];

        let merged = merge_sources(
            &evidence,
            &RegionProfile::india(),
            &CurationPolicy::default(),
            &key(),
            &records,
            &[],
        )
        .await;

        assert!(merged.is_empty());
    }

    #[tokio::test]
    async fn treaty_with_mismatched_evidence_never_survives() {
        let evidence = MockEvidence::new().with_article("Treaty of Rome", "1957-03-25");
        let records = vec![raw_record(
            Category::Event,
            Some(1957),
            "Treaty of Rome",
            "The treaty was signed by six states",
        )];

        let merged = merge_sources(
            &evidence,
            &RegionProfile::india(),
            &CurationPolicy::default(),
            &key(),
            &records,
            &[],
        )
        .await;

        assert!(merged.is_empty());
    }

    #[tokio::test]
    async fn lenient_birth_keeps_date_guess_but_not_verified() {
        let evidence = MockEvidence::new();
        let records = vec![raw_record(
            Category::Birth,
            Some(1872),
            "Obscure Poet",
            "a poet was born",
        )];

        let merged = merge_sources(
            &evidence,
            &RegionProfile::india(),
            &CurationPolicy::default(),
            &key(),
            &records,
            &[],
        )
        .await;

        assert_eq!(merged.len(), 1);
        assert!(!merged[0].verified_day);
        assert_eq!(merged[0].date_iso.as_deref(), Some("1872-08-15"));
        assert_eq!(merged[0].title, "Birthday of Obscure Poet");
    }

    #[test]
    fn candidate_matching_requires_year_agreement() {
        let records = vec![
            raw_record(Category::Event, Some(1946), "Quit India Movement", "protests"),
            raw_record(Category::Event, Some(1942), "Quit India Movement", "mass protest launched"),
        ];
        let c = candidate(1, "Quit India Movement", "1942", "");
        let (matched, sim) = best_feed_match(&c, &records).unwrap();
        assert_eq!(matched.year, Some(1942));
        assert!(sim > 0.99);
    }

    #[test]
    fn weak_matches_are_discarded() {
        let records = vec![raw_record(
            Category::Event,
            Some(1942),
            "Completely Different Topic",
            "unrelated text entirely",
        )];
        let c = candidate(1, "Quit India Movement", "1942", "");
        assert!(best_feed_match(&c, &records).is_none());
    }

    #[tokio::test]
    async fn matched_candidate_carries_rank_and_note() {
        let evidence = MockEvidence::new()
            .with_article("Quit India Movement", "1942-08-08");
        let records = vec![raw_record(
            Category::Event,
            Some(1942),
            "Quit India Movement",
            "Gandhi launched the movement",
        )];
        let candidates = vec![candidate(
            2,
            "Quit India Movement",
            "1942",
            "turning point of the freedom struggle",
        )];

        let merged = merge_sources(
            &evidence,
            &RegionProfile::india(),
            &CurationPolicy::default(),
            &DateKey {
                date: "1942-08-08".to_string(),
                mm: "08".to_string(),
                dd: "08".to_string(),
                readable: "August 8".to_string(),
            },
            &records,
            &candidates,
        )
        .await;

        // The raw record and the matched candidate dedupe to one item;
        // the candidate-backed copy wins.
        assert_eq!(merged.len(), 1);
        let item = &merged[0];
        assert_eq!(item.candidate_rank, Some(2));
        assert!(item.summary.contains("turning point"));
        assert!(item.verified_day);
    }

    #[test]
    fn dedupe_keeps_higher_preference() {
        let weak = curated("Event: Quit India Movement", "1942", 50, false, None);
        let strong = curated("Quit India Movement", "1942", 48, true, Some(1));
        let out = dedupe(vec![strong.clone(), weak]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].candidate_rank, Some(1));
    }

    #[test]
    fn dedupe_requires_matching_years() {
        let a = curated("Event: Quit India Movement", "1942", 50, false, None);
        let b = curated("Event: Quit India Movement", "1943", 50, false, None);
        assert_eq!(dedupe(vec![a, b]).len(), 2);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let items = vec![
            curated("Event: Quit India Movement", "1942", 50, false, None),
            curated("Quit India Movement", "1942", 60, true, None),
            curated("Event: Apollo 11", "1969", 55, false, None),
        ];
        let once = dedupe(items);
        let twice = dedupe(once.clone());
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.identity(), b.identity());
        }
    }

    #[test]
    fn merged_order_puts_ranked_items_first() {
        let mut items = vec![
            curated("Event: A", "1900", 90, false, None),
            curated("Event: B", "1901", 50, false, Some(3)),
            curated("Event: C", "1902", 40, false, Some(1)),
            curated("Event: D", "1903", 70, false, None),
        ];
        sort_merged(&mut items);
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Event: C", "Event: B", "Event: A", "Event: D"]);
    }
}

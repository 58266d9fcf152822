use std::collections::HashMap;

use futures::{stream, StreamExt};
use tracing::debug;

use almanac_common::text::{norm, strip_known_prefixes, trim_summary};
use almanac_common::{CandidateRecord, CuratedItem};

use crate::traits::SummaryFetcher;

const ENRICH_CONCURRENCY: usize = 8;

/// Summaries shorter than this may have a provider note appended.
const NOTE_APPEND_MAX: usize = 240;

/// Provider notes keyed by token-normalized, prefix-stripped title.
pub fn note_index(candidates: &[CandidateRecord]) -> HashMap<String, String> {
    candidates
        .iter()
        .filter(|c| !c.title.is_empty())
        .map(|c| (norm(&strip_known_prefixes(&c.title)), c.note.clone()))
        .collect()
}

/// Best-effort summary upgrade for the selected items: replace with a
/// fetched lead only when strictly longer, then append a matching
/// provider note to short summaries. Fetch failures leave the summary
/// untouched; this stage never fails the pipeline.
pub async fn enrich_summaries(
    summaries: &dyn SummaryFetcher,
    notes: &HashMap<String, String>,
    items: Vec<CuratedItem>,
) -> Vec<CuratedItem> {
    stream::iter(items.into_iter().map(|mut item| async move {
        let lookup = strip_known_prefixes(&item.title);

        match summaries.lead_summary(&lookup).await {
            Ok(Some(lead)) if lead.len() > item.summary.len() => {
                item.summary = trim_summary(&lead);
            }
            Ok(_) => {}
            Err(e) => {
                debug!(title = item.title.as_str(), error = %e, "Summary fetch failed")
            }
        }

        if item.summary.len() < NOTE_APPEND_MAX {
            if let Some(note) = notes.get(&norm(&lookup)) {
                if !note.is_empty() && !item.summary.contains(note.as_str()) {
                    item.summary = trim_summary(&format!("{} {}", item.summary, note));
                }
            }
        }

        item
    }))
    .buffered(ENRICH_CONCURRENCY)
    .collect()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{candidate, curated, MockSummaryFetcher};

    #[tokio::test]
    async fn longer_lead_replaces_summary() {
        let fetcher = MockSummaryFetcher::new().with_summary(
            "Quit India Movement",
            "The Quit India Movement was a mass civil disobedience campaign launched in August 1942 demanding an end to British rule.",
        );
        let mut item = curated("Event: Quit India Movement", "1942", 60, true, None);
        item.summary = "A short line.".to_string();

        let out = enrich_summaries(&fetcher, &HashMap::new(), vec![item]).await;
        assert!(out[0].summary.starts_with("The Quit India Movement"));
    }

    #[tokio::test]
    async fn shorter_lead_is_ignored() {
        let fetcher = MockSummaryFetcher::new().with_summary("Quit India Movement", "Short.");
        let mut item = curated("Event: Quit India Movement", "1942", 60, true, None);
        item.summary = "A considerably longer existing summary text.".to_string();

        let out = enrich_summaries(&fetcher, &HashMap::new(), vec![item]).await;
        assert_eq!(out[0].summary, "A considerably longer existing summary text.");
    }

    #[tokio::test]
    async fn fetch_failure_leaves_summary_untouched() {
        let fetcher = MockSummaryFetcher::failing();
        let mut item = curated("Event: Quit India Movement", "1942", 60, true, None);
        item.summary = "Original text.".to_string();

        let out = enrich_summaries(&fetcher, &HashMap::new(), vec![item]).await;
        assert_eq!(out[0].summary, "Original text.");
    }

    #[tokio::test]
    async fn note_is_appended_to_short_summaries() {
        let notes = note_index(&[candidate(
            1,
            "Quit India Movement",
            "1942",
            "a turning point of the freedom struggle",
        )]);
        let fetcher = MockSummaryFetcher::new();
        let mut item = curated("Event: Quit India Movement", "1942", 60, true, None);
        item.summary = "Gandhi launched the campaign.".to_string();

        let out = enrich_summaries(&fetcher, &notes, vec![item]).await;
        assert_eq!(
            out[0].summary,
            "Gandhi launched the campaign. a turning point of the freedom struggle"
        );
    }

    #[tokio::test]
    async fn note_is_not_appended_to_long_summaries() {
        let notes = note_index(&[candidate(1, "Quit India Movement", "1942", "a note")]);
        let fetcher = MockSummaryFetcher::new();
        let mut item = curated("Event: Quit India Movement", "1942", 60, true, None);
        item.summary = "x".repeat(NOTE_APPEND_MAX);

        let out = enrich_summaries(&fetcher, &notes, vec![item]).await;
        assert!(!out[0].summary.contains("a note"));
    }

    #[tokio::test]
    async fn order_is_preserved() {
        let fetcher = MockSummaryFetcher::new();
        let items = vec![
            curated("Event: First", "1900", 90, false, None),
            curated("Event: Second", "1901", 80, false, None),
            curated("Event: Third", "1902", 70, false, None),
        ];
        let out = enrich_summaries(&fetcher, &HashMap::new(), items).await;
        let titles: Vec<&str> = out.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Event: First", "Event: Second", "Event: Third"]);
    }
}

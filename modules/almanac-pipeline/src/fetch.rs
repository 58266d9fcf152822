use std::time::Duration;

use tracing::{info, warn};

use almanac_common::{CandidateRecord, Category, RawRecord};

use crate::normalize::DateKey;
use crate::traits::{CandidateSource, FeedSource};

/// Everything the merge stage works from. Either list may be empty;
/// the pipeline is fully functional on encyclopedic data alone.
#[derive(Debug, Default)]
pub struct FetchedSources {
    pub records: Vec<RawRecord>,
    pub candidates: Vec<CandidateRecord>,
}

/// Fetch the three encyclopedic category feeds and the optional
/// generative candidate list concurrently. Each sub-fetch fails
/// independently to an empty result; a timeout counts as a failure.
pub async fn fetch_sources(
    feed: &dyn FeedSource,
    candidates: Option<&dyn CandidateSource>,
    key: &DateKey,
    timeout: Duration,
) -> FetchedSources {
    let fetch_category = |category: Category| async move {
        match tokio::time::timeout(timeout, feed.fetch(category, &key.mm, &key.dd)).await {
            Ok(Ok(records)) => records,
            Ok(Err(e)) => {
                warn!(category = %category, error = %e, "Feed fetch failed");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    category = %category,
                    timeout_secs = timeout.as_secs(),
                    "Feed fetch timed out"
                );
                Vec::new()
            }
        }
    };

    let fetch_candidates = async {
        let Some(source) = candidates else {
            return Vec::new();
        };
        match tokio::time::timeout(timeout, source.fetch(&key.readable, &key.mm, &key.dd)).await
        {
            Ok(Ok(list)) => list,
            Ok(Err(e)) => {
                warn!(error = %e, "Candidate fetch failed");
                Vec::new()
            }
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs(), "Candidate fetch timed out");
                Vec::new()
            }
        }
    };

    let (events, births, deaths, candidate_list) = tokio::join!(
        fetch_category(Category::Event),
        fetch_category(Category::Birth),
        fetch_category(Category::Death),
        fetch_candidates,
    );

    let mut records = events;
    records.extend(births);
    records.extend(deaths);

    info!(
        records = records.len(),
        candidates = candidate_list.len(),
        date = key.date.as_str(),
        "Sources fetched"
    );

    FetchedSources {
        records,
        candidates: candidate_list,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        candidate, raw_record, FailingFeedSource, MockCandidateSource, MockFeedSource,
        SlowFeedSource,
    };

    fn key() -> DateKey {
        DateKey {
            date: "1947-08-15".to_string(),
            mm: "08".to_string(),
            dd: "15".to_string(),
            readable: "August 15".to_string(),
        }
    }

    #[tokio::test]
    async fn all_categories_are_flattened() {
        let feed = MockFeedSource::new(vec![
            raw_record(Category::Event, Some(1947), "Independence", "declared independence"),
            raw_record(Category::Birth, Some(1872), "A Poet", "born"),
            raw_record(Category::Death, Some(2018), "A Leader", "died"),
        ]);
        let fetched = fetch_sources(&feed, None, &key(), Duration::from_secs(5)).await;
        assert_eq!(fetched.records.len(), 3);
        assert!(fetched.candidates.is_empty());
    }

    #[tokio::test]
    async fn failing_feed_degrades_to_empty() {
        let feed = FailingFeedSource;
        let cands = MockCandidateSource::new(vec![candidate(1, "Still here", "1947", "")]);
        let fetched =
            fetch_sources(&feed, Some(&cands), &key(), Duration::from_secs(5)).await;
        assert!(fetched.records.is_empty());
        assert_eq!(fetched.candidates.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_feed_times_out_to_empty() {
        let feed = SlowFeedSource::new(Duration::from_secs(60));
        let fetched = fetch_sources(&feed, None, &key(), Duration::from_secs(1)).await;
        assert!(fetched.records.is_empty());
    }

    #[tokio::test]
    async fn absent_candidate_source_means_single_source_mode() {
        let feed = MockFeedSource::new(vec![raw_record(
            Category::Event,
            Some(1947),
            "Independence",
            "declared independence",
        )]);
        let fetched = fetch_sources(&feed, None, &key(), Duration::from_secs(5)).await;
        assert_eq!(fetched.records.len(), 1);
        assert!(fetched.candidates.is_empty());
    }
}

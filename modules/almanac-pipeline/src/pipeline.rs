use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use almanac_common::{
    AlmanacError, Config, CurationPolicy, CurationResult, CurationTotals, EventEntry,
    RegionProfile,
};
use perplexity_client::PerplexityClient;
use wiki_client::WikiClient;

use crate::candidates::PerplexityCandidates;
use crate::enrich::{enrich_summaries, note_index};
use crate::evidence::WikiEvidence;
use crate::feed::WikiFeedSource;
use crate::fetch::fetch_sources;
use crate::merge::merge_sources;
use crate::normalize::{normalize, DateKey};
use crate::select::{is_battle_item, select_top};
use crate::traits::{CandidateSource, DateEvidence, FeedSource, SummaryFetcher};

/// Provider seams for one pipeline instance. Production wiring comes
/// from `Pipeline::from_config`; tests inject doubles.
pub struct PipelineDeps {
    pub feed: Arc<dyn FeedSource>,
    pub candidates: Option<Arc<dyn CandidateSource>>,
    pub evidence: Arc<dyn DateEvidence>,
    pub summaries: Arc<dyn SummaryFetcher>,
}

pub struct Pipeline {
    deps: PipelineDeps,
    profile: RegionProfile,
    policy: CurationPolicy,
    fetch_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        deps: PipelineDeps,
        profile: RegionProfile,
        policy: CurationPolicy,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            deps,
            profile,
            policy,
            fetch_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let wiki = Arc::new(WikiClient::new(&config.user_agent));
        let profile = RegionProfile::india();

        let candidates: Option<Arc<dyn CandidateSource>> =
            config.perplexity_api_key.as_deref().map(|key| {
                let share_low = (config.policy.band_low_ratio * 100.0).round() as u32;
                let share_high = (config.policy.band_high_ratio * 100.0).round() as u32;
                Arc::new(PerplexityCandidates::new(
                    PerplexityClient::new(key),
                    profile.name,
                    share_low,
                    share_high,
                )) as Arc<dyn CandidateSource>
            });

        let evidence = Arc::new(WikiEvidence::new(wiki.clone()));
        let deps = PipelineDeps {
            feed: Arc::new(WikiFeedSource::new(wiki)),
            candidates,
            evidence: evidence.clone(),
            summaries: evidence,
        };

        Self::new(
            deps,
            profile,
            config.policy.clone(),
            Duration::from_secs(config.fetch_timeout_secs),
        )
    }

    /// Run one full curation. `Err` only for invalid input; any
    /// internal failure comes back as a failure-flagged result so
    /// callers never see a partial shape.
    pub async fn curate(
        &self,
        date: Option<&str>,
        limit: Option<u32>,
    ) -> Result<CurationResult, AlmanacError> {
        let (key, total) = normalize(date, limit)?;
        info!(date = key.date.as_str(), total, "Curation started");

        match self.run(&key, total).await {
            Ok(result) => Ok(result),
            Err(e) => {
                error!(date = key.date.as_str(), error = %e, "Curation pipeline failed");
                Ok(CurationResult::failure(key.date, "UPSTREAM_OR_PIPELINE_FAILURE"))
            }
        }
    }

    async fn run(&self, key: &DateKey, total: usize) -> Result<CurationResult> {
        let fetched = fetch_sources(
            self.deps.feed.as_ref(),
            self.deps.candidates.as_deref(),
            key,
            self.fetch_timeout,
        )
        .await;

        let merged = merge_sources(
            self.deps.evidence.as_ref(),
            &self.profile,
            &self.policy,
            key,
            &fetched.records,
            &fetched.candidates,
        )
        .await;

        let selected = select_top(&merged, total, &self.policy);

        let notes = note_index(&fetched.candidates);
        let enriched =
            enrich_summaries(self.deps.summaries.as_ref(), &notes, selected).await;

        let totals = CurationTotals {
            returned: enriched.len(),
            regionally_relevant: enriched.iter().filter(|i| i.is_regional).count(),
            other: enriched.iter().filter(|i| !i.is_regional).count(),
            biographical: enriched
                .iter()
                .filter(|i| i.category.is_biographical())
                .count(),
            battles: enriched.iter().filter(|i| is_battle_item(i)).count(),
        };

        info!(
            returned = totals.returned,
            regionally_relevant = totals.regionally_relevant,
            "Curation complete"
        );

        Ok(CurationResult {
            success: true,
            date: key.date.clone(),
            error: None,
            totals,
            events: enriched.into_iter().map(EventEntry::from).collect(),
        })
    }
}

use std::env;

use crate::types::Category;

/// Application configuration loaded from environment variables.
/// Every knob has a default; the generative provider key is the only
/// secret and the pipeline runs without it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Generative candidate provider key. None disables that source.
    pub perplexity_api_key: Option<String>,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    /// Per-sub-fetch budget in SourceFetcher; a timed-out source
    /// degrades to an empty result.
    pub fetch_timeout_secs: u64,

    /// User-Agent sent to the encyclopedic feed.
    pub user_agent: String,

    pub policy: CurationPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            perplexity_api_key: env::var("PERPLEXITY_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env_parse("WEB_PORT", 8080),
            fetch_timeout_secs: env_parse("FETCH_TIMEOUT_SECS", 15),
            user_agent: env::var("FEED_USER_AGENT")
                .unwrap_or_else(|_| "almanac/0.1".to_string()),
            policy: CurationPolicy::from_env(),
        }
    }
}

/// Tuning knobs for merge/selection. The share band and the
/// strict/lenient category treatment are product policy, not
/// architecture, so they stay configurable.
#[derive(Debug, Clone)]
pub struct CurationPolicy {
    /// Target share of regionally relevant items in the output.
    pub target_ratio: f64,
    /// Lower bound of the regional share band, as a ratio of N.
    pub band_low_ratio: f64,
    /// Upper bound of the regional share band, as a ratio of N.
    pub band_high_ratio: f64,
    /// Weighted keyword-group score at or above which an item counts
    /// as regionally relevant without an anchor-term match.
    pub regional_threshold: u32,
    /// Hard cap on combined birth+death items in the output.
    pub birth_death_max: usize,
    /// Hard cap on battle-pattern items in the output.
    pub battle_max: usize,
    /// Records matching these keywords (title or excerpt) get strict
    /// date handling: no corroboration, no output.
    pub strict_keywords: Vec<String>,
    /// Categories allowed a lenient pass when no date evidence exists
    /// at all.
    pub lenient_categories: Vec<Category>,
}

impl Default for CurationPolicy {
    fn default() -> Self {
        Self {
            target_ratio: 0.70,
            band_low_ratio: 0.70,
            band_high_ratio: 0.85,
            regional_threshold: 18,
            birth_death_max: 6,
            battle_max: 3,
            strict_keywords: vec![
                "treaty".to_string(),
                "accord".to_string(),
                "agreement".to_string(),
            ],
            lenient_categories: vec![Category::Birth, Category::Death],
        }
    }
}

impl CurationPolicy {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            target_ratio: env_parse("REGION_TARGET_RATIO", defaults.target_ratio),
            band_low_ratio: env_parse("REGION_BAND_LOW", defaults.band_low_ratio),
            band_high_ratio: env_parse("REGION_BAND_HIGH", defaults.band_high_ratio),
            regional_threshold: env_parse("REGION_THRESHOLD", defaults.regional_threshold),
            birth_death_max: env_parse("BIRTH_DEATH_MAX", defaults.birth_death_max),
            battle_max: env_parse("BATTLE_MAX", defaults.battle_max),
            ..defaults
        }
    }

    pub fn is_strict_text(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.strict_keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    pub fn is_lenient_category(&self, category: Category) -> bool {
        self.lenient_categories.contains(&category)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v.parse().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_shipped_tuning() {
        let p = CurationPolicy::default();
        assert_eq!(p.birth_death_max, 6);
        assert_eq!(p.battle_max, 3);
        assert!((p.target_ratio - 0.70).abs() < f64::EPSILON);
        assert!(p.band_low_ratio <= p.band_high_ratio);
    }

    #[test]
    fn strict_text_matches_on_any_keyword() {
        let p = CurationPolicy::default();
        assert!(p.is_strict_text("Treaty of Versailles"));
        assert!(p.is_strict_text("a peace accord was reached"));
        assert!(!p.is_strict_text("Battle of Plassey"));
    }

    #[test]
    fn births_and_deaths_are_lenient_by_default() {
        let p = CurationPolicy::default();
        assert!(p.is_lenient_category(Category::Birth));
        assert!(p.is_lenient_category(Category::Death));
        assert!(!p.is_lenient_category(Category::Event));
    }
}

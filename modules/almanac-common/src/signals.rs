use crate::text::norm;

/// Keyword/weight tables for one region of emphasis. Static data,
/// versioned by constructor, so the classifier and scoring logic stay
/// pure and testable independent of list content.
pub struct RegionProfile {
    pub name: &'static str,
    /// Region-specific anchors: place names, institutions, figures,
    /// constitutional/legal terms. A single hit classifies the text as
    /// regional. Generic global terms (e.g. "independence",
    /// "constitution") do not belong here.
    pub anchor_terms: Vec<&'static str>,
    /// Weighted keyword groups; group weights sum when multiple groups
    /// match, catching region-specific but non-obvious phrasing.
    pub groups: Vec<KeywordGroup>,
    /// Landmark topics that add extra weight on top of their group.
    pub high_import: Vec<&'static str>,
}

pub struct KeywordGroup {
    pub name: &'static str,
    pub weight: u32,
    pub terms: Vec<&'static str>,
}

impl RegionProfile {
    pub fn india() -> Self {
        Self {
            name: "India",
            anchor_terms: vec![
                "india", "indian", "bharat", "hindustan", "delhi", "new delhi", "mumbai",
                "bombay", "kolkata", "calcutta", "chennai", "madras", "bengal", "punjab",
                "gujarat", "maharashtra", "karnataka", "tamil nadu", "uttar pradesh", "bihar",
                "jharkhand", "odisha", "kerala", "andhra", "telangana", "assam", "isro", "drdo",
                "iit", "iisc", "mughal", "british raj", "nehru", "gandhi", "tagore", "ambedkar",
                "patel", "bose", "kalam", "dhoni", "tendulkar", "bollywood", "ipl", "swadeshi",
                "quit india", "partition", "article 370", "gst", "aadhaar", "niti aayog",
                "kargil", "pokhran", "ram mandir", "lok sabha", "rajya sabha",
                "constitution of india", "supreme court of india", "reserve bank",
            ],
            groups: vec![
                KeywordGroup {
                    name: "political",
                    weight: 18,
                    terms: vec![
                        "parliament",
                        "supreme court",
                        "election commission",
                        "constitutional",
                        "article 370",
                        "constitution bench",
                        "prime minister of india",
                        "president of india",
                    ],
                },
                KeywordGroup {
                    name: "economic",
                    weight: 14,
                    terms: vec![
                        "rbi",
                        "budget",
                        "gst",
                        "demonetisation",
                        "demonetization",
                        "liberalisation",
                        "liberalization",
                        "disinvestment",
                        "economic policy",
                    ],
                },
                KeywordGroup {
                    name: "space",
                    weight: 16,
                    terms: vec![
                        "isro",
                        "chandrayaan",
                        "mangalyaan",
                        "mars orbiter mission",
                        "satellite",
                        "pslv",
                        "gslv",
                    ],
                },
                KeywordGroup {
                    name: "defense",
                    weight: 10,
                    terms: vec![
                        "indian army",
                        "indian navy",
                        "indian air force",
                        "surgical strike",
                        "kargil",
                        "pokhran",
                        "nuclear test",
                    ],
                },
                KeywordGroup {
                    name: "social",
                    weight: 9,
                    terms: vec![
                        "reservation",
                        "women rights",
                        "right to privacy",
                        "aadhaar",
                        "section 377",
                    ],
                },
                KeywordGroup {
                    name: "culture",
                    weight: 8,
                    terms: vec!["bollywood", "cricket", "hindi cinema", "ipl", "world cup"],
                },
            ],
            high_import: vec![
                "article 370",
                "gst",
                "section 377",
                "right to privacy",
                "chandrayaan",
                "mangalyaan",
                "pokhran",
                "kargil",
                "constitution of india",
                "ram mandir",
                "supreme court",
            ],
        }
    }

    pub fn anchor_match(&self, text: &str) -> bool {
        let x = norm(text);
        self.anchor_terms.iter().any(|t| x.contains(t))
    }

    /// Weighted keyword-group score: each matching group adds its
    /// weight once; high-import topics add 10; an anchor hit adds 8.
    pub fn weighted_score(&self, text: &str) -> u32 {
        let x = norm(text);
        let mut score = 0;
        for group in &self.groups {
            if group.terms.iter().any(|t| x.contains(t)) {
                score += group.weight;
            }
        }
        if self.high_import.iter().any(|t| x.contains(t)) {
            score += 10;
        }
        if self.anchor_terms.iter().any(|t| x.contains(t)) {
            score += 8;
        }
        score
    }

    /// Boolean regional-relevance classification: an anchor hit, or a
    /// weighted score clearing the threshold.
    pub fn is_regional(&self, text: &str, threshold: u32) -> bool {
        self.anchor_match(text) || self.weighted_score(text) >= threshold
    }
}

/// Globally newsworthy topics; matching items get a flat scoring boost.
const NEWSWORTHY_TERMS: &[&str] = &[
    "apollo",
    "sputnik",
    "chandrayaan",
    "mangalyaan",
    "isro",
    "nasa",
    "satellite",
    "nobel prize",
    "world war",
    "treaty",
    "independence",
    "constitution",
    "supreme court",
    "budget",
    "earthquake",
    "cyclone",
    "flood",
    "olympic",
    "world cup",
];

/// Broad global-significance markers, weaker than NEWSWORTHY_TERMS.
const GLOBAL_TERMS: &[&str] = &[
    "world war",
    "treaty",
    "armistice",
    "nato",
    "united nations",
    "apollo",
    "sputnik",
    "moon landing",
    "nobel",
    "revolution",
    "cold war",
    "olympics",
    "pandemic",
    "constitution",
    "independence",
];

pub fn newsworthy_boost(text: &str) -> u32 {
    let x = norm(text);
    if NEWSWORTHY_TERMS.iter().any(|t| x.contains(t)) {
        10
    } else {
        0
    }
}

pub fn is_global_signal(text: &str) -> bool {
    let x = norm(text);
    GLOBAL_TERMS.iter().any(|t| x.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_terms_classify_directly() {
        let profile = RegionProfile::india();
        assert!(profile.is_regional("Independence of India declared", 18));
        assert!(profile.is_regional("ISRO launches PSLV-C11", 18));
    }

    #[test]
    fn generic_global_text_is_not_regional() {
        let profile = RegionProfile::india();
        assert!(!profile.is_regional("Treaty of Versailles signed in France", 18));
        assert!(!profile.is_regional("Apollo 11 lands on the Moon", 18));
    }

    #[test]
    fn weighted_groups_clear_threshold_without_anchor() {
        let profile = RegionProfile::india();
        // "parliament" alone hits the political group at weight 18.
        assert!(!profile.anchor_match("parliament passes landmark bill"));
        assert!(profile.is_regional("parliament passes landmark bill", 18));
    }

    #[test]
    fn weighted_score_sums_groups() {
        let profile = RegionProfile::india();
        // space group (16) + high import (10), no anchor hit
        let s = profile.weighted_score("Chandrayaan-3 lands near the lunar south pole");
        assert_eq!(s, 26);
        assert!(profile.is_regional("Chandrayaan-3 lands near the lunar south pole", 18));
    }

    #[test]
    fn newsworthy_boost_is_flat() {
        assert_eq!(newsworthy_boost("Nobel Prize awarded"), 10);
        assert_eq!(newsworthy_boost("A quiet Tuesday"), 0);
    }

    #[test]
    fn global_signal_detects_world_events() {
        assert!(is_global_signal("World War II begins"));
        assert!(!is_global_signal("Local fair opens"));
    }
}

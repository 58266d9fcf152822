use std::sync::LazyLock;

use regex::Regex;

use almanac_common::signals::{is_global_signal, newsworthy_boost};
use almanac_common::{Category, RegionProfile};

static BATTLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(battle|siege|crusade|skirmish)\b").unwrap());

pub fn is_battle_text(text: &str) -> bool {
    BATTLE_RE.is_match(text)
}

pub struct ScoreInput<'a> {
    pub title: &'a str,
    pub summary: &'a str,
    pub year: &'a str,
    pub category: Category,
    pub is_regional: bool,
    pub candidate_rank: Option<u32>,
}

/// Relevance score for one item, 0-100. Base 45; adjustments are
/// order-independent and summed before clamping.
pub fn score_item(profile: &RegionProfile, input: &ScoreInput) -> u8 {
    let mut s: i64 = 45;
    let blob = format!("{} {}", input.title, input.summary);

    s += i64::from(profile.weighted_score(&blob));
    if is_global_signal(&blob) {
        s += 6;
    }
    if input.summary.len() > 180 {
        s += 6;
    }

    let year: i64 = input.year.trim().parse().unwrap_or(0);
    if year != 0 && year < 1900 {
        s += 3;
    }

    // Provider-endorsed ordering, decaying by rank.
    if let Some(rank) = input.candidate_rank {
        s += (10 - (i64::from(rank) - 1) / 3).max(0);
    }

    s += i64::from(newsworthy_boost(&blob));

    if input.category.is_biographical() {
        s -= 3;
    }
    if is_battle_text(&blob) && !input.is_regional {
        s -= 10;
    }

    s.clamp(0, 100) as u8
}

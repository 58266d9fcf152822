use std::collections::HashSet;

use almanac_common::{Category, CuratedItem, CurationPolicy};

use crate::score::is_battle_text;

pub(crate) fn is_battle_item(item: &CuratedItem) -> bool {
    is_battle_text(&item.title) || is_battle_text(&item.summary)
}

fn count_regional(selected: &[CuratedItem]) -> usize {
    selected.iter().filter(|i| i.is_regional).count()
}

fn sort_desc(items: &mut [CuratedItem]) {
    items.sort_by(|a, b| b.score.cmp(&a.score));
}

fn selected_ids(selected: &[CuratedItem]) -> HashSet<String> {
    selected.iter().map(CuratedItem::identity).collect()
}

/// Index of the lowest-scored selected item satisfying `pred`.
fn weakest_where<F: Fn(&CuratedItem) -> bool>(
    selected: &[CuratedItem],
    pred: F,
) -> Option<usize> {
    selected
        .iter()
        .enumerate()
        .filter(|(_, i)| pred(i))
        .min_by_key(|(_, i)| i.score)
        .map(|(idx, _)| idx)
}

/// Pick exactly `total` items (fewer only when the pool runs dry),
/// honoring the regional share band and the per-category caps, always
/// preferring higher scores among eligible items. Pure function over
/// the pool; membership is keyed on `(title, year)` identity, never on
/// references.
pub fn select_top(pool: &[CuratedItem], total: usize, policy: &CurationPolicy) -> Vec<CuratedItem> {
    let band_low = (total as f64 * policy.band_low_ratio).round() as usize;
    let band_high = (total as f64 * policy.band_high_ratio).round() as usize;
    let target = ((total as f64 * policy.target_ratio).round() as usize)
        .clamp(band_low, band_high);

    let mut regional: Vec<&CuratedItem> = pool.iter().filter(|i| i.is_regional).collect();
    regional.sort_by(|a, b| b.score.cmp(&a.score));
    let mut others: Vec<&CuratedItem> = pool.iter().filter(|i| !i.is_regional).collect();
    others.sort_by(|a, b| b.score.cmp(&a.score));

    let mut selected: Vec<CuratedItem> = regional
        .iter()
        .take(target)
        .map(|i| (*i).clone())
        .collect();
    let fill = total.saturating_sub(selected.len());
    selected.extend(others.iter().take(fill).map(|i| (*i).clone()));

    // Below the band: swap in the next-best unused regional items,
    // displacing the weakest non-regional picks.
    let ids = selected_ids(&selected);
    for item in regional.iter().filter(|i| !ids.contains(&i.identity())) {
        if count_regional(&selected) >= band_low {
            break;
        }
        if selected.len() >= total {
            match weakest_where(&selected, |i| !i.is_regional) {
                Some(idx) => {
                    selected.remove(idx);
                }
                None => break,
            }
        }
        selected.push((*item).clone());
        sort_desc(&mut selected);
        selected.truncate(total);
    }

    // Above the band: trade the weakest regional picks for the
    // next-best unused non-regional items.
    let ids = selected_ids(&selected);
    let mut spare_others = others.iter().filter(|i| !ids.contains(&i.identity()));
    while count_regional(&selected) > band_high {
        let Some(replacement) = spare_others.next() else {
            break;
        };
        match weakest_where(&selected, |i| i.is_regional) {
            Some(idx) => {
                selected.remove(idx);
            }
            None => break,
        }
        selected.push((*replacement).clone());
        sort_desc(&mut selected);
    }

    // Sparse day: backfill with anything left, best first.
    if selected.len() < total {
        let mut rest: Vec<&CuratedItem> = pool.iter().collect();
        rest.sort_by(|a, b| b.score.cmp(&a.score));
        let ids = selected_ids(&selected);
        for item in rest {
            if selected.len() >= total {
                break;
            }
            if !ids.contains(&item.identity()) {
                selected.push(item.clone());
            }
        }
    }

    enforce_cap(
        &mut selected,
        pool,
        total,
        policy.birth_death_max,
        |i| i.category.is_biographical(),
    );
    enforce_cap(&mut selected, pool, total, policy.battle_max, is_battle_item);

    sort_desc(&mut selected);
    selected.truncate(total);
    selected
}

/// Remove the lowest-scored items over a cap and backfill with
/// non-battle event-category pool items by score.
fn enforce_cap<F: Fn(&CuratedItem) -> bool>(
    selected: &mut Vec<CuratedItem>,
    pool: &[CuratedItem],
    total: usize,
    cap: usize,
    is_member: F,
) {
    while selected.iter().filter(|i| is_member(i)).count() > cap {
        match weakest_where(selected, &is_member) {
            Some(idx) => {
                selected.remove(idx);
            }
            None => break,
        }
    }

    let mut backfill: Vec<&CuratedItem> = pool
        .iter()
        .filter(|i| i.category == Category::Event && !is_battle_item(i))
        .collect();
    backfill.sort_by(|a, b| b.score.cmp(&a.score));

    let ids = selected_ids(selected);
    for item in backfill {
        if selected.len() >= total {
            break;
        }
        if !ids.contains(&item.identity()) {
            selected.push(item.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{curated, curated_in};

    fn policy() -> CurationPolicy {
        CurationPolicy::default()
    }

    /// A pool with plenty of both partitions: regional scores start
    /// high, other scores interleave below.
    fn big_pool() -> Vec<CuratedItem> {
        let mut pool = Vec::new();
        for i in 0..30 {
            pool.push(curated(
                &format!("Event: Regional {i}"),
                &format!("19{i:02}"),
                90 - i as u8,
                true,
                None,
            ));
        }
        for i in 0..30 {
            pool.push(curated(
                &format!("Event: Global {i}"),
                &format!("18{i:02}"),
                85 - i as u8,
                false,
                None,
            ));
        }
        pool
    }

    #[test]
    fn returns_exactly_n_when_pool_suffices() {
        let out = select_top(&big_pool(), 25, &policy());
        assert_eq!(out.len(), 25);
    }

    #[test]
    fn regional_share_lands_in_band() {
        let out = select_top(&big_pool(), 20, &policy());
        let regional = out.iter().filter(|i| i.is_regional).count();
        assert!(regional >= 14, "regional count {regional} below band");
        assert!(regional <= 17, "regional count {regional} above band");
    }

    #[test]
    fn sparse_regional_pool_backfills_to_n() {
        let mut pool: Vec<CuratedItem> = (0..3)
            .map(|i| curated(&format!("Event: Regional {i}"), "1900", 80, true, None))
            .collect();
        pool.extend(
            (0..20).map(|i| curated(&format!("Event: Global {i}"), "1901", 70, false, None)),
        );
        let out = select_top(&pool, 10, &policy());
        assert_eq!(out.len(), 10);
        assert_eq!(out.iter().filter(|i| i.is_regional).count(), 3);
    }

    #[test]
    fn exhausted_pool_underfills_gracefully() {
        let pool = vec![
            curated("Event: Only One", "1900", 80, true, None),
            curated("Event: Only Two", "1901", 70, false, None),
        ];
        let out = select_top(&pool, 10, &policy());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn output_is_sorted_by_score() {
        let out = select_top(&big_pool(), 25, &policy());
        for pair in out.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn biographical_cap_is_enforced_with_backfill() {
        let mut pool: Vec<CuratedItem> = (0..10)
            .map(|i| {
                curated_in(
                    Category::Birth,
                    &format!("Birthday of Person {i}"),
                    &format!("19{i:02}"),
                    90,
                    true,
                )
            })
            .collect();
        pool.extend((0..10).map(|i| {
            curated(&format!("Event: Filler {i}"), &format!("18{i:02}"), 60, true, None)
        }));

        let out = select_top(&pool, 12, &policy());
        let bio = out.iter().filter(|i| i.category.is_biographical()).count();
        assert_eq!(bio, 6);
        assert_eq!(out.len(), 12);
    }

    #[test]
    fn battle_cap_replaces_weakest_battles_with_events() {
        // Three strong battles fill the cap; Battle of X (50) and
        // Battle of Y (40) must both be displaced by non-battle
        // event-category backfill.
        let mut pool = vec![
            curated("Event: Battle of Alpha", "1600", 80, false, None),
            curated("Event: Battle of Beta", "1601", 79, false, None),
            curated("Event: Battle of Gamma", "1602", 78, false, None),
            curated("Event: Battle of X", "1603", 50, false, None),
            curated("Event: Battle of Y", "1604", 40, false, None),
        ];
        pool.extend((0..10).map(|i| {
            curated(
                &format!("Event: Regional {i}"),
                &format!("19{i:02}"),
                70 - i as u8,
                true,
                None,
            )
        }));
        pool.extend((0..4).map(|i| {
            curated(&format!("Event: Spare {i}"), &format!("18{i:02}"), 45, false, None)
        }));

        let out = select_top(&pool, 12, &policy());
        assert_eq!(out.len(), 12);

        let battles: Vec<&CuratedItem> = out.iter().filter(|i| is_battle_item(i)).collect();
        assert_eq!(battles.len(), 3);
        assert!(battles.iter().all(|b| b.score >= 78));
        assert!(!out.iter().any(|i| i.title.contains("Battle of X")));
        assert!(!out.iter().any(|i| i.title.contains("Battle of Y")));
    }

    #[test]
    fn selection_is_deterministic() {
        let pool = big_pool();
        let a = select_top(&pool, 25, &policy());
        let b = select_top(&pool, 25, &policy());
        let ids_a: Vec<String> = a.iter().map(|i| i.identity()).collect();
        let ids_b: Vec<String> = b.iter().map(|i| i.identity()).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn scores_stay_in_range() {
        for item in select_top(&big_pool(), 30, &policy()) {
            assert!(item.score <= 100);
        }
    }
}

use super::scoring::ScoredEntry;
use crate::catalog::tags;
use rand::seq::SliceRandom;
use rand::Rng;

/// Large frames kept by the heavy-user split before the basic pick.
pub const HEAVY_USER_LARGE_PICKS: usize = 2;

/// Shuffle, then stable-sort by score, so equal scores come out in random order.
pub(crate) fn rank<R: Rng + ?Sized>(pool: &mut [ScoredEntry], rng: &mut R) {
    pool.shuffle(rng);
    pool.sort_by(|left, right| right.score.cmp(&left.score));
}

pub(crate) fn retain_within_limits(
    pool: &mut Vec<ScoredEntry>,
    weight_cap_kg: Option<f64>,
    seat_width_max_cm: Option<u32>,
) {
    if let Some(cap) = weight_cap_kg {
        pool.retain(|scored| scored.entry.weight_max() <= cap);
    }
    if let Some(max_width) = seat_width_max_cm {
        pool.retain(|scored| scored.entry.seat_width_min <= max_width);
    }
}

pub(crate) fn top_ranked<R: Rng + ?Sized>(
    mut pool: Vec<ScoredEntry>,
    limit: usize,
    rng: &mut R,
) -> Vec<ScoredEntry> {
    rank(&mut pool, rng);
    pool.truncate(limit);
    pool
}

/// Two best-ranked large frames followed by one basic model drawn from the rest.
pub(crate) fn heavy_user_split<R: Rng + ?Sized>(
    mut pool: Vec<ScoredEntry>,
    rng: &mut R,
) -> Vec<ScoredEntry> {
    rank(&mut pool, rng);

    let large: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(_, scored)| scored.entry.is_large_frame())
        .map(|(index, _)| index)
        .take(HEAVY_USER_LARGE_PICKS)
        .collect();
    let basic_candidates: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(index, scored)| !large.contains(index) && scored.entry.has_keyword(tags::BASIC))
        .map(|(index, _)| index)
        .collect();
    let basic = basic_candidates.choose(rng).copied();

    let mut slots: Vec<Option<ScoredEntry>> = pool.into_iter().map(Some).collect();
    large
        .into_iter()
        .chain(basic)
        .filter_map(|index| slots[index].take())
        .collect()
}

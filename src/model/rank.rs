use serde::Serialize;

/// A bonus tier reached once a guide's score meets `min_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankTier {
    pub name: &'static str,
    pub min_score: f64,
    /// Extra commission share on top of the base rate, as a fraction
    pub bonus_rate: f64,
}

/// Ordered by ascending `min_score`.
pub static RANK_TIERS: [RankTier; 4] = [
    RankTier {
        name: "Bronze",
        min_score: 0.0,
        bonus_rate: 0.0,
    },
    RankTier {
        name: "Silver",
        min_score: 50.0,
        bonus_rate: 0.05,
    },
    RankTier {
        name: "Gold",
        min_score: 150.0,
        bonus_rate: 0.10,
    },
    RankTier {
        name: "Platinum",
        min_score: 300.0,
        bonus_rate: 0.15,
    },
];

/// Highest tier whose threshold the score meets. Scores below every
/// threshold (and NaN) get the lowest tier.
pub fn rank_from_score(score: f64) -> &'static RankTier {
    RANK_TIERS
        .iter()
        .rev()
        .find(|tier| tier.min_score <= score)
        .unwrap_or(&RANK_TIERS[0])
}

pub fn next_tier(tier: &RankTier) -> Option<&'static RankTier> {
    RANK_TIERS
        .iter()
        .find(|candidate| candidate.min_score > tier.min_score)
}

/// Points still missing to reach the next tier; `None` at the top.
pub fn points_to_next(score: f64) -> Option<f64> {
    let current = rank_from_score(score);
    let score = if score.is_nan() { 0.0 } else { score };
    next_tier(current).map(|next| (next.min_score - score).max(0.0))
}

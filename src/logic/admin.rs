use std::collections::HashMap;

use crate::logic::guide_dashboard::referral_points;
use crate::logic::referrals::{status_counts, total_commission};
use crate::model::{
    now_timestamp, rank_from_score, AdminOverview, Guide, GuideCounts, GuideStatus, RankCount,
    Referral, RANK_TIERS,
};

pub use crate::model::rank_from_score as rank_for_score;

pub fn guide_counts(guides: &[Guide]) -> GuideCounts {
    guides.iter().fold(
        GuideCounts {
            total: guides.len(),
            ..Default::default()
        },
        |mut counts, guide| {
            match guide.status {
                GuideStatus::Approved => counts.approved += 1,
                GuideStatus::Pending => counts.pending += 1,
                GuideStatus::Rejected => counts.rejected += 1,
                GuideStatus::Other(_) => {}
            }
            counts
        },
    )
}

/// Guides per rank in tier order. Every tier appears; guides without
/// referrals (or without an id) count as the lowest tier.
pub fn rank_distribution(guides: &[Guide], referrals: &[Referral]) -> Vec<RankCount> {
    let mut scores: HashMap<&str, f64> = HashMap::new();
    for referral in referrals.iter().filter(|r| !r.guide_id.is_empty()) {
        *scores.entry(referral.guide_id.as_str()).or_default() +=
            referral_points(&referral.commission_status);
    }

    let mut distribution: Vec<RankCount> = RANK_TIERS
        .iter()
        .map(|tier| RankCount {
            name: tier.name,
            count: 0,
        })
        .collect();
    for guide in guides {
        let score = scores.get(guide.id.as_str()).copied().unwrap_or(0.0);
        let rank = rank_from_score(score).name;
        if let Some(slot) = distribution.iter_mut().find(|slot| slot.name == rank) {
            slot.count += 1;
        }
    }
    distribution
}

pub fn admin_overview(guides: &[Guide], referrals: &[Referral]) -> AdminOverview {
    AdminOverview {
        guides: guide_counts(guides),
        referral_count: referrals.len(),
        referrals_by_status: status_counts(referrals),
        total_commission: total_commission(referrals),
        rank_distribution: rank_distribution(guides, referrals),
        generated_at: now_timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn guide(id: &str, status: &str) -> Guide {
        serde_json::from_value(json!({"id": id, "status": status})).unwrap()
    }

    fn paid(id: usize, guide: &str) -> Referral {
        serde_json::from_value(json!({
            "id": format!("r{}", id),
            "guideId": guide,
            "sponsorStoreId": "A",
            "commissionStatus": "paid",
            "commissionAmount": "100"
        }))
        .unwrap()
    }

    #[test]
    fn test_guide_counts() {
        let guides = vec![
            guide("g1", "approved"),
            guide("g2", "approved"),
            guide("g3", "pending"),
            guide("g4", "rejected"),
            guide("g5", "suspended"),
        ];
        let counts = guide_counts(&guides);
        assert_eq!(counts.total, 5);
        assert_eq!(counts.approved, 2);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.rejected, 1);
    }

    #[test]
    fn test_overview() {
        let guides = vec![guide("g1", "approved"), guide("g2", "approved"), guide("g3", "pending")];
        // g1 reaches Silver with five paid referrals
        let referrals: Vec<Referral> = (0..5).map(|i| paid(i, "g1")).collect();

        let overview = admin_overview(&guides, &referrals);
        assert_eq!(overview.guides.approved, 2);
        assert_eq!(overview.referral_count, 5);
        assert_eq!(overview.referrals_by_status.paid, 5);
        assert_eq!(overview.total_commission, "500.00");
        let counts: Vec<(&str, usize)> = overview
            .rank_distribution
            .iter()
            .map(|rank| (rank.name, rank.count))
            .collect();
        assert_eq!(
            counts,
            vec![("Bronze", 2), ("Silver", 1), ("Gold", 0), ("Platinum", 0)]
        );
    }

    #[test]
    fn test_overview_keys_are_snake_case() {
        let overview = admin_overview(&[guide("g1", "approved")], &[paid(1, "g1")]);
        let body = serde_json::to_value(&overview).unwrap();
        assert_eq!(body["referral_count"], 1);
        assert_eq!(body["referrals_by_status"]["paid"], 1);
        assert_eq!(body["rank_distribution"][0], json!({"name": "Bronze", "count": 1}));
        assert!(body.get("referrals").is_none());
    }

    #[test]
    fn test_rank_for_score_is_the_table_lookup() {
        assert_eq!(rank_for_score(151.0).name, "Gold");
    }
}

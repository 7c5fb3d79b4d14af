use std::collections::HashSet;

use crate::logic::referrals::{status_counts, total_commission};
use crate::model::{
    next_tier, points_to_next, rank_from_score, CommissionStatus, Guide, GuideDashboard,
    Referral,
};

/// Points a referral contributes to the guide's rank score
pub fn referral_points(status: &CommissionStatus) -> f64 {
    match status {
        CommissionStatus::Paid => 10.0,
        CommissionStatus::Approved => 5.0,
        CommissionStatus::Pending => 1.0,
        CommissionStatus::Cancelled | CommissionStatus::Other(_) => 0.0,
    }
}

pub fn guide_score<'a>(referrals: impl IntoIterator<Item = &'a Referral>) -> f64 {
    referrals
        .into_iter()
        .map(|r| referral_points(&r.commission_status))
        .sum()
}

pub fn guide_dashboard(guide: &Guide, referrals: &[Referral]) -> GuideDashboard {
    let mine: Vec<&Referral> = referrals.iter().filter(|r| r.guide_id == guide.id).collect();
    let score = guide_score(mine.iter().copied());
    let rank = rank_from_score(score);

    let stores_referred = mine
        .iter()
        .map(|r| r.sponsor_store_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    GuideDashboard {
        guide_id: guide.id.clone(),
        name: guide.guide_name.clone(),
        status: guide.status.clone(),
        referral_count: mine.len(),
        stores_referred,
        referrals_by_status: status_counts(mine.iter().copied()),
        earned_commission: total_commission(
            mine.iter()
                .copied()
                .filter(|r| r.commission_status == CommissionStatus::Paid),
        ),
        pending_commission: total_commission(mine.iter().copied().filter(|r| {
            matches!(
                r.commission_status,
                CommissionStatus::Pending | CommissionStatus::Approved
            )
        })),
        score,
        rank: *rank,
        next_rank: next_tier(rank).copied(),
        points_to_next_rank: points_to_next(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn referral(guide: &str, store: &str, status: &str, amount: &str) -> Referral {
        serde_json::from_value(json!({
            "id": format!("{}-{}-{}", guide, store, status),
            "guideId": guide,
            "sponsorStoreId": store,
            "commissionStatus": status,
            "commissionAmount": amount,
        }))
        .unwrap()
    }

    fn guide() -> Guide {
        serde_json::from_value(json!({"id": "g1", "guideName": "高橋 健一", "status": "approved"}))
            .unwrap()
    }

    #[test]
    fn test_new_guide_is_bronze() {
        let dashboard = guide_dashboard(&guide(), &[]);
        assert_eq!(dashboard.score, 0.0);
        assert_eq!(dashboard.rank.name, "Bronze");
        assert_eq!(dashboard.next_rank.map(|t| t.name), Some("Silver"));
        assert_eq!(dashboard.points_to_next_rank, Some(50.0));
        assert_eq!(dashboard.earned_commission, "0.00");
    }

    #[test]
    fn test_score_and_commissions() {
        let mut referrals = vec![
            referral("g1", "A", "pending", "10"),
            referral("g1", "A", "approved", "20"),
            referral("g1", "B", "cancelled", "99"),
            referral("g2", "A", "paid", "500"),
        ];
        for i in 0..5 {
            let mut r = referral("g1", "C", "paid", "100");
            r.id = format!("paid-{}", i);
            referrals.push(r);
        }

        let dashboard = guide_dashboard(&guide(), &referrals);
        // 5 paid * 10 + 1 approved * 5 + 1 pending * 1
        assert_eq!(dashboard.score, 56.0);
        assert_eq!(dashboard.rank.name, "Silver");
        assert_eq!(dashboard.referral_count, 8);
        assert_eq!(dashboard.stores_referred, 3);
        assert_eq!(dashboard.earned_commission, "500.00");
        assert_eq!(dashboard.pending_commission, "30.00");
        assert_eq!(dashboard.points_to_next_rank, Some(94.0));
    }

    #[test]
    fn test_unknown_status_scores_nothing() {
        assert_eq!(referral_points(&CommissionStatus::Other("disputed".into())), 0.0);
    }
}

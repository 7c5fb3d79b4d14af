use std::collections::HashSet;

use crate::logic::referrals::{count_status, most_recent, total_commission};
use crate::model::{CommissionStatus, Referral, StoreDashboard};

const RECENT_REFERRALS: usize = 5;

/// Rounded percentage of `part` in `whole`; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

/// What a sponsor store sees: how many customers guides sent and how many
/// of them turned into bookings.
pub fn store_dashboard(store_id: &str, referrals: &[Referral]) -> StoreDashboard {
    let sent: Vec<&Referral> = referrals
        .iter()
        .filter(|r| r.sponsor_store_id == store_id)
        .collect();
    let bookings = sent
        .iter()
        .filter(|r| r.commission_status.is_booked())
        .count();
    let unique_guides = sent
        .iter()
        .map(|r| r.guide_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    StoreDashboard {
        store_id: store_id.to_string(),
        sent_customers: sent.len(),
        bookings,
        visit_rate: percentage(bookings, sent.len()),
        unique_guides,
        pending: count_status(sent.iter().copied(), &CommissionStatus::Pending),
        cancelled: count_status(sent.iter().copied(), &CommissionStatus::Cancelled),
        total_commission: total_commission(sent.iter().copied()),
        recent_referrals: most_recent(&sent, RECENT_REFERRALS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn referral(store: &str, guide: &str, status: &str) -> Referral {
        serde_json::from_value(json!({
            "id": format!("{}-{}-{}", store, guide, status),
            "storeId": store,
            "guideId": guide,
            "commissionStatus": status,
        }))
        .unwrap()
    }

    #[test]
    fn test_two_paid_referrals() {
        let referrals = vec![referral("A", "g1", "paid"), referral("A", "g1", "paid")];
        let dashboard = store_dashboard("A", &referrals);
        assert_eq!(dashboard.sent_customers, 2);
        assert_eq!(dashboard.bookings, 2);
        assert_eq!(dashboard.visit_rate, 100);
        assert_eq!(dashboard.unique_guides, 1);
    }

    #[test]
    fn test_no_customers_means_zero_rate() {
        let referrals = vec![referral("B", "g1", "paid")];
        let dashboard = store_dashboard("A", &referrals);
        assert_eq!(dashboard.sent_customers, 0);
        assert_eq!(dashboard.bookings, 0);
        assert_eq!(dashboard.visit_rate, 0);
        assert_eq!(dashboard.total_commission, "0.00");
        assert!(dashboard.recent_referrals.is_empty());
    }

    #[test]
    fn test_visit_rate_is_rounded() {
        let referrals = vec![
            referral("A", "g1", "approved"),
            referral("A", "g2", "pending"),
            referral("A", "g3", "cancelled"),
        ];
        let dashboard = store_dashboard("A", &referrals);
        assert_eq!(dashboard.bookings, 1);
        // 33.33 rounds down
        assert_eq!(dashboard.visit_rate, 33);
        assert_eq!(dashboard.pending, 1);
        assert_eq!(dashboard.cancelled, 1);
        assert_eq!(dashboard.unique_guides, 3);

        let referrals = vec![
            referral("A", "g1", "approved"),
            referral("A", "g1", "paid"),
            referral("A", "g2", "pending"),
        ];
        // 66.67 rounds up
        assert_eq!(store_dashboard("A", &referrals).visit_rate, 67);
    }

    #[test]
    fn test_visit_rate_matches_formula() {
        for sent in 1..=40usize {
            for booked in 0..=sent {
                let expected = (booked as f64 / sent as f64 * 100.0).round() as u32;
                assert_eq!(percentage(booked, sent), expected);
            }
        }
        assert_eq!(percentage(0, 0), 0);
    }
}

use itertools::Itertools;
use serde_json::Value;

use crate::model::{
    now_timestamp, CommissionDashboard, CommissionStatus, CommissionTotals, ReferralStats,
    Referral, StatusCounts,
};
use crate::store::StoreError;

const RECENT_REFERRALS: usize = 10;

/// Keys a referral update can never overwrite
const PROTECTED_REFERRAL_FIELDS: [&str; 2] = ["id", "createdAt"];

/// Older clients send the store under its legacy key
const LEGACY_STORE_FIELD: &str = "storeId";

pub fn count_status<'a>(
    referrals: impl IntoIterator<Item = &'a Referral>,
    status: &CommissionStatus,
) -> usize {
    referrals
        .into_iter()
        .filter(|r| &r.commission_status == status)
        .count()
}

pub fn status_counts<'a>(referrals: impl IntoIterator<Item = &'a Referral> + Clone) -> StatusCounts {
    StatusCounts {
        pending: count_status(referrals.clone(), &CommissionStatus::Pending),
        approved: count_status(referrals.clone(), &CommissionStatus::Approved),
        paid: count_status(referrals.clone(), &CommissionStatus::Paid),
        cancelled: count_status(referrals, &CommissionStatus::Cancelled),
    }
}

pub fn commission_sum<'a>(referrals: impl IntoIterator<Item = &'a Referral>) -> f64 {
    referrals
        .into_iter()
        .filter_map(Referral::commission_amount_value)
        .sum()
}

/// Sum of commission amounts, formatted with two decimals.
pub fn total_commission<'a>(referrals: impl IntoIterator<Item = &'a Referral>) -> String {
    format!("{:.2}", commission_sum(referrals))
}

pub fn referral_stats(referrals: &[Referral]) -> ReferralStats {
    ReferralStats {
        total_referrals: referrals.len(),
        pending_commissions: count_status(referrals, &CommissionStatus::Pending),
        approved_commissions: count_status(referrals, &CommissionStatus::Approved),
        paid_commissions: count_status(referrals, &CommissionStatus::Paid),
        total_commission_amount: commission_sum(referrals),
    }
}

/// Newest first by referral date; undated referrals go last.
pub fn most_recent(referrals: &[&Referral], limit: usize) -> Vec<Referral> {
    referrals
        .iter()
        .sorted_by(|a, b| b.referral_time().cmp(&a.referral_time()))
        .take(limit)
        .map(|r| (*r).clone())
        .collect()
}

pub fn commission_dashboard(guide_id: &str, referrals: &[Referral]) -> CommissionDashboard {
    let mine: Vec<&Referral> = referrals.iter().filter(|r| r.guide_id == guide_id).collect();
    let with_status = |status: CommissionStatus| {
        total_commission(mine.iter().copied().filter(move |r| r.commission_status == status))
    };

    CommissionDashboard {
        guide_id: guide_id.to_string(),
        total_referrals: mine.len(),
        referrals_by_status: status_counts(mine.iter().copied()),
        commissions: CommissionTotals {
            pending: with_status(CommissionStatus::Pending),
            approved: with_status(CommissionStatus::Approved),
            paid: with_status(CommissionStatus::Paid),
            total: total_commission(mine.iter().copied()),
        },
        recent_referrals: most_recent(&mine, RECENT_REFERRALS),
    }
}

/// Merge a JSON object of updates over a stored referral. A transition to
/// `paid` stamps `paymentDate` the first time only.
pub fn apply_update(existing: Referral, updates: &Value) -> Result<Referral, StoreError> {
    let Value::Object(updates) = updates else {
        return Err(StoreError::InvalidUpdate(
            "referral update must be a JSON object".to_string(),
        ));
    };

    let mut merged = serde_json::to_value(&existing).map_err(StoreError::Serialize)?;
    if let Value::Object(fields) = &mut merged {
        for (key, value) in updates {
            let key = match key.as_str() {
                LEGACY_STORE_FIELD => "sponsorStoreId",
                other => other,
            };
            if !PROTECTED_REFERRAL_FIELDS.contains(&key) {
                fields.insert(key.to_string(), value.clone());
            }
        }
    }

    let mut updated: Referral = serde_json::from_value(merged)
        .map_err(|e| StoreError::InvalidUpdate(e.to_string()))?;
    let now = now_timestamp();

    let marked_paid = updates.get("commissionStatus").and_then(Value::as_str) == Some("paid");
    if marked_paid && updated.payment_date.is_none() {
        updated.payment_date = Some(now.clone());
    }
    updated.updated_at = Some(now);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn referral(id: &str, guide: &str, store: &str, status: &str, amount: Value, date: &str) -> Referral {
        serde_json::from_value(json!({
            "id": id,
            "guideId": guide,
            "sponsorStoreId": store,
            "commissionStatus": status,
            "commissionAmount": amount,
            "referralDate": date,
        }))
        .unwrap()
    }

    fn fixture() -> Vec<Referral> {
        vec![
            referral("r1", "g1", "A", "pending", json!("100.00"), "2024-01-01T00:00:00Z"),
            referral("r2", "g1", "A", "approved", json!(250), "2024-01-03T00:00:00Z"),
            referral("r3", "g1", "B", "paid", json!("300.5"), "2024-01-02T00:00:00Z"),
            referral("r4", "g1", "B", "cancelled", Value::Null, "2024-01-04T00:00:00Z"),
            referral("r5", "g2", "A", "paid", json!("1000"), "2024-01-05T00:00:00Z"),
        ]
    }

    #[test]
    fn test_referral_stats() {
        let stats = referral_stats(&fixture());
        assert_eq!(stats.total_referrals, 5);
        assert_eq!(stats.pending_commissions, 1);
        assert_eq!(stats.approved_commissions, 1);
        assert_eq!(stats.paid_commissions, 2);
        assert!((stats.total_commission_amount - 1650.5).abs() < 1e-9);
    }

    #[test]
    fn test_total_commission_formatting() {
        assert_eq!(total_commission(&[]), "0.00");
        assert_eq!(total_commission(&fixture()), "1650.50");
    }

    #[test]
    fn test_commission_dashboard() {
        let dashboard = commission_dashboard("g1", &fixture());
        assert_eq!(dashboard.total_referrals, 4);
        assert_eq!(
            dashboard.referrals_by_status,
            StatusCounts { pending: 1, approved: 1, paid: 1, cancelled: 1 }
        );
        assert_eq!(dashboard.commissions.pending, "100.00");
        assert_eq!(dashboard.commissions.approved, "250.00");
        assert_eq!(dashboard.commissions.paid, "300.50");
        assert_eq!(dashboard.commissions.total, "650.50");

        let order: Vec<&str> = dashboard.recent_referrals.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["r4", "r2", "r3", "r1"]);
    }

    #[test]
    fn test_recent_is_capped() {
        let many: Vec<Referral> = (0..15)
            .map(|i| {
                referral(
                    &format!("r{}", i),
                    "g1",
                    "A",
                    "pending",
                    Value::Null,
                    &format!("2024-02-{:02}T00:00:00Z", i + 1),
                )
            })
            .collect();
        let dashboard = commission_dashboard("g1", &many);
        assert_eq!(dashboard.recent_referrals.len(), 10);
        assert_eq!(dashboard.recent_referrals[0].id, "r14");
    }

    #[test]
    fn test_apply_update_sets_payment_date_once() {
        let original = fixture().remove(1);
        let paid = apply_update(original, &json!({"commissionStatus": "paid", "commissionAmount": "250.00"}))
            .unwrap();
        assert_eq!(paid.commission_status, CommissionStatus::Paid);
        let first_payment = paid.payment_date.clone().expect("payment date set");
        assert!(paid.updated_at.is_some());

        let again = apply_update(paid, &json!({"commissionStatus": "paid", "notes": "re-sent"})).unwrap();
        assert_eq!(again.payment_date, Some(first_payment));
        assert_eq!(again.notes.as_deref(), Some("re-sent"));
    }

    #[test]
    fn test_apply_update_keeps_id_and_extras() {
        let original = fixture().remove(0);
        let updated = apply_update(original, &json!({"id": "hijack", "invoiceNo": "INV-9"})).unwrap();
        assert_eq!(updated.id, "r1");
        assert_eq!(updated.extra.get("invoiceNo"), Some(&json!("INV-9")));
        assert!(updated.payment_date.is_none());
    }

    #[test]
    fn test_apply_update_accepts_legacy_store_key() {
        let original = fixture().remove(0);
        let moved = apply_update(original, &json!({"storeId": "C"})).unwrap();
        assert_eq!(moved.sponsor_store_id, "C");
        assert!(moved.extra.get("storeId").is_none());

        let reread: Referral = serde_json::from_value(serde_json::to_value(&moved).unwrap()).unwrap();
        assert_eq!(reread.sponsor_store_id, "C");
    }

    #[test]
    fn test_apply_update_rejects_non_object() {
        let original = fixture().remove(0);
        assert!(matches!(
            apply_update(original, &json!(["paid"])),
            Err(StoreError::InvalidUpdate(_))
        ));
    }
}

use serde::Serialize;

use crate::model::{GuideStatus, Id, RankTier, Referral};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralStats {
    pub total_referrals: usize,
    pub pending_commissions: usize,
    pub approved_commissions: usize,
    pub paid_commissions: usize,
    pub total_commission_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub paid: usize,
    pub cancelled: usize,
}

/// Commission totals formatted with two decimals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommissionTotals {
    pub pending: String,
    pub approved: String,
    pub paid: String,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionDashboard {
    pub guide_id: Id,
    pub total_referrals: usize,
    pub referrals_by_status: StatusCounts,
    pub commissions: CommissionTotals,
    pub recent_referrals: Vec<Referral>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreDashboard {
    pub store_id: Id,
    pub sent_customers: usize,
    pub bookings: usize,
    /// Percentage of sent customers that booked, rounded to an integer
    pub visit_rate: u32,
    pub unique_guides: usize,
    pub pending: usize,
    pub cancelled: usize,
    pub total_commission: String,
    pub recent_referrals: Vec<Referral>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuideDashboard {
    pub guide_id: Id,
    pub name: Option<String>,
    pub status: GuideStatus,
    pub referral_count: usize,
    pub stores_referred: usize,
    pub referrals_by_status: StatusCounts,
    pub earned_commission: String,
    pub pending_commission: String,
    pub score: f64,
    pub rank: RankTier,
    pub next_rank: Option<RankTier>,
    pub points_to_next_rank: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GuideCounts {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
}

/// Guides holding one rank tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankCount {
    pub name: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminOverview {
    pub guides: GuideCounts,
    pub referral_count: usize,
    pub referrals_by_status: StatusCounts,
    pub total_commission: String,
    /// One entry per tier, lowest first
    pub rank_distribution: Vec<RankCount>,
    pub generated_at: String,
}

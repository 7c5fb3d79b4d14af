use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::api::admin_extractor::{AdminRole, AdminUser};
use crate::api::handlers::{bad_request, not_found, store_failure, ApiResult, AppState};
use crate::logic;
use crate::model::{
    next_tier, points_to_next, AdminOverview, GuideDashboard, Id, RankTier, StoreDashboard,
    RANK_TIERS,
};
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct DashboardResponse<T> {
    pub success: bool,
    pub dashboard: T,
}

#[derive(Debug, Serialize)]
pub struct RankTableResponse {
    pub success: bool,
    pub ranks: Vec<RankTier>,
}

#[derive(Debug, Deserialize)]
pub struct RankQuery {
    pub score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub success: bool,
    pub score: f64,
    pub rank: RankTier,
    pub next_rank: Option<RankTier>,
    pub points_to_next_rank: Option<f64>,
}

pub async fn guide_dashboard<S: Store>(
    State(store): State<AppState<S>>,
    Path(guide_id): Path<Id>,
) -> ApiResult<DashboardResponse<GuideDashboard>> {
    let guide = store
        .get_guide(&guide_id)
        .await
        .map_err(|e| store_failure(e, "DASHBOARD_ERROR", "ダッシュボードの取得中にエラーが発生しました"))?
        .ok_or_else(|| not_found("GUIDE_NOT_FOUND", "ガイドが見つかりません"))?;
    let referrals = store
        .list_referrals()
        .await
        .map_err(|e| store_failure(e, "DASHBOARD_ERROR", "ダッシュボードの取得中にエラーが発生しました"))?;

    Ok(Json(DashboardResponse {
        success: true,
        dashboard: logic::guide_dashboard(&guide, &referrals),
    }))
}

/// Unknown stores get an all-zero dashboard rather than a 404: a store
/// exists for the sponsor before any guide has sent a customer.
pub async fn store_dashboard<S: Store>(
    State(store): State<AppState<S>>,
    Path(store_id): Path<Id>,
) -> ApiResult<DashboardResponse<StoreDashboard>> {
    let referrals = store
        .list_referrals()
        .await
        .map_err(|e| store_failure(e, "DASHBOARD_ERROR", "ダッシュボードの取得中にエラーが発生しました"))?;

    Ok(Json(DashboardResponse {
        success: true,
        dashboard: logic::store_dashboard(&store_id, &referrals),
    }))
}

pub async fn admin_overview<S: Store>(
    State(store): State<AppState<S>>,
    admin: AdminUser,
) -> ApiResult<DashboardResponse<AdminOverview>> {
    admin.require(AdminRole::Support)?;
    let guides = store
        .list_guides()
        .await
        .map_err(|e| store_failure(e, "DASHBOARD_ERROR", "ダッシュボードの取得中にエラーが発生しました"))?;
    let referrals = store
        .list_referrals()
        .await
        .map_err(|e| store_failure(e, "DASHBOARD_ERROR", "ダッシュボードの取得中にエラーが発生しました"))?;

    Ok(Json(DashboardResponse {
        success: true,
        dashboard: logic::admin_overview(&guides, &referrals),
    }))
}

pub async fn rank_table() -> Json<RankTableResponse> {
    Json(RankTableResponse {
        success: true,
        ranks: RANK_TIERS.to_vec(),
    })
}

pub async fn rank_for_score(Query(query): Query<RankQuery>) -> ApiResult<RankResponse> {
    let score = query
        .score
        .filter(|s| !s.is_nan())
        .ok_or_else(|| bad_request("INVALID_SCORE", "score must be a number"))?;
    let rank = logic::rank_for_score(score);

    Ok(Json(RankResponse {
        success: true,
        score,
        rank: *rank,
        next_rank: next_tier(rank).copied(),
        points_to_next_rank: points_to_next(score),
    }))
}

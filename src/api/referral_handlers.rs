use axum::{
    extract::{Path, State},
    response::Json,
    Json as RequestJson,
};
use serde::Serialize;
use serde_json::Value;

use crate::api::handlers::{bad_request, not_found, store_failure, ApiResult, AppState};
use crate::logic;
use crate::model::{CommissionDashboard, Id, NewReferral, Referral, ReferralStats};
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct ReferralResponse {
    pub success: bool,
    pub message: String,
    pub referral: Referral,
}

#[derive(Debug, Serialize)]
pub struct ReferralListResponse {
    pub success: bool,
    pub referrals: Vec<Referral>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ReferralStatsResponse {
    pub success: bool,
    pub referrals: Vec<Referral>,
    pub stats: ReferralStats,
}

#[derive(Debug, Serialize)]
pub struct CommissionDashboardResponse {
    pub success: bool,
    pub dashboard: CommissionDashboard,
}

async fn load_referrals<S: Store>(store: &S) -> Result<Vec<Referral>, crate::api::handlers::ApiError> {
    store
        .list_referrals()
        .await
        .map_err(|e| store_failure(e, "FETCH_ERROR", "紹介データの取得中にエラーが発生しました"))
}

pub async fn create_referral<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(new_referral): RequestJson<NewReferral>,
) -> ApiResult<ReferralResponse> {
    let referral = Referral::create(new_referral).ok_or_else(|| {
        bad_request("MISSING_REQUIRED_FIELDS", "ガイドIDと協賛店IDは必須です")
    })?;

    store
        .insert_referral(referral.clone())
        .await
        .map_err(|e| store_failure(e, "REFERRAL_CREATE_ERROR", "紹介の記録中にエラーが発生しました"))?;

    log::info!(
        "new referral created: guide {} -> store {}",
        referral.guide_id,
        referral.sponsor_store_id
    );

    Ok(Json(ReferralResponse {
        success: true,
        message: "紹介が正常に記録されました".to_string(),
        referral,
    }))
}

pub async fn list_referrals<S: Store>(
    State(store): State<AppState<S>>,
) -> ApiResult<ReferralStatsResponse> {
    let referrals = load_referrals(&*store).await?;
    let stats = logic::referral_stats(&referrals);

    Ok(Json(ReferralStatsResponse {
        success: true,
        referrals,
        stats,
    }))
}

pub async fn referrals_by_guide<S: Store>(
    State(store): State<AppState<S>>,
    Path(guide_id): Path<Id>,
) -> ApiResult<ReferralListResponse> {
    let referrals: Vec<Referral> = load_referrals(&*store)
        .await?
        .into_iter()
        .filter(|r| r.guide_id == guide_id)
        .collect();

    Ok(Json(ReferralListResponse {
        success: true,
        total: referrals.len(),
        referrals,
    }))
}

pub async fn referrals_by_store<S: Store>(
    State(store): State<AppState<S>>,
    Path(store_id): Path<Id>,
) -> ApiResult<ReferralListResponse> {
    let referrals: Vec<Referral> = load_referrals(&*store)
        .await?
        .into_iter()
        .filter(|r| r.sponsor_store_id == store_id)
        .collect();

    Ok(Json(ReferralListResponse {
        success: true,
        total: referrals.len(),
        referrals,
    }))
}

pub async fn update_referral<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(updates): RequestJson<Value>,
) -> ApiResult<ReferralResponse> {
    let referral = store
        .update_referral(&id, move |existing| logic::apply_update(existing, &updates))
        .await
        .map_err(|e| store_failure(e, "REFERRAL_UPDATE_ERROR", "紹介情報の更新中にエラーが発生しました"))?
        .ok_or_else(|| not_found("REFERRAL_NOT_FOUND", "紹介記録が見つかりません"))?;

    log::info!(
        "referral updated: {} (status {})",
        id,
        referral.commission_status.as_str()
    );

    Ok(Json(ReferralResponse {
        success: true,
        message: "紹介情報が更新されました".to_string(),
        referral,
    }))
}

pub async fn commission_dashboard<S: Store>(
    State(store): State<AppState<S>>,
    Path(guide_id): Path<Id>,
) -> ApiResult<CommissionDashboardResponse> {
    let referrals = load_referrals(&*store).await?;

    Ok(Json(CommissionDashboardResponse {
        success: true,
        dashboard: logic::commission_dashboard(&guide_id, &referrals),
    }))
}

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::admin_extractor::{AdminRole, AdminUser};
use crate::api::handlers::{
    bad_request, not_found, store_failure, ApiResult, AppState,
};
use crate::logic::{self, RegistrationError};
use crate::model::{AdminGuideSummary, Guide, GuideAck, Id, Language, PublicGuide};
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct GuideListQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GuideListResponse<T> {
    pub success: bool,
    pub guides: Vec<T>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct GuideResponse {
    pub success: bool,
    pub guide: Guide,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideAckResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide_id: Option<Id>,
    pub guide: GuideAck,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

fn guide_not_found() -> crate::api::handlers::ApiError {
    not_found("GUIDE_NOT_FOUND", "ガイドが見つかりません")
}

/// Public guide list: approved guides of the requested page language
pub async fn list_guides<S: Store>(
    State(store): State<AppState<S>>,
    Query(query): Query<GuideListQuery>,
) -> ApiResult<GuideListResponse<PublicGuide>> {
    let lang = Language::from_query(query.lang.as_deref());
    let guides = store
        .list_guides()
        .await
        .map_err(|e| store_failure(e, "FETCH_ERROR", "ガイド情報の取得中にエラーが発生しました"))?;

    let listing = logic::public_listing(&guides, lang);
    log::info!("returning {} guides for language {}", listing.len(), lang.as_str());

    Ok(Json(GuideListResponse {
        success: true,
        total: listing.len(),
        guides: listing,
    }))
}

pub async fn get_guide<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<GuideResponse> {
    match store.get_guide(&id).await {
        Ok(Some(guide)) => Ok(Json(GuideResponse {
            success: true,
            guide,
        })),
        Ok(None) => Err(guide_not_found()),
        Err(e) => Err(store_failure(e, "FETCH_ERROR", "ガイド情報の取得中にエラーが発生しました")),
    }
}

pub async fn register_guide<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(form): RequestJson<Map<String, Value>>,
) -> ApiResult<GuideAckResponse> {
    let guide = logic::register(form).map_err(|e| match e {
        RegistrationError::MissingField(field) => bad_request(
            "MISSING_REQUIRED_FIELD",
            &format!("必須フィールドが不足しています: {}", field),
        ),
        RegistrationError::MissingPhoneNumber => {
            bad_request("MISSING_PHONE_NUMBER", "電話番号が必要です")
        }
        RegistrationError::Invalid(detail) => bad_request("INVALID_REGISTRATION", &detail),
    })?;

    store
        .insert_guide(guide.clone())
        .await
        .map_err(|e| store_failure(e, "REGISTRATION_ERROR", "ガイド登録中にエラーが発生しました"))?;

    log::info!("new guide registered: {} ({})", guide.display_name(), guide.id);

    Ok(Json(GuideAckResponse {
        success: true,
        message: "ガイド登録が完了しました。審査後にメールでご連絡いたします。".to_string(),
        guide_id: Some(guide.id.clone()),
        guide: guide.ack(),
    }))
}

pub async fn update_guide<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(updates): RequestJson<Value>,
) -> ApiResult<GuideAckResponse> {
    let updated = store
        .update_guide(&id, move |existing| logic::apply_edit(existing, &updates))
        .await
        .map_err(|e| store_failure(e, "UPDATE_ERROR", "ガイド情報の更新中にエラーが発生しました"))?
        .ok_or_else(guide_not_found)?;

    log::info!("guide updated: {} ({})", updated.display_name(), id);

    Ok(Json(GuideAckResponse {
        success: true,
        message: "ガイド情報が正常に更新されました".to_string(),
        guide_id: None,
        guide: updated.ack(),
    }))
}

pub async fn list_guides_admin<S: Store>(
    State(store): State<AppState<S>>,
    admin: AdminUser,
) -> ApiResult<GuideListResponse<AdminGuideSummary>> {
    admin.require(AdminRole::Support)?;
    let guides = store
        .list_guides()
        .await
        .map_err(|e| store_failure(e, "FETCH_ERROR", "ガイド情報の取得中にエラーが発生しました"))?;

    let summaries: Vec<AdminGuideSummary> = guides.iter().map(Guide::admin_view).collect();
    Ok(Json(GuideListResponse {
        success: true,
        total: summaries.len(),
        guides: summaries,
    }))
}

pub async fn approve_guide<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    admin: AdminUser,
) -> ApiResult<GuideAckResponse> {
    admin.require(AdminRole::Operator)?;
    let operator = admin.username.clone();
    let guide = store
        .update_guide(&id, move |guide| Ok(logic::approve(guide, &operator)))
        .await
        .map_err(|e| store_failure(e, "APPROVAL_ERROR", "ガイド承認中にエラーが発生しました"))?
        .ok_or_else(guide_not_found)?;

    log::info!("guide approved: {} ({}) by {}", guide.display_name(), id, admin.username);

    Ok(Json(GuideAckResponse {
        success: true,
        message: "ガイドを承認しました".to_string(),
        guide_id: None,
        guide: guide.ack(),
    }))
}

pub async fn reject_guide<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    admin: AdminUser,
    body: Option<RequestJson<RejectRequest>>,
) -> ApiResult<GuideAckResponse> {
    admin.require(AdminRole::Operator)?;
    let reason = body.and_then(|RequestJson(request)| request.reason);
    let operator = admin.username.clone();
    let guide = store
        .update_guide(&id, move |guide| {
            Ok(logic::reject(guide, &operator, reason.as_deref()))
        })
        .await
        .map_err(|e| store_failure(e, "REJECTION_ERROR", "ガイド拒否中にエラーが発生しました"))?
        .ok_or_else(guide_not_found)?;

    log::info!("guide rejected: {} ({}) by {}", guide.display_name(), id, admin.username);

    Ok(Json(GuideAckResponse {
        success: true,
        message: "ガイドを拒否しました".to_string(),
        guide_id: None,
        guide: guide.ack(),
    }))
}

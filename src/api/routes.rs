use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::api::{dashboard_handlers, guide_handlers, handlers, referral_handlers};
use crate::static_site::StaticSite;
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Guides
        .route("/api/guides", get(guide_handlers::list_guides::<S>))
        .route(
            "/api/guides/register",
            post(guide_handlers::register_guide::<S>),
        )
        .route("/api/guides/:id", get(guide_handlers::get_guide::<S>))
        .route(
            "/api/guides/:id/edit",
            put(guide_handlers::update_guide::<S>),
        )
        // Guide review (admin)
        .route(
            "/api/admin/guides",
            get(guide_handlers::list_guides_admin::<S>),
        )
        .route(
            "/api/admin/guides/:id/approve",
            put(guide_handlers::approve_guide::<S>),
        )
        .route(
            "/api/admin/guides/:id/reject",
            put(guide_handlers::reject_guide::<S>),
        )
        // Sponsor referrals
        .route(
            "/api/referrals",
            get(referral_handlers::list_referrals::<S>)
                .post(referral_handlers::create_referral::<S>),
        )
        .route(
            "/api/referrals/guide/:guide_id",
            get(referral_handlers::referrals_by_guide::<S>),
        )
        .route(
            "/api/referrals/store/:store_id",
            get(referral_handlers::referrals_by_store::<S>),
        )
        .route(
            "/api/referrals/dashboard/:guide_id",
            get(referral_handlers::commission_dashboard::<S>),
        )
        .route(
            "/api/referrals/:id",
            put(referral_handlers::update_referral::<S>),
        )
        // Dashboards
        .route(
            "/api/dashboard/guide/:guide_id",
            get(dashboard_handlers::guide_dashboard::<S>),
        )
        .route(
            "/api/dashboard/store/:store_id",
            get(dashboard_handlers::store_dashboard::<S>),
        )
        .route(
            "/api/admin/overview",
            get(dashboard_handlers::admin_overview::<S>),
        )
        .route("/api/admin/ranks", get(dashboard_handlers::rank_table))
        .route("/api/admin/rank", get(dashboard_handlers::rank_for_score))
}

/// API routes backed by `store`, with the static site answering everything else.
pub fn create_app<S: Store + 'static>(store: Arc<S>, site: &StaticSite) -> Router {
    create_router::<S>()
        .with_state(store)
        .fallback_service(site.router())
}

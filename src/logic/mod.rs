pub mod admin;
pub mod guide_dashboard;
pub mod guides;
pub mod referrals;
pub mod store_dashboard;

pub use admin::{admin_overview, rank_for_score};
pub use guide_dashboard::guide_dashboard;
pub use guides::{apply_edit, approve, public_listing, register, reject, RegistrationError};
pub use referrals::{apply_update, commission_dashboard, referral_stats, total_commission};
pub use store_dashboard::store_dashboard;

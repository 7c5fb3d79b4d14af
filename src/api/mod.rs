pub mod admin_extractor;
pub mod dashboard_handlers;
pub mod guide_handlers;
pub mod handlers;
pub mod referral_handlers;
pub mod routes;

pub use admin_extractor::*;
pub use handlers::*;
pub use routes::*;

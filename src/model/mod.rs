pub mod common;
pub mod dashboard;
pub mod guide;
pub mod rank;
pub mod referral;

pub use common::*;
pub use dashboard::*;
pub use guide::*;
pub use rank::*;
pub use referral::*;

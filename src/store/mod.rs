pub mod json_file;
pub mod migrations;
pub mod traits;

pub use json_file::*;
pub use traits::*;

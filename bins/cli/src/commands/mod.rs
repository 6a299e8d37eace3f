//! CLI command handlers.

pub mod check;
pub mod info;
pub mod schema;
pub mod show;

pub use check::run_check;
pub use info::run_info;
pub use schema::run_schema;
pub use show::{ShowCommandInput, run_show};

//! CLI command implementations.

mod config;
mod delete;
mod export;
mod list;
mod preview;
mod rebuild;
mod restructure;
mod show;
mod source;
mod templates;

pub use config::run_config;
pub use delete::run_delete;
pub use export::run_export;
pub use list::run_list;
pub use preview::run_preview;
pub use rebuild::run_rebuild;
pub use restructure::run_restructure;
pub use show::run_show;
pub use templates::run_templates;

//! Database access for the review backend. Each sub-module owns one concern;
//! handlers call into these functions and never build queries themselves.

pub mod catalog_service;
pub mod filter_service;
pub mod moderation_service;

pub use catalog_service::{fetch_catalog_page, CatalogQuery};
pub use filter_service::fetch_filter_options;
pub use moderation_service::{apply_remark_batch, BatchOutcome, ModerationError};

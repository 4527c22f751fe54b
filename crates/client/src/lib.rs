//! Reviewer-side pieces of the product review tool: the HTTP client, the
//! pending remark tracker and the session controller that ties them together.

pub mod api;
pub mod config;
pub mod error;
pub mod pagination;
pub mod session;
pub mod tracker;
pub mod view;

pub use api::{CatalogApi, HttpCatalogApi};
pub use error::ClientError;
pub use session::{CommitOutcome, ReviewSession, ViewState};
pub use tracker::{PendingEdit, RemarkTracker};

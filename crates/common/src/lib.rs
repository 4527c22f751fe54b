//! Wire types shared by the review server and the review client.

pub mod catalog;
pub mod moderation;
pub mod remarks;

pub use catalog::{
    BrandOption, CatalogFilter, CatalogPage, CatalogProduct, CategoryOption, FilterOptions,
    page_offset, PaginationMeta, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
pub use moderation::{RemarkEdit, SaveRemarksRequest, SaveRemarksResponse};
pub use remarks::{RemarkSet, RemarkTag, UnknownRemarkTag};

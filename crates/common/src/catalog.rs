use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// One row of the catalog listing. `remarks` carries the raw persisted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: i32,
    pub product_id: i64,
    pub name: String,
    pub is_flagged: bool,
    pub remarks: Option<String>,
    pub category_name: String,
    pub gender: String,
    pub brand_name: String,
    pub thumbnail_path: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    /// `limit` must be non-zero; callers normalise it before getting here.
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = total.div_ceil(limit.max(1));
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Row offset of this page, see [`page_offset`].
    pub fn offset(&self) -> Option<u64> {
        page_offset(self.page, self.limit)
    }
}

/// Row offset of `page`, or `None` when it does not fit a signed 64-bit SQL
/// offset. No row can live at such an offset, so the page is empty.
pub fn page_offset(page: u64, limit: u64) -> Option<u64> {
    page.saturating_sub(1)
        .checked_mul(limit)
        .filter(|offset| i64::try_from(*offset).is_ok())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub products: Vec<CatalogProduct>,
    pub pagination: PaginationMeta,
}

/// Optional equality filters on the catalog. Unset fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl CatalogFilter {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none() && self.brand_id.is_none() && self.gender.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub id: i32,
    pub name: String,
    pub gender: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandOption {
    pub id: i32,
    pub name: String,
}

/// Filter values present among non-flagged products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub categories: Vec<CategoryOption>,
    pub brands: Vec<BrandOption>,
    pub genders: Vec<String>,
}

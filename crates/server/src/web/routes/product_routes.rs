use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use review_common::{
    CatalogFilter, CatalogPage, SaveRemarksRequest, SaveRemarksResponse, DEFAULT_PAGE,
    DEFAULT_PAGE_SIZE,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::services::{self, moderation_service::EMPTY_BATCH_MESSAGE, CatalogQuery};
use crate::web::{AppError, AppState};

// --- Request/Response Structs ---

/// Raw query string for the catalog listing. Everything arrives as text so
/// that bad paging values can fall back to defaults instead of failing.
#[derive(Deserialize, Debug, Default)]
pub struct CatalogQueryParams {
    page: Option<String>,
    limit: Option<String>,
    category_id: Option<String>,
    brand_id: Option<String>,
    gender: Option<String>,
}

/// Positive values that also fit a signed SQL integer; anything else falls back.
fn parse_positive_or(value: Option<&str>, default: u64) -> u64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .map(|v| v as u64)
        .unwrap_or(default)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_id(name: &str, value: Option<String>) -> Result<Option<i32>, AppError> {
    match non_blank(value) {
        Some(raw) => raw
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| AppError::InvalidInput(format!("{name} must be an integer"))),
        None => Ok(None),
    }
}

impl CatalogQueryParams {
    pub fn into_catalog_query(self) -> Result<CatalogQuery, AppError> {
        let page = parse_positive_or(self.page.as_deref(), DEFAULT_PAGE);
        let limit = parse_positive_or(self.limit.as_deref(), DEFAULT_PAGE_SIZE);
        let filter = CatalogFilter {
            category_id: parse_id("category_id", self.category_id)?,
            brand_id: parse_id("brand_id", self.brand_id)?,
            gender: non_blank(self.gender),
        };
        Ok(CatalogQuery {
            filter,
            page,
            limit,
        })
    }
}

// --- Route Handlers ---

async fn get_products_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<Json<CatalogPage>, AppError> {
    let query = params.into_catalog_query()?;
    let page = services::fetch_catalog_page(
        &app_state.db_pool,
        &query,
        &app_state.config.image_base_url,
    )
    .await?;
    Ok(Json(page))
}

async fn save_remarks_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<SaveRemarksRequest>, JsonRejection>,
) -> Result<Json<SaveRemarksResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected malformed remark batch.");
        AppError::InvalidInput(EMPTY_BATCH_MESSAGE.to_string())
    })?;

    let outcome = services::apply_remark_batch(&app_state.db_pool, &request.products).await?;
    info!(
        submitted = outcome.submitted,
        rows_affected = outcome.rows_affected,
        "Saved product remarks."
    );

    Ok(Json(SaveRemarksResponse {
        success: true,
        message: format!("Updated {} product(s)", outcome.submitted),
    }))
}

// --- Router ---

pub fn create_products_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/products", get(get_products_handler))
        .route("/api/products/save-remarks", post(save_remarks_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, limit: Option<&str>) -> CatalogQueryParams {
        CatalogQueryParams {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_paging_uses_defaults() {
        let query = params(None, None).into_catalog_query().unwrap();
        assert_eq!((query.page, query.limit), (1, 50));
        assert!(query.filter.is_empty());
    }

    #[test]
    fn test_non_numeric_paging_falls_back_to_defaults() {
        let query = params(Some("abc"), Some("lots")).into_catalog_query().unwrap();
        assert_eq!((query.page, query.limit), (1, 50));

        let query = params(Some("0"), Some("-5")).into_catalog_query().unwrap();
        assert_eq!((query.page, query.limit), (1, 50));
    }

    #[test]
    fn test_valid_paging_is_kept() {
        let query = params(Some("3"), Some("20")).into_catalog_query().unwrap();
        assert_eq!((query.page, query.limit), (3, 20));
    }

    #[test]
    fn test_limit_outside_sql_range_falls_back_to_default() {
        let query = params(Some("2"), Some("18446744073709551615"))
            .into_catalog_query()
            .unwrap();
        assert_eq!((query.page, query.limit), (2, 50));
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let query = CatalogQueryParams {
            category_id: Some(String::new()),
            brand_id: Some(" ".to_string()),
            gender: Some(String::new()),
            ..Default::default()
        }
        .into_catalog_query()
        .unwrap();
        assert!(query.filter.is_empty());
    }

    #[test]
    fn test_filters_are_parsed() {
        let query = CatalogQueryParams {
            category_id: Some("12".to_string()),
            gender: Some("women".to_string()),
            ..Default::default()
        }
        .into_catalog_query()
        .unwrap();
        assert_eq!(query.filter.category_id, Some(12));
        assert_eq!(query.filter.brand_id, None);
        assert_eq!(query.filter.gender.as_deref(), Some("women"));
    }

    #[test]
    fn test_non_numeric_id_filter_is_rejected() {
        let result = CatalogQueryParams {
            brand_id: Some("acme".to_string()),
            ..Default::default()
        }
        .into_catalog_query();
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}

use axum::{extract::State, routing::get, Json, Router};
use review_common::FilterOptions;
use std::sync::Arc;

use crate::db::services;
use crate::web::{AppError, AppState};

async fn get_filters_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<FilterOptions>, AppError> {
    let options = services::fetch_filter_options(&app_state.db_pool).await?;
    Ok(Json(options))
}

pub fn create_filters_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/filters", get(get_filters_handler))
}

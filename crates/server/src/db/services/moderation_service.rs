//! Batch moderation: applies flag/remark edits to products as one transaction.

use chrono::Utc;
use review_common::{RemarkEdit, RemarkSet};
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, TransactionTrait, UpdateMany,
};
use tracing::{debug, error, warn};

use crate::db::entities::product;

pub const EMPTY_BATCH_MESSAGE: &str = "Products array is required";

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Storage(#[from] DbErr),
}

/// An edit whose remark list has been reduced to known, distinct tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedEdit {
    pub product_id: i64,
    pub is_flagged: bool,
    pub remarks: RemarkSet,
}

impl PreparedEdit {
    pub fn from_edit(edit: &RemarkEdit) -> Self {
        let (remarks, rejected) = RemarkSet::from_raw(&edit.remarks);
        if !rejected.is_empty() {
            warn!(
                product_id = edit.product_id,
                rejected = ?rejected,
                "Ignoring unrecognised remark tags."
            );
        }
        if edit.is_flagged && remarks.is_empty() {
            warn!(
                product_id = edit.product_id,
                "Product flagged without any recognised remark."
            );
        }
        Self {
            product_id: edit.product_id,
            is_flagged: edit.is_flagged,
            remarks,
        }
    }

    fn update_statement(&self) -> UpdateMany<product::Entity> {
        product::Entity::update_many()
            .col_expr(product::Column::IsFlagged, Expr::value(self.is_flagged))
            .col_expr(product::Column::Remarks, Expr::value(self.remarks.to_storage()))
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::ProductId.eq(self.product_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Number of edits in the batch, reported back to the caller.
    pub submitted: usize,
    /// Rows actually touched; lower than `submitted` when ids did not match.
    pub rows_affected: u64,
}

/// Applies every edit or none of them.
///
/// Edits are matched on the external `product_id`. An id that matches no row
/// updates nothing but does not fail the batch.
pub async fn apply_remark_batch(
    db: &DatabaseConnection,
    edits: &[RemarkEdit],
) -> Result<BatchOutcome, ModerationError> {
    if edits.is_empty() {
        return Err(ModerationError::Validation(EMPTY_BATCH_MESSAGE.to_string()));
    }

    let prepared: Vec<PreparedEdit> = edits.iter().map(PreparedEdit::from_edit).collect();

    let txn = db.begin().await?;
    let mut rows_affected = 0;

    for edit in &prepared {
        match edit.update_statement().exec(&txn).await {
            Ok(result) => {
                if result.rows_affected == 0 {
                    debug!(product_id = edit.product_id, "No product matched remark edit.");
                }
                rows_affected += result.rows_affected;
            }
            Err(e) => {
                error!(
                    product_id = edit.product_id,
                    error = %e,
                    "Remark update failed. Rolling back batch."
                );
                if let Err(rollback_err) = txn.rollback().await {
                    error!(error = %rollback_err, "Failed to roll back remark batch.");
                }
                return Err(e.into());
            }
        }
    }

    txn.commit().await?;

    Ok(BatchOutcome {
        submitted: prepared.len(),
        rows_affected,
    })
}

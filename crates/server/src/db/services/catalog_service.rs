//! Catalog listing: a filtered, paginated read over non-flagged products.
//!
//! Filters are expressed as a list of typed [`CatalogPredicate`]s which are
//! AND-ed into a single sea-orm `Condition`. The same condition drives the
//! page query and the count query so the pagination totals always describe
//! the rows being paged through.

use review_common::{page_offset, CatalogFilter, CatalogPage, CatalogProduct, PaginationMeta};
use sea_orm::{
    sea_query::{Expr, IntoCondition},
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use tracing::debug;

use crate::db::entities::{brand, category, product, product_image};

/// One equality constraint on the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogPredicate {
    /// Always present: flagged products never appear in the catalog.
    Unflagged,
    Category(i32),
    Brand(i32),
    Gender(String),
}

impl CatalogPredicate {
    fn into_condition(self) -> Condition {
        match self {
            CatalogPredicate::Unflagged => product::Column::IsFlagged.eq(false).into_condition(),
            CatalogPredicate::Category(id) => product::Column::CategoryId.eq(id).into_condition(),
            CatalogPredicate::Brand(id) => product::Column::BrandId.eq(id).into_condition(),
            CatalogPredicate::Gender(gender) => {
                category::Column::Gender.eq(gender).into_condition()
            }
        }
    }
}

/// Maps a filter onto its predicate list, starting with the unconditional exclusion.
pub fn predicates_for(filter: &CatalogFilter) -> Vec<CatalogPredicate> {
    let mut predicates = vec![CatalogPredicate::Unflagged];
    if let Some(category_id) = filter.category_id {
        predicates.push(CatalogPredicate::Category(category_id));
    }
    if let Some(brand_id) = filter.brand_id {
        predicates.push(CatalogPredicate::Brand(brand_id));
    }
    if let Some(gender) = &filter.gender {
        predicates.push(CatalogPredicate::Gender(gender.clone()));
    }
    predicates
}

pub fn compose(predicates: Vec<CatalogPredicate>) -> Condition {
    predicates
        .into_iter()
        .fold(Condition::all(), |acc, predicate| acc.add(predicate.into_condition()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub filter: CatalogFilter,
    pub page: u64,
    pub limit: u64,
}

#[derive(FromQueryResult, Debug, Clone)]
struct CatalogRow {
    id: i32,
    product_id: i64,
    name: String,
    is_flagged: bool,
    remarks: Option<String>,
    category_name: String,
    gender: String,
    brand_name: String,
    thumbnail_path: Option<String>,
}

impl CatalogRow {
    fn into_product(self, image_base_url: &str) -> CatalogProduct {
        let thumbnail_url = thumbnail_url(image_base_url, self.thumbnail_path.as_deref());
        CatalogProduct {
            id: self.id,
            product_id: self.product_id,
            name: self.name,
            is_flagged: self.is_flagged,
            remarks: self.remarks,
            category_name: self.category_name,
            gender: self.gender,
            brand_name: self.brand_name,
            thumbnail_path: self.thumbnail_path,
            thumbnail_url,
        }
    }
}

pub fn thumbnail_url(image_base_url: &str, thumbnail_path: Option<&str>) -> Option<String> {
    thumbnail_path.map(|path| {
        format!(
            "{}/{}",
            image_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    })
}

/// Products joined with category, brand and the (optional) thumbnail image.
fn listing_select(condition: Condition) -> Select<product::Entity> {
    product::Entity::find()
        .select_only()
        .columns([
            product::Column::Id,
            product::Column::ProductId,
            product::Column::Name,
            product::Column::IsFlagged,
            product::Column::Remarks,
        ])
        .column_as(category::Column::Name, "category_name")
        .column(category::Column::Gender)
        .column_as(brand::Column::Name, "brand_name")
        .column_as(product_image::Column::MinioPath, "thumbnail_path")
        .join(JoinType::InnerJoin, product::Relation::Category.def())
        .join(JoinType::InnerJoin, product::Relation::Brand.def())
        .join(
            JoinType::LeftJoin,
            product::Relation::ProductImage
                .def()
                .on_condition(|_left, right| {
                    Expr::col((right, product_image::Column::IsThumbnail))
                        .eq(true)
                        .into_condition()
                }),
        )
        .filter(condition)
        .order_by_asc(product::Column::Id)
}

/// Mirrors the listing's predicates without limit/offset. The category join is
/// needed for the gender predicate.
fn count_select(condition: Condition) -> Select<product::Entity> {
    product::Entity::find()
        .join(JoinType::InnerJoin, product::Relation::Category.def())
        .filter(condition)
}

/// Fetches one page of the catalog together with its pagination metadata.
pub async fn fetch_catalog_page<C>(
    db: &C,
    query: &CatalogQuery,
    image_base_url: &str,
) -> Result<CatalogPage, DbErr>
where
    C: ConnectionTrait,
{
    let condition = compose(predicates_for(&query.filter));

    // A page whose offset leaves the SQL range is past the end; only the count runs.
    let rows = match page_offset(query.page, query.limit) {
        Some(offset) => {
            listing_select(condition.clone())
                .limit(query.limit)
                .offset(offset)
                .into_model::<CatalogRow>()
                .all(db)
                .await?
        }
        None => Vec::new(),
    };

    let total = count_select(condition).count(db).await?;
    let pagination = PaginationMeta::new(query.page, query.limit, total);

    debug!(
        page = query.page,
        limit = query.limit,
        total,
        returned = rows.len(),
        "Fetched catalog page."
    );

    let products = rows
        .into_iter()
        .map(|row| row.into_product(image_base_url))
        .collect();

    Ok(CatalogPage {
        products,
        pagination,
    })
}

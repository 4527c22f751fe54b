use review_common::{BrandOption, CategoryOption, FilterOptions};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};

use crate::db::entities::{brand, category, product};

#[derive(FromQueryResult, Debug)]
struct CategoryRow {
    id: i32,
    name: String,
    gender: String,
}

#[derive(FromQueryResult, Debug)]
struct BrandRow {
    id: i32,
    name: String,
}

#[derive(FromQueryResult, Debug)]
struct GenderRow {
    gender: String,
}

async fn categories_in_use<C: ConnectionTrait>(db: &C) -> Result<Vec<CategoryOption>, DbErr> {
    let rows = category::Entity::find()
        .select_only()
        .columns([category::Column::Id, category::Column::Name, category::Column::Gender])
        .distinct()
        .join(JoinType::InnerJoin, category::Relation::Product.def())
        .filter(product::Column::IsFlagged.eq(false))
        .order_by_asc(category::Column::Gender)
        .order_by_asc(category::Column::Name)
        .into_model::<CategoryRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| CategoryOption {
            id: row.id,
            name: row.name,
            gender: row.gender,
        })
        .collect())
}

async fn brands_in_use<C: ConnectionTrait>(db: &C) -> Result<Vec<BrandOption>, DbErr> {
    let rows = brand::Entity::find()
        .select_only()
        .columns([brand::Column::Id, brand::Column::Name])
        .distinct()
        .join(JoinType::InnerJoin, brand::Relation::Product.def())
        .filter(product::Column::IsFlagged.eq(false))
        .order_by_asc(brand::Column::Name)
        .into_model::<BrandRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| BrandOption {
            id: row.id,
            name: row.name,
        })
        .collect())
}

async fn genders_in_use<C: ConnectionTrait>(db: &C) -> Result<Vec<String>, DbErr> {
    let rows = category::Entity::find()
        .select_only()
        .column(category::Column::Gender)
        .distinct()
        .join(JoinType::InnerJoin, category::Relation::Product.def())
        .filter(product::Column::IsFlagged.eq(false))
        .order_by_asc(category::Column::Gender)
        .into_model::<GenderRow>()
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|row| row.gender).collect())
}

/// Categories, brands and genders that still have at least one non-flagged product.
/// The three reads are independent and run concurrently.
pub async fn fetch_filter_options<C: ConnectionTrait>(db: &C) -> Result<FilterOptions, DbErr> {
    let (categories, brands, genders) = tokio::try_join!(
        categories_in_use(db),
        brands_in_use(db),
        genders_in_use(db)
    )?;

    Ok(FilterOptions {
        categories,
        brands,
        genders,
    })
}

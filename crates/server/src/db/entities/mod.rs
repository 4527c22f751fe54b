//! SeaORM entities for the product review schema.

pub mod brand;
pub mod category;
pub mod product;
pub mod product_image;


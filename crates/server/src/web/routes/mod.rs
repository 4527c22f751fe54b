pub mod filter_routes;
pub mod product_routes;

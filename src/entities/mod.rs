//! Import row types - one module per kind of imported entity

pub mod chain;
pub mod classification;
pub mod food_group;
pub mod master_product;
pub mod product;
pub mod row;

pub use chain::ChainRow;
pub use classification::{Axis, Classification};
pub use food_group::FoodGroupRow;
pub use master_product::MasterProductRow;
pub use product::ProductRow;
pub use row::RowError;

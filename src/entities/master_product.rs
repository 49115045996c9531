//! Master product nodes
//!
//! One master product exists per product id no matter how many yearly
//! files mention it. Its identity fields are treated as unchanging, so the
//! values from whichever import ran last are kept.

use serde::Deserialize;

use crate::core::csv_reader::CsvRow;
use crate::core::pipeline::ImportRow;
use crate::core::resolver::ReferenceResolver;
use crate::core::store::{EntityType, Record, StoreError};

use super::classification::{Axis, Classification};
use super::row::{parse_positional, RowError};

pub const BUNDLE: &str = "master_product";
pub const FIELD_MASTER_PRODUCT_ID: &str = "field_master_product_id";
pub const FIELD_MASTER_PRODUCT_NAME: &str = "field_master_product_name";
pub const FIELD_MASTER_FAST_FOOD_CHAIN: &str = "field_master_fast_food_chain";
pub const FIELD_MASTER_FOOD_GROUP: &str = "field_master_food_group";

/// Leading columns shared with the yearly product layout
///
/// Name columns and the year are read but not stored on the master product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MasterColumns {
    pub product_id: String,
    pub name: String,
    pub year: String,
    pub chain_name: String,
    pub chain_id: String,
    pub food_group_name: String,
    pub food_group_id: String,
    pub major_category_name: String,
    pub major_category_id: String,
    pub minor_category_name: String,
    pub minor_category_id: String,
}

/// A parsed master product row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterProductRow {
    pub columns: MasterColumns,
    pub classification: Classification,
}

impl MasterProductRow {
    pub const WIDTH: usize = 11;
}

impl ImportRow for MasterProductRow {
    const KIND: &'static str = "master";
    const ENTITY_TYPE: EntityType = EntityType::Node;
    const BUNDLE: &'static str = BUNDLE;

    fn parse(row: &CsvRow) -> Result<Self, RowError> {
        let columns: MasterColumns = parse_positional(row, Self::WIDTH)?;
        let classification = Classification::from_codes(
            &columns.food_group_id,
            &columns.major_category_id,
            &columns.minor_category_id,
        )?;
        Ok(Self {
            columns,
            classification,
        })
    }

    fn natural_key(&self) -> Vec<(&'static str, &str)> {
        vec![(FIELD_MASTER_PRODUCT_ID, self.columns.product_id.as_str())]
    }

    fn title(&self) -> &str {
        &self.columns.name
    }

    fn apply(&self, record: &mut Record, resolver: &ReferenceResolver<'_>) -> Result<(), StoreError> {
        let columns = &self.columns;
        record.title = columns.name.clone();
        record.set_text(FIELD_MASTER_PRODUCT_ID, &columns.product_id);
        record.set_text(FIELD_MASTER_PRODUCT_NAME, &columns.name);

        if !columns.chain_id.is_empty() {
            let chain = resolver.resolve(Axis::Chain, &columns.chain_id)?;
            record.set_reference(FIELD_MASTER_FAST_FOOD_CHAIN, chain);
        }

        if let Some(group) = resolver.resolve_classification(&self.classification)? {
            record.set_reference(FIELD_MASTER_FOOD_GROUP, group);
        }

        Ok(())
    }
}

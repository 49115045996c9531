//! Fast-food chain nodes

use serde::Deserialize;

use crate::core::csv_reader::CsvRow;
use crate::core::pipeline::ImportRow;
use crate::core::resolver::ReferenceResolver;
use crate::core::store::{EntityType, Record, StoreError};

use super::row::{parse_positional, RowError};

pub const BUNDLE: &str = "fast_food_chain";
pub const FIELD_CHAIN_ID: &str = "field_fast_food_chain_id";

/// Chain CSV layout: `name, chain id`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainRow {
    pub name: String,
    pub chain_id: String,
}

impl ChainRow {
    pub const WIDTH: usize = 2;
}

impl ImportRow for ChainRow {
    const KIND: &'static str = "chain";
    const ENTITY_TYPE: EntityType = EntityType::Node;
    const BUNDLE: &'static str = BUNDLE;

    fn parse(row: &CsvRow) -> Result<Self, RowError> {
        parse_positional(row, Self::WIDTH)
    }

    fn natural_key(&self) -> Vec<(&'static str, &str)> {
        vec![(FIELD_CHAIN_ID, self.chain_id.as_str())]
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut Record, _resolver: &ReferenceResolver<'_>) -> Result<(), StoreError> {
        record.title = self.name.clone();
        record.set_text(FIELD_CHAIN_ID, &self.chain_id);
        Ok(())
    }
}

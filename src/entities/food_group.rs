//! Food group vocabulary terms
//!
//! Each row becomes one term at the most specific classification level it
//! carries. The term holds only that level's id field, so lookups on one
//! axis never match terms of another.

use serde::Deserialize;

use crate::core::csv_reader::CsvRow;
use crate::core::pipeline::ImportRow;
use crate::core::resolver::ReferenceResolver;
use crate::core::store::{EntityType, Record, StoreError};

use super::classification::{Axis, Classification, FOOD_GROUP_VOCABULARY};
use super::row::{parse_positional, RowError};

/// Term CSV layout: `name, food group id, major category id, minor category id`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TermColumns {
    name: String,
    food_group_id: String,
    major_category_id: String,
    minor_category_id: String,
}

/// A parsed term row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoodGroupRow {
    pub name: String,
    pub level: Axis,
    pub code: String,
}

impl FoodGroupRow {
    pub const WIDTH: usize = 4;
}

impl ImportRow for FoodGroupRow {
    const KIND: &'static str = "food-groups";
    const ENTITY_TYPE: EntityType = EntityType::TaxonomyTerm;
    const BUNDLE: &'static str = FOOD_GROUP_VOCABULARY;

    fn parse(row: &CsvRow) -> Result<Self, RowError> {
        let columns: TermColumns = parse_positional(row, Self::WIDTH)?;
        let classification = Classification::from_codes(
            &columns.food_group_id,
            &columns.major_category_id,
            &columns.minor_category_id,
        )?;
        let (level, code) = classification
            .most_specific()
            .ok_or(RowError::NoClassification)?;

        Ok(Self {
            name: columns.name,
            level,
            code: code.to_string(),
        })
    }

    fn natural_key(&self) -> Vec<(&'static str, &str)> {
        vec![(self.level.id_field(), self.code.as_str())]
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut Record, _resolver: &ReferenceResolver<'_>) -> Result<(), StoreError> {
        record.title = self.name.clone();
        record.set_text(self.level.id_field(), &self.code);
        Ok(())
    }
}

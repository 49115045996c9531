//! Year-scoped product nodes
//!
//! A product is identified by its product id together with a year, so each
//! year's nutrition figures live in their own record. Products come either
//! from a yearly CSV file or from copying the master products forward.

use serde::Deserialize;

use crate::core::csv_reader::CsvRow;
use crate::core::pipeline::ImportRow;
use crate::core::resolver::ReferenceResolver;
use crate::core::store::{EntityType, Record, StoreError};

use super::classification::{Axis, Classification};
use super::master_product;
use super::row::{parse_positional, RowError};

pub const BUNDLE: &str = "product";
pub const FIELD_PRODUCT_ID: &str = "field_product_id";
pub const FIELD_PRODUCT_NAME: &str = "field_product_name";
pub const FIELD_YEAR: &str = "field_year";
pub const FIELD_FAST_FOOD_CHAIN: &str = "field_fast_food_chain";
pub const FIELD_FOOD_GROUP: &str = "field_food_group";
pub const FIELD_ALL_INFORMATION: &str = "field_all_information";

/// Yearly product CSV layout, one struct field per column
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductColumns {
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
    pub data_source: String,
    pub healthier_option: String,
    pub serving_unit: String,
    pub serving_size: String,
    pub package_unit: String,
    pub package_size: String,
    pub energy_kj_100g: String,
    pub protein_g_100g: String,
    pub total_fat_g_100g: String,
    pub saturated_fat_g_100g: String,
    pub carbohydrate_g_100g: String,
    pub sugar_g_100g: String,
    pub sodium_mg_100g: String,
    pub fibre_g_100g: String,
    pub trans_fat_g_100g: String,
    pub poly_fat_g_100g: String,
    pub mono_fat_g_100g: String,
    pub energy_kj_serve: String,
    pub protein_g_serve: String,
    pub total_fat_g_serve: String,
    pub saturated_fat_g_serve: String,
    pub carbohydrate_g_serve: String,
    pub sugar_g_serve: String,
    pub sodium_mg_serve: String,
    pub fibre_g_serve: String,
    pub trans_fat_g_serve: String,
    pub poly_fat_g_serve: String,
    pub mono_fat_g_serve: String,
    pub notes_on_missing_data: String,
    pub additional_notes: String,
}

impl ProductColumns {
    /// Scalar attributes with the store field each one is written to
    pub fn attributes(&self) -> [(&'static str, &str); 30] {
        [
            ("field_data_source", self.data_source.as_str()),
            ("field_healthier_option", self.healthier_option.as_str()),
            ("field_serving_unit", self.serving_unit.as_str()),
            ("field_serving_size", self.serving_size.as_str()),
            ("field_package_unit", self.package_unit.as_str()),
            ("field_package_size", self.package_size.as_str()),
            ("field_energy_kj_100g", self.energy_kj_100g.as_str()),
            ("field_protein_g_100g", self.protein_g_100g.as_str()),
            ("field_total_fat_g_100g", self.total_fat_g_100g.as_str()),
            ("field_saturated_fat_g_100g", self.saturated_fat_g_100g.as_str()),
            ("field_carbohydrate_g_100g", self.carbohydrate_g_100g.as_str()),
            ("field_sugar_g_100g", self.sugar_g_100g.as_str()),
            ("field_sodium_mg_100g", self.sodium_mg_100g.as_str()),
            ("field_fibre_g_100g", self.fibre_g_100g.as_str()),
            ("field_trans_fat_g_100g", self.trans_fat_g_100g.as_str()),
            ("field_poly_fat_g_100g", self.poly_fat_g_100g.as_str()),
            ("field_mono_fat_g_100g", self.mono_fat_g_100g.as_str()),
            ("field_energy_kj_serve", self.energy_kj_serve.as_str()),
            ("field_protein_g_serve", self.protein_g_serve.as_str()),
            ("field_total_fat_g_serve", self.total_fat_g_serve.as_str()),
            ("field_saturated_fat_g_serve", self.saturated_fat_g_serve.as_str()),
            ("field_carbohydrate_g_serve", self.carbohydrate_g_serve.as_str()),
            ("field_sugar_g_serve", self.sugar_g_serve.as_str()),
            ("field_sodium_mg_serve", self.sodium_mg_serve.as_str()),
            ("field_fibre_g_serve", self.fibre_g_serve.as_str()),
            ("field_trans_fat_g_serve", self.trans_fat_g_serve.as_str()),
            ("field_poly_fat_g_serve", self.poly_fat_g_serve.as_str()),
            ("field_mono_fat_g_serve", self.mono_fat_g_serve.as_str()),
            ("field_notes_on_missing_data", self.notes_on_missing_data.as_str()),
            ("field_additional_notes", self.additional_notes.as_str()),
        ]
    }
}

/// A parsed yearly product row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub columns: ProductColumns,
    pub classification: Classification,
}

impl ProductRow {
    pub const WIDTH: usize = 41;
}

impl ImportRow for ProductRow {
    const KIND: &'static str = "product";
    const ENTITY_TYPE: EntityType = EntityType::Node;
    const BUNDLE: &'static str = BUNDLE;

    fn parse(row: &CsvRow) -> Result<Self, RowError> {
        let columns: ProductColumns = parse_positional(row, Self::WIDTH)?;
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
        vec![
            (FIELD_PRODUCT_ID, self.columns.product_id.as_str()),
            (FIELD_YEAR, self.columns.year.as_str()),
        ]
    }

    fn title(&self) -> &str {
        &self.columns.name
    }

    fn apply(&self, record: &mut Record, resolver: &ReferenceResolver<'_>) -> Result<(), StoreError> {
        let columns = &self.columns;
        record.title = columns.name.clone();
        record.set_text(FIELD_PRODUCT_ID, &columns.product_id);
        record.set_text(FIELD_PRODUCT_NAME, &columns.name);
        record.set_text(FIELD_YEAR, &columns.year);

        if !columns.chain_id.is_empty() {
            let chain = resolver.resolve(Axis::Chain, &columns.chain_id)?;
            record.set_reference(FIELD_FAST_FOOD_CHAIN, chain);
        }

        if let Some(group) = resolver.resolve_classification(&self.classification)? {
            record.set_reference(FIELD_FOOD_GROUP, group);
        }

        for (field, value) in columns.attributes() {
            record.set_text(field, value);
        }
        record.set_flag(FIELD_ALL_INFORMATION, true);

        Ok(())
    }
}

/// Build an unsaved product for `year` from a master product record
pub fn from_master(master: &Record, year: &str) -> Record {
    let mut product = Record::new(EntityType::Node, BUNDLE, master.title.clone());
    product.set_text(
        FIELD_PRODUCT_ID,
        master.text(master_product::FIELD_MASTER_PRODUCT_ID).unwrap_or_default(),
    );
    product.set_text(
        FIELD_PRODUCT_NAME,
        master.text(master_product::FIELD_MASTER_PRODUCT_NAME).unwrap_or_default(),
    );
    product.set_text(FIELD_YEAR, year);
    product.set_reference(
        FIELD_FAST_FOOD_CHAIN,
        master.reference(master_product::FIELD_MASTER_FAST_FOOD_CHAIN),
    );
    product.set_reference(
        FIELD_FOOD_GROUP,
        master.reference(master_product::FIELD_MASTER_FOOD_GROUP),
    );
    product
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::EntityKey;

    #[test]
    fn test_short_product_row_is_rejected() {
        let row = CsvRow::new(4, &["101", "Big Mac", "2021"]);
        let err = ProductRow::parse(&row).unwrap_err();
        assert!(matches!(
            err,
            RowError::TooShort {
                expected: 41,
                found: 3
            }
        ));
    }

    #[test]
    fn test_natural_key_includes_year() {
        let mut fields = vec!["101", "Big Mac", "2021"];
        fields.extend(std::iter::repeat("").take(38));
        let parsed = ProductRow::parse(&CsvRow::new(1, &fields)).unwrap();

        assert_eq!(
            parsed.natural_key(),
            vec![(FIELD_PRODUCT_ID, "101"), (FIELD_YEAR, "2021")]
        );
        assert!(parsed.classification.is_empty());
    }

    #[test]
    fn test_from_master_copies_identity_and_references() {
        let mut master = Record::new(EntityType::Node, master_product::BUNDLE, "Big Mac");
        master.set_text(master_product::FIELD_MASTER_PRODUCT_ID, "101");
        master.set_text(master_product::FIELD_MASTER_PRODUCT_NAME, "Big Mac");
        master.set_reference(master_product::FIELD_MASTER_FAST_FOOD_CHAIN, Some(EntityKey(1)));
        master.set_reference(master_product::FIELD_MASTER_FOOD_GROUP, Some(EntityKey(9)));

        let product = from_master(&master, "2022");
        assert!(product.is_new());
        assert_eq!(product.bundle, BUNDLE);
        assert_eq!(product.title, "Big Mac");
        assert_eq!(product.text(FIELD_PRODUCT_ID), Some("101"));
        assert_eq!(product.text(FIELD_YEAR), Some("2022"));
        assert_eq!(product.reference(FIELD_FAST_FOOD_CHAIN), Some(EntityKey(1)));
        assert_eq!(product.reference(FIELD_FOOD_GROUP), Some(EntityKey(9)));
        assert_eq!(product.flag(FIELD_ALL_INFORMATION), None);
    }
}

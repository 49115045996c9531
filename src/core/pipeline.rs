//! Upsert pipeline
//!
//! Drives parsed CSV rows into the entity store. For every row:
//! 1. parse it into the row type of the import kind
//! 2. look for a published record with the same natural key
//! 3. load it, or create a new record (rows without a title are skipped)
//! 4. apply scalar fields and resolved references
//! 5. save and count the outcome
//!
//! Saves are independent: a failure part way through leaves every earlier
//! row committed.

use miette::Diagnostic;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::core::csv_reader::{read_rows, CsvReadError, CsvRow};
use crate::core::resolver::ReferenceResolver;
use crate::core::store::{EntityKey, EntityStore, EntityType, Query, Record, StoreError};
use crate::entities::row::RowError;
use crate::entities::{master_product, product};

/// A row shape that can be upserted into the store
pub trait ImportRow: Sized {
    /// Name used in messages and on the command line
    const KIND: &'static str;
    const ENTITY_TYPE: EntityType;
    const BUNDLE: &'static str;

    /// Parse and validate one CSV row
    fn parse(row: &CsvRow) -> Result<Self, RowError>;

    /// Field/value pairs identifying the record this row describes
    fn natural_key(&self) -> Vec<(&'static str, &str)>;

    /// Title for newly created records
    fn title(&self) -> &str;

    /// Copy this row onto a new or existing record
    fn apply(&self, record: &mut Record, resolver: &ReferenceResolver<'_>)
        -> Result<(), StoreError>;
}

/// Options shared by every import run
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Drop the first row of the file
    pub skip_header: bool,
    /// Count bad rows and continue instead of stopping
    pub skip_errors: bool,
    /// Owner id stamped on created records
    pub owner: u32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_header: false,
            skip_errors: false,
            owner: 1,
        }
    }
}

/// Import statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// What happened to a single row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created(EntityKey),
    Updated(EntityKey),
    /// New record with an empty title; nothing was saved
    Skipped,
}

/// Errors that stop an import run
#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Read(#[from] CsvReadError),

    #[error("{kind} row at line {line} was rejected")]
    #[diagnostic(
        code(nutri::import::row),
        help("fix the row, or pass --skip-errors to continue past bad rows")
    )]
    Row {
        line: u64,
        kind: &'static str,
        #[source]
        #[diagnostic_source]
        source: RowError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Runs imports against an injected store
pub struct Importer<'s, S: EntityStore> {
    store: &'s mut S,
    options: ImportOptions,
}

impl<'s, S: EntityStore> Importer<'s, S> {
    pub fn new(store: &'s mut S, options: ImportOptions) -> Self {
        Self { store, options }
    }

    /// Read a CSV file and upsert every row as `T`
    ///
    /// A missing or unreadable file fails before the store is touched.
    pub fn import_file<T: ImportRow>(&mut self, path: &Path) -> Result<ImportSummary, ImportError> {
        let rows = read_rows(path)?;
        self.import_rows::<T>(&rows)
    }

    /// Upsert already-read rows as `T`
    pub fn import_rows<T: ImportRow>(&mut self, rows: &[CsvRow]) -> Result<ImportSummary, ImportError> {
        let rows = if self.options.skip_header {
            rows.get(1..).unwrap_or_default()
        } else {
            rows
        };

        let mut summary = ImportSummary::default();
        for row in rows {
            summary.processed += 1;

            let parsed = match T::parse(row) {
                Ok(parsed) => parsed,
                Err(source) => {
                    if !self.options.skip_errors {
                        return Err(ImportError::Row {
                            line: row.line,
                            kind: T::KIND,
                            source,
                        });
                    }
                    tracing::warn!(line = row.line, kind = T::KIND, "skipping bad row: {}", source);
                    summary.errors += 1;
                    continue;
                }
            };

            match self.upsert(&parsed)? {
                Outcome::Created(key) => {
                    tracing::debug!(line = row.line, kind = T::KIND, %key, "created");
                    summary.created += 1;
                }
                Outcome::Updated(key) => {
                    tracing::debug!(line = row.line, kind = T::KIND, %key, "updated");
                    summary.updated += 1;
                }
                Outcome::Skipped => {
                    tracing::warn!(line = row.line, kind = T::KIND, "row has no title, not created");
                    summary.skipped += 1;
                }
            }
        }

        tracing::info!(
            kind = T::KIND,
            processed = summary.processed,
            created = summary.created,
            updated = summary.updated,
            "import finished"
        );
        Ok(summary)
    }

    /// Create or update the record described by one row
    pub fn upsert<T: ImportRow>(&mut self, row: &T) -> Result<Outcome, StoreError> {
        let query = row
            .natural_key()
            .into_iter()
            .fold(
                Query::new(T::ENTITY_TYPE).bundle(T::BUNDLE).published(),
                |query, (field, value)| query.condition(field, value),
            );

        let existing = self.store.query(&query)?.into_iter().next();
        let mut record = match existing {
            Some(key) => self.store.load_existing(key)?,
            None if row.title().is_empty() => return Ok(Outcome::Skipped),
            None => self
                .store
                .create(T::ENTITY_TYPE, T::BUNDLE, row.title())
                .with_owner(self.options.owner),
        };

        {
            let resolver = ReferenceResolver::new(&*self.store);
            row.apply(&mut record, &resolver)?;
        }

        let key = self.store.save(&mut record)?;
        Ok(match existing {
            Some(_) => Outcome::Updated(key),
            None => Outcome::Created(key),
        })
    }

    /// Create a year-scoped product from every published master product
    ///
    /// Always creates; existing products for the same year are not matched.
    pub fn copy_master_products(&mut self, year: &str) -> Result<ImportSummary, StoreError> {
        let masters = self
            .store
            .query(&Query::nodes(master_product::BUNDLE).published())?;

        let mut summary = ImportSummary::default();
        for key in masters {
            summary.processed += 1;
            let master = self.store.load_existing(key)?;
            let mut copy = product::from_master(&master, year).with_owner(self.options.owner);
            let copy_key = self.store.save(&mut copy)?;
            tracing::debug!(master = %key, product = %copy_key, year, "copied master product");
            summary.created += 1;
        }

        tracing::info!(year, created = summary.created, "copy finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{FieldValue, MemoryStore};
    use crate::entities::chain::{self, ChainRow};
    use crate::entities::classification::{
        FIELD_FOOD_GROUP_ID, FIELD_MAJOR_CATEGORY_ID, FIELD_MINOR_CATEGORY_ID,
        FOOD_GROUP_VOCABULARY,
    };
    use crate::entities::food_group::FoodGroupRow;
    use crate::entities::master_product::MasterProductRow;
    use crate::entities::product::ProductRow;
    use std::fs;
    use tempfile::tempdir;

    fn product_fields(id: &str, name: &str, year: &str, chain: &str, codes: [&str; 3]) -> Vec<String> {
        let mut fields: Vec<String> = vec![
            id, name, year, "Chain", chain, "Group", codes[0], "Major", codes[1], "Minor", codes[2],
            "website", "no", "g", "250", "g", "250",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        // 22 nutrient columns, then two notes columns
        fields.extend((0..22).map(|n| format!("{}.5", n)));
        fields.push("none missing".to_string());
        fields.push("limited edition".to_string());
        fields
    }

    fn product_row(line: u64, id: &str, name: &str, year: &str, chain: &str, codes: [&str; 3]) -> CsvRow {
        let fields = product_fields(id, name, year, chain, codes);
        let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        CsvRow::new(line, &refs)
    }

    fn seed_taxonomy(store: &mut MemoryStore) -> (EntityKey, EntityKey, EntityKey) {
        let mut keys = Vec::new();
        for (field, code) in [
            (FIELD_FOOD_GROUP_ID, "01"),
            (FIELD_MAJOR_CATEGORY_ID, "0102"),
            (FIELD_MINOR_CATEGORY_ID, "010203"),
        ] {
            let mut term = Record::new(EntityType::TaxonomyTerm, FOOD_GROUP_VOCABULARY, code);
            term.set_text(field, code);
            keys.push(store.save(&mut term).unwrap());
        }
        (keys[0], keys[1], keys[2])
    }

    #[test]
    fn test_chain_created_then_updated() {
        let mut store = MemoryStore::new();
        let rows = vec![CsvRow::new(1, &["McDonald's", "7"])];

        let first = Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ChainRow>(&rows)
            .unwrap();
        assert_eq!(first.processed, 1);
        assert_eq!(first.created, 1);
        assert_eq!(first.updated, 0);

        let second = Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ChainRow>(&rows)
            .unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.updated, 1);
        assert_eq!(store.len(), 1);

        let chain = store.records().next().unwrap();
        assert_eq!(chain.title, "McDonald's");
        assert_eq!(chain.text(chain::FIELD_CHAIN_ID), Some("7"));
    }

    #[test]
    fn test_missing_file_touches_no_store() {
        let tmp = tempdir().unwrap();
        let mut store = MemoryStore::new();

        let err = Importer::new(&mut store, ImportOptions::default())
            .import_file::<ChainRow>(&tmp.path().join("nope.csv"))
            .unwrap_err();

        assert!(matches!(err, ImportError::Read(CsvReadError::NotFound(_))));
        assert_eq!(store.operations(), 0);
    }

    #[test]
    fn test_import_file_with_header() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("chains.csv");
        fs::write(&path, "name,id\nKFC,3\nSubway,9\n").unwrap();
        let mut store = MemoryStore::new();
        let options = ImportOptions {
            skip_header: true,
            ..ImportOptions::default()
        };

        let summary = Importer::new(&mut store, options)
            .import_file::<ChainRow>(&path)
            .unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.created, 2);
    }

    #[test]
    fn test_created_plus_updated_equals_processed() {
        let mut store = MemoryStore::new();
        let rows = vec![
            CsvRow::new(1, &["KFC", "3"]),
            CsvRow::new(2, &["Subway", "9"]),
            CsvRow::new(3, &["KFC Australia", "3"]),
        ];

        let summary = Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ChainRow>(&rows)
            .unwrap();
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.created + summary.updated, summary.processed);
        assert_eq!(summary.updated, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_empty_title_is_skipped_on_create() {
        let mut store = MemoryStore::new();
        let rows = vec![CsvRow::new(1, &["", "12"])];

        let summary = Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ChainRow>(&rows)
            .unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_unpublished_record_is_not_matched() {
        let mut store = MemoryStore::new();
        let mut hidden = Record::new(EntityType::Node, chain::BUNDLE, "Old KFC");
        hidden.published = false;
        hidden.set_text(chain::FIELD_CHAIN_ID, "3");
        store.save(&mut hidden).unwrap();

        let summary = Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ChainRow>(&[CsvRow::new(1, &["KFC", "3"])])
            .unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_short_row_stops_import() {
        let mut store = MemoryStore::new();
        let rows = vec![CsvRow::new(1, &["KFC", "3"]), CsvRow::new(2, &["Broken"])];

        let err = Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ChainRow>(&rows)
            .unwrap_err();
        match err {
            ImportError::Row { line, source, .. } => {
                assert_eq!(line, 2);
                assert!(matches!(source, RowError::TooShort { expected: 2, found: 1 }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // the first row stays committed
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_skip_errors_continues() {
        let mut store = MemoryStore::new();
        let rows = vec![
            CsvRow::new(1, &["Broken"]),
            CsvRow::new(2, &["KFC", "3"]),
        ];
        let options = ImportOptions {
            skip_errors: true,
            ..ImportOptions::default()
        };

        let summary = Importer::new(&mut store, options)
            .import_rows::<ChainRow>(&rows)
            .unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.created, 1);
    }

    #[test]
    fn test_master_product_collapses_across_years() {
        let mut store = MemoryStore::new();
        let rows = vec![
            product_row(1, "101", "Big Mac", "2019", "7", ["01", "0100", "010000"]),
            product_row(2, "101", "Big Mac Burger", "2020", "7", ["01", "0100", "010000"]),
        ];

        let summary = Importer::new(&mut store, ImportOptions::default())
            .import_rows::<MasterProductRow>(&rows)
            .unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.updated, 1);

        let master = store.records().next().unwrap();
        assert_eq!(master.title, "Big Mac Burger");
        assert_eq!(
            master.text(master_product::FIELD_MASTER_PRODUCT_NAME),
            Some("Big Mac Burger")
        );
    }

    #[test]
    fn test_product_year_scoping() {
        let mut store = MemoryStore::new();
        let rows = vec![
            product_row(1, "101", "Big Mac", "2019", "7", ["", "", ""]),
            product_row(2, "101", "Big Mac", "2020", "7", ["", "", ""]),
            product_row(3, "101", "Big Mac", "2020", "7", ["", "", ""]),
        ];

        let summary = Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ProductRow>(&rows)
            .unwrap();
        assert_eq!(summary.created, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_product_classification_override() {
        let mut store = MemoryStore::new();
        let (group, major, minor) = seed_taxonomy(&mut store);
        let rows = vec![
            product_row(1, "1", "Nuggets", "2021", "", ["01", "0102", "010203"]),
            product_row(2, "2", "Wrap", "2021", "", ["01", "0102", "010200"]),
            product_row(3, "3", "Salad", "2021", "", ["01", "0100", "010000"]),
        ];

        Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ProductRow>(&rows)
            .unwrap();

        let food_group = |id: &str| {
            store
                .records()
                .find(|r| r.text(product::FIELD_PRODUCT_ID) == Some(id))
                .and_then(|r| r.reference(product::FIELD_FOOD_GROUP))
        };
        assert_eq!(food_group("1"), Some(minor));
        assert_eq!(food_group("2"), Some(major));
        assert_eq!(food_group("3"), Some(group));
    }

    #[test]
    fn test_product_resolves_chain_and_sets_attributes() {
        let mut store = MemoryStore::new();
        Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ChainRow>(&[CsvRow::new(1, &["McDonald's", "7"])])
            .unwrap();
        let chain_key = EntityKey(1);

        Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ProductRow>(&[product_row(1, "101", "Big Mac", "2021", "7", ["", "", ""])])
            .unwrap();

        let product = store
            .records()
            .find(|r| r.bundle == product::BUNDLE)
            .unwrap();
        assert_eq!(product.reference(product::FIELD_FAST_FOOD_CHAIN), Some(chain_key));
        assert_eq!(product.text("field_data_source"), Some("website"));
        assert_eq!(product.text("field_energy_kj_100g"), Some("0.5"));
        assert_eq!(product.text("field_mono_fat_g_serve"), Some("21.5"));
        assert_eq!(product.text("field_additional_notes"), Some("limited edition"));
        assert_eq!(product.flag(product::FIELD_ALL_INFORMATION), Some(true));
    }

    #[test]
    fn test_unknown_codes_clear_references_on_reimport() {
        let mut store = MemoryStore::new();
        let (_, _, minor) = seed_taxonomy(&mut store);
        Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ChainRow>(&[CsvRow::new(1, &["McDonald's", "7"])])
            .unwrap();
        let chain_key = store
            .records()
            .find(|r| r.bundle == chain::BUNDLE)
            .and_then(|r| r.key)
            .unwrap();

        Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ProductRow>(&[product_row(1, "101", "Big Mac", "2021", "7", ["01", "0102", "010203"])])
            .unwrap();
        let product = store.records().find(|r| r.bundle == product::BUNDLE).unwrap();
        assert_eq!(product.reference(product::FIELD_FAST_FOOD_CHAIN), Some(chain_key));
        assert_eq!(product.reference(product::FIELD_FOOD_GROUP), Some(minor));

        let summary = Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ProductRow>(&[product_row(1, "101", "Big Mac", "2021", "99", ["09", "0908", "090807"])])
            .unwrap();
        assert_eq!(summary.updated, 1);

        let product = store.records().find(|r| r.bundle == product::BUNDLE).unwrap();
        assert_eq!(product.reference(product::FIELD_FAST_FOOD_CHAIN), None);
        assert_eq!(product.reference(product::FIELD_FOOD_GROUP), None);
        assert_eq!(
            product.fields.get(product::FIELD_FAST_FOOD_CHAIN),
            Some(&FieldValue::Reference(None))
        );
        assert_eq!(
            product.fields.get(product::FIELD_FOOD_GROUP),
            Some(&FieldValue::Reference(None))
        );
    }

    #[test]
    fn test_reimport_is_idempotent() {
        let mut store = MemoryStore::new();
        seed_taxonomy(&mut store);
        let rows = vec![
            product_row(1, "1", "Nuggets", "2021", "", ["01", "0102", "010203"]),
            product_row(2, "2", "Wrap", "2021", "", ["01", "0102", "010200"]),
        ];

        let first = Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ProductRow>(&rows)
            .unwrap();
        let before: Vec<Record> = store.records().cloned().collect();
        let second = Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ProductRow>(&rows)
            .unwrap();

        assert_eq!(first.created, 2);
        assert_eq!(second.created, 0);
        assert_eq!(second.updated, 2);
        let after: Vec<Record> = store.records().cloned().collect();
        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(&after) {
            assert_eq!(b.fields, a.fields);
        }
    }

    #[test]
    fn test_food_group_terms_feed_resolver() {
        let mut store = MemoryStore::new();
        let terms = vec![
            CsvRow::new(1, &["Burgers", "01", "0100", "010000"]),
            CsvRow::new(2, &["Beef burgers", "01", "0102", "010200"]),
            CsvRow::new(3, &["Double beef", "01", "0102", "010203"]),
        ];
        let summary = Importer::new(&mut store, ImportOptions::default())
            .import_rows::<FoodGroupRow>(&terms)
            .unwrap();
        assert_eq!(summary.created, 3);

        Importer::new(&mut store, ImportOptions::default())
            .import_rows::<ProductRow>(&[product_row(1, "5", "Quarter Pounder", "2021", "", ["01", "0102", "010203"])])
            .unwrap();

        let product = store.records().find(|r| r.bundle == product::BUNDLE).unwrap();
        assert_eq!(product.reference(product::FIELD_FOOD_GROUP), Some(EntityKey(3)));
    }

    #[test]
    fn test_copy_master_products() {
        let mut store = MemoryStore::new();
        let (_, _, minor) = seed_taxonomy(&mut store);
        let rows = vec![
            product_row(1, "101", "Big Mac", "2019", "", ["01", "0102", "010203"]),
            product_row(2, "102", "Fries", "2019", "", ["", "", ""]),
        ];
        Importer::new(&mut store, ImportOptions::default())
            .import_rows::<MasterProductRow>(&rows)
            .unwrap();

        let summary = Importer::new(&mut store, ImportOptions::default())
            .copy_master_products("2022")
            .unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.created, 2);

        let copies: Vec<&Record> = store
            .records()
            .filter(|r| r.bundle == product::BUNDLE)
            .collect();
        assert_eq!(copies.len(), 2);
        assert_eq!(copies[0].title, "Big Mac");
        assert_eq!(copies[0].text(product::FIELD_YEAR), Some("2022"));
        assert_eq!(copies[0].text(product::FIELD_PRODUCT_ID), Some("101"));
        assert_eq!(copies[0].reference(product::FIELD_FOOD_GROUP), Some(minor));

        // copying again always creates
        let again = Importer::new(&mut store, ImportOptions::default())
            .copy_master_products("2022")
            .unwrap();
        assert_eq!(again.created, 2);
    }
}

//! Core module - reading, resolving, and storing imported entities

pub mod config;
pub mod csv_reader;
pub mod pipeline;
pub mod project;
pub mod resolver;
pub mod store;

pub use config::Config;
pub use csv_reader::{read_rows, CsvReadError, CsvRow};
pub use pipeline::{ImportError, ImportOptions, ImportRow, ImportSummary, Importer, Outcome};
pub use project::{Project, ProjectError};
pub use resolver::ReferenceResolver;
pub use store::{
    BundleCount, EntityKey, EntityStore, EntityType, FieldValue, MemoryStore, Query, Record,
    SqliteStore, StoreError,
};

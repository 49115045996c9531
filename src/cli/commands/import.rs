//! `nutri import` command - Import records from CSV files

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{open_session, print_summary};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{read_rows, CsvRow, ImportOptions, ImportRow, ImportSummary, Importer, SqliteStore};
use crate::entities::{ChainRow, FoodGroupRow, MasterProductRow, ProductRow};

/// The kinds of CSV file the importer understands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportKind {
    Chain,
    Master,
    Product,
    FoodGroups,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Chain => ChainRow::KIND,
            ImportKind::Master => MasterProductRow::KIND,
            ImportKind::Product => ProductRow::KIND,
            ImportKind::FoodGroups => FoodGroupRow::KIND,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Kind of file to import (chain, master, product, food-groups)
    #[arg(value_parser = parse_import_kind)]
    pub kind: ImportKind,

    /// CSV file to import
    pub file: PathBuf,

    /// Treat the first row as a header and skip it
    #[arg(long)]
    pub skip_header: bool,

    /// Continue importing after malformed rows (default: stop on first error)
    #[arg(long)]
    pub skip_errors: bool,
}

fn parse_import_kind(s: &str) -> Result<ImportKind, String> {
    match s.to_lowercase().as_str() {
        "chain" | "chains" => Ok(ImportKind::Chain),
        "master" | "masters" => Ok(ImportKind::Master),
        "product" | "products" => Ok(ImportKind::Product),
        "food-groups" | "food-group" | "fg" => Ok(ImportKind::FoodGroups),
        _ => Err(format!(
            "Unsupported import kind: '{}'. Supported: chain, master, product, food-groups",
            s
        )),
    }
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    // A missing file must fail before the store is created or opened
    let rows = read_rows(&args.file)?;

    let mut session = open_session(global)?;
    let options = ImportOptions {
        skip_header: args.skip_header || session.config.skip_header(),
        skip_errors: args.skip_errors,
        owner: session.config.owner(),
    };

    if !global.quiet && global.format != OutputFormat::Json {
        println!(
            "{} Importing {} from {}",
            style("→").blue(),
            style(args.kind.as_str()).cyan(),
            style(args.file.display()).yellow()
        );
    }

    let summary = match args.kind {
        ImportKind::Chain => import_as::<ChainRow>(&mut session.store, &rows, options)?,
        ImportKind::Master => import_as::<MasterProductRow>(&mut session.store, &rows, options)?,
        ImportKind::Product => import_as::<ProductRow>(&mut session.store, &rows, options)?,
        ImportKind::FoodGroups => import_as::<FoodGroupRow>(&mut session.store, &rows, options)?,
    };

    report(&summary, "Import Summary", global)
}

fn import_as<T: ImportRow>(
    store: &mut SqliteStore,
    rows: &[CsvRow],
    options: ImportOptions,
) -> Result<ImportSummary> {
    let summary = Importer::new(store, options).import_rows::<T>(rows)?;
    Ok(summary)
}

/// Print a summary as JSON or as the styled block
pub(crate) fn report(summary: &ImportSummary, title: &str, global: &GlobalOpts) -> Result<()> {
    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary).into_diagnostic()?);
        }
        _ if global.quiet => {}
        _ => print_summary(title, summary),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_kind() {
        assert_eq!(parse_import_kind("chain"), Ok(ImportKind::Chain));
        assert_eq!(parse_import_kind("Master"), Ok(ImportKind::Master));
        assert_eq!(parse_import_kind("products"), Ok(ImportKind::Product));
        assert_eq!(parse_import_kind("food-groups"), Ok(ImportKind::FoodGroups));
        assert!(parse_import_kind("recipe").is_err());
    }

    #[test]
    fn test_kind_names_match_rows() {
        assert_eq!(ImportKind::Chain.as_str(), "chain");
        assert_eq!(ImportKind::FoodGroups.as_str(), "food-groups");
    }
}

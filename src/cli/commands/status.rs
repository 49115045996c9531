//! `nutri status` command - Record counts in the entity store

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::open_session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{BundleCount, EntityStore};

#[derive(clap::Args, Debug)]
pub struct StatusArgs {}

pub fn run(_args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let counts = session.store.counts()?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&counts).into_diagnostic()?);
        }
        OutputFormat::Csv | OutputFormat::Tsv => {
            let delimiter = if global.format == OutputFormat::Tsv { b'\t' } else { b',' };
            write_counts(std::io::stdout(), &counts, delimiter)?;
        }
        OutputFormat::Md | OutputFormat::Auto => {
            if counts.is_empty() {
                println!("{}", style("The store is empty.").dim());
                return Ok(());
            }
            let mut table = counts_table(&counts);
            if global.format == OutputFormat::Md {
                table.with(Style::markdown());
            } else {
                table.with(Style::rounded());
            }
            println!("{}", style("Entity Store").bold());
            if let Some(path) = session.store.path() {
                println!("{}", style(path.display()).dim());
            }
            println!("{}", table);
        }
    }
    Ok(())
}

/// Write counts as delimited text with a header row
fn write_counts<W: std::io::Write>(out: W, counts: &[BundleCount], delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(out);
    wtr.write_record(["type", "bundle", "published", "total"])
        .into_diagnostic()?;
    for c in counts {
        wtr.write_record([
            c.entity_type.to_string(),
            c.bundle.clone(),
            c.published.to_string(),
            c.total.to_string(),
        ])
        .into_diagnostic()?;
    }
    wtr.flush().into_diagnostic()?;
    Ok(())
}

fn counts_table(counts: &[BundleCount]) -> tabled::Table {
    let mut builder = Builder::default();
    builder.push_record(["TYPE", "BUNDLE", "PUBLISHED", "TOTAL"]);
    for c in counts {
        builder.push_record([
            c.entity_type.to_string(),
            c.bundle.clone(),
            c.published.to_string(),
            c.total.to_string(),
        ]);
    }
    builder.build()
}

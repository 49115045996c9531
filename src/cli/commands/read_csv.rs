//! `nutri read-csv` command - Display the rows of a CSV file

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{load_config, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::csv_reader::{read_rows, CsvRow};

/// Longest cell shown in table output
const MAX_CELL_WIDTH: usize = 30;

#[derive(clap::Args, Debug)]
pub struct ReadCsvArgs {
    /// CSV file to read
    pub file: PathBuf,

    /// Do not display the first row
    #[arg(long)]
    pub skip_header: bool,
}

pub fn run(args: ReadCsvArgs, global: &GlobalOpts) -> Result<()> {
    let rows = read_rows(&args.file)?;
    let skip_header = args.skip_header || load_config(global).skip_header();
    let rows = if skip_header {
        rows.get(1..).unwrap_or_default()
    } else {
        &rows[..]
    };

    match global.format {
        OutputFormat::Json => {
            let values: Vec<Vec<&str>> = rows.iter().map(|r| r.fields.iter().collect()).collect();
            println!("{}", serde_json::to_string_pretty(&values).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(std::io::stdout());
            for row in rows {
                wtr.write_record(&row.fields).into_diagnostic()?;
            }
            wtr.flush().into_diagnostic()?;
        }
        OutputFormat::Tsv => {
            for row in rows {
                println!("{}", row.fields.iter().collect::<Vec<_>>().join("\t"));
            }
        }
        OutputFormat::Md => println!("{}", render_table(rows).with(Style::markdown())),
        OutputFormat::Auto => println!("{}", render_table(rows).with(Style::rounded())),
    }

    if !global.quiet {
        eprintln!(
            "{} {} row(s) read from {}",
            style("→").blue(),
            style(rows.len()).cyan(),
            style(args.file.display()).yellow()
        );
    }
    Ok(())
}

/// Build a table with a leading line-number column, padding ragged rows
fn render_table(rows: &[CsvRow]) -> tabled::Table {
    let width = rows.iter().map(CsvRow::len).max().unwrap_or(0);

    let mut builder = Builder::default();
    let mut header = vec!["line".to_string()];
    header.extend((0..width).map(|i| i.to_string()));
    builder.push_record(header);

    for row in rows {
        let mut record = vec![row.line.to_string()];
        record.extend((0..width).map(|i| truncate_str(row.get(i).unwrap_or(""), MAX_CELL_WIDTH)));
        builder.push_record(record);
    }

    builder.build()
}

//! `nutri copy-master` command - Seed a year's products from master products

use console::style;
use miette::Result;

use crate::cli::commands::import::report;
use crate::cli::helpers::open_session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{ImportOptions, Importer};

#[derive(clap::Args, Debug)]
pub struct CopyMasterArgs {
    /// Year stamped on every copied product
    pub year: u16,
}

pub fn run(args: CopyMasterArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let options = ImportOptions {
        owner: session.config.owner(),
        ..ImportOptions::default()
    };

    if !global.quiet && global.format != OutputFormat::Json {
        println!(
            "{} Copying master products into {}",
            style("→").blue(),
            style(args.year).cyan()
        );
    }

    let year = args.year.to_string();
    let summary = Importer::new(&mut session.store, options).copy_master_products(&year)?;

    report(&summary, "Copy Summary", global)
}

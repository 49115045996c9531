//! `nutri init` command - Initialize a new nutri project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::{Project, ProjectError};
use crate::core::SqliteStore;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .nutri/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            // Creates the schema so later commands find a valid store
            SqliteStore::open(&project.store_path())?;

            println!(
                "{} Initialized nutri project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Next steps:");
            println!(
                "  {} Load food groups and categories",
                style("nutri import food-groups groups.csv").yellow()
            );
            println!(
                "  {} Load fast-food chains",
                style("nutri import chain chains.csv").yellow()
            );
            println!(
                "  {} Load yearly products",
                style("nutri import product products-2021.csv").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} nutri project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!("Use {} to reinitialize", style("--force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

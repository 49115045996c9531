//! Shared helper functions for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::{Config, ImportSummary, Project, SqliteStore};

/// Store and settings for one command invocation
pub struct Session {
    pub config: Config,
    pub store: SqliteStore,
}

/// Locate the project (if any), load config, and open the store
///
/// `--store` works without a project; otherwise the project is found from
/// `--project` or the current directory.
pub fn open_session(global: &GlobalOpts) -> Result<Session> {
    let project = match &global.project {
        Some(path) => Some(Project::discover_from(path).map_err(|e| miette::miette!("{}", e))?),
        None => Project::discover().ok(),
    };

    let config = Config::load(project.as_ref());
    let store_path = match global.store.clone() {
        Some(path) => path,
        None => match config.store_path(project.as_ref()) {
            Some(path) => path,
            None => {
                let cwd = std::env::current_dir().into_diagnostic()?;
                return Err(miette::miette!(
                    "{}",
                    crate::core::ProjectError::NotFound { searched_from: cwd }
                ));
            }
        },
    };

    let store = SqliteStore::open(&store_path)?;
    Ok(Session { config, store })
}

/// Load config for commands that do not need the store
pub fn load_config(global: &GlobalOpts) -> Config {
    let project = match &global.project {
        Some(path) => Project::discover_from(path).ok(),
        None => Project::discover().ok(),
    };
    Config::load(project.as_ref())
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print the counts of an import or copy run
pub fn print_summary(title: &str, summary: &ImportSummary) {
    println!();
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style(title).bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Rows processed:   {}", style(summary.processed).cyan());
    println!("  Records created:  {}", style(summary.created).green());
    println!("  Records updated:  {}", style(summary.updated).yellow());
    if summary.skipped > 0 {
        println!("  Skipped:          {}", style(summary.skipped).dim());
    }
    if summary.errors > 0 {
        println!("  Errors:           {}", style(summary.errors).red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Big Mac", 10), "Big Mac");
        assert_eq!(truncate_str("Quarter Pounder with Cheese", 10), "Quarter...");
        assert_eq!(truncate_str("Crème brûlée pie", 8), "Crème...");
    }
}

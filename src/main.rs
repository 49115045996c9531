use clap::Parser;
use miette::Result;
use nutri::cli::{init_logging, Cli, Commands};

fn main() -> Result<()> {
    // Terminate silently on a closed pipe (`nutri read-csv x.csv | head`)
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        Commands::Init(args) => nutri::cli::commands::init::run(args),
        Commands::Hello(args) => nutri::cli::commands::hello::run(args),
        Commands::ReadCsv(args) => nutri::cli::commands::read_csv::run(args, &global),
        Commands::Import(args) => nutri::cli::commands::import::run(args, &global),
        Commands::CopyMaster(args) => nutri::cli::commands::copy_master::run(args, &global),
        Commands::Status(args) => nutri::cli::commands::status::run(args, &global),
        Commands::Completions(args) => nutri::cli::commands::completions::run(args),
    }
}

mod admin;
mod cli;
mod delivery;
mod error;
mod fmt;
mod models;
mod report;
mod settings;
mod workbook;

use clap::{CommandFactory, Parser};

use cli::report::Target;
use cli::{AdminCommands, Cli, Commands, ReportCommands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Admin { command } => match command {
            AdminCommands::Access => cli::admin::access(),
            AdminCommands::ResetPassword => cli::admin::reset_password(),
        },
        Commands::Report { command } => match command {
            ReportCommands::Sheet {
                workbook,
                sheet,
                out,
            } => cli::report::run(Target::Sheet, &workbook, sheet, out),
            ReportCommands::Draft {
                workbook,
                sheet,
                out,
            } => cli::report::run(Target::Draft, &workbook, sheet, out),
            ReportCommands::Preview { workbook, sheet } => {
                cli::report::run(Target::Preview, &workbook, sheet, None)
            }
        },
        Commands::Sheets { workbook } => cli::sheets::run(&workbook),
        Commands::Status => cli::status::run(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "monthly-report", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

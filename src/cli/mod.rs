pub mod admin;
pub mod init;
pub mod prompt;
pub mod report;
pub mod sheets;
pub mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "monthly-report",
    about = "Comparative monthly budget reports from a budget sheet."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write default settings and create the data directory.
    Init {
        /// Path for report data such as drafts (default: ~/Documents/monthly-report)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Admin access and password management.
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Generate the monthly comparative report (requires the admin password).
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// List the sheets of a workbook.
    Sheets {
        /// CSV file, directory of CSV sheets, or XLSX workbook
        workbook: String,
    },
    /// Show settings and whether an admin password is configured.
    Status,
    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Check the admin password and list admin commands.
    Access,
    /// Set a new admin password (the current one is required if set).
    ResetPassword,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Write the report into a report sheet next to the workbook.
    Sheet {
        /// CSV file, directory of CSV sheets, or XLSX workbook
        workbook: String,
        /// Budget sheet name (default from settings: "Monthly Budget")
        #[arg(long)]
        sheet: Option<String>,
        /// Output directory for the report sheet
        #[arg(long)]
        out: Option<String>,
    },
    /// Save the report as an unsent email draft (.eml).
    Draft {
        workbook: String,
        #[arg(long)]
        sheet: Option<String>,
        /// Output directory (default: <data_dir>/drafts)
        #[arg(long)]
        out: Option<String>,
    },
    /// Print the report to stdout.
    Preview {
        workbook: String,
        #[arg(long)]
        sheet: Option<String>,
    },
}

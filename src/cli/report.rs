use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::cli::admin::require_access;
use crate::delivery::Delivery;
use crate::error::{ReportError, Result};
use crate::report::build_report;
use crate::settings::{get_data_dir, load_settings, shellexpand_path};
use crate::workbook::Workbook;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Sheet,
    Draft,
    Preview,
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

pub fn run(target: Target, workbook: &str, sheet: Option<String>, out: Option<String>) -> Result<()> {
    let settings = load_settings();
    let mut config = settings.report.clone();
    if let Some(name) = sheet {
        config.sheet_name = name;
    }
    let layout = config.validate()?;

    if !require_access(&settings)? {
        return Ok(());
    }

    let workbook = Workbook::open(Path::new(workbook))?;
    let delivery = match target {
        Target::Sheet => Some(Delivery::Sheet {
            dir: out
                .map(|o| PathBuf::from(shellexpand_path(&o)))
                .unwrap_or_else(|| workbook.output_dir()),
        }),
        Target::Draft => Some(Delivery::Draft {
            dir: out
                .map(|o| PathBuf::from(shellexpand_path(&o)))
                .unwrap_or_else(|| get_data_dir().join("drafts")),
        }),
        Target::Preview => None,
    };
    if let Some(d) = &delivery {
        log::info!(
            "Report generation STARTED ({} format) by user: {}",
            d.format_name(),
            current_user()
        );
    }

    let rows = match workbook.read_sheet(&config.sheet_name, &layout) {
        Err(ReportError::SheetNotFound(name)) => {
            log::info!("Report generation FAILED: \"{name}\" sheet not found");
            return Err(ReportError::SheetNotFound(name));
        }
        other => other?,
    };
    let report = build_report(&rows, &config);

    let Some(delivery) = delivery else {
        println!("{report}");
        return Ok(());
    };
    let path = delivery.deliver(&report, &config, chrono::Local::now())?;
    log::info!(
        "Report generation COMPLETED successfully in {} format",
        delivery.format_name().to_lowercase()
    );

    let done = "Success!".green().bold();
    match delivery {
        Delivery::Sheet { .. } => println!(
            "{done} Report created in the \"{}\" sheet ({}).",
            config.report_sheet_name,
            path.display()
        ),
        Delivery::Draft { .. } => println!(
            "{done} A draft email with the report has been created at {}.",
            path.display()
        ),
    }
    Ok(())
}

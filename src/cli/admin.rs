use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::admin::{authenticate, change_password, open_secret_store, AccessOutcome, PasswordChange};
use crate::cli::prompt::TerminalPrompt;
use crate::error::Result;
use crate::settings::{load_settings, Settings};

const ADMIN_COMMANDS: &[(&str, &str)] = &[
    ("report sheet <WORKBOOK>", "Generate Monthly Report (In Sheet)"),
    ("report draft <WORKBOOK>", "Generate Monthly Report (In E-mail)"),
    ("report preview <WORKBOOK>", "Print the report"),
    ("admin reset-password", "Reset Password"),
];

/// Ask for the admin password. Prints the reason and returns false unless access is granted.
pub(crate) fn require_access(settings: &Settings) -> Result<bool> {
    let store = open_secret_store(settings)?;
    match authenticate(store.as_ref(), &mut TerminalPrompt)? {
        AccessOutcome::Granted => Ok(true),
        other => {
            eprintln!("{}", other.message().yellow());
            Ok(false)
        }
    }
}

pub fn access() -> Result<()> {
    let settings = load_settings();
    if !require_access(&settings)? {
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Command", "Action"]);
    for (command, action) in ADMIN_COMMANDS {
        table.add_row(vec![
            Cell::new(format!("monthly-report {command}")),
            Cell::new(action),
        ]);
    }
    println!("{}\n{table}", "Access Granted".green().bold());
    Ok(())
}

pub fn reset_password() -> Result<()> {
    let settings = load_settings();
    let mut store = open_secret_store(&settings)?;
    let change = change_password(store.as_mut(), &mut TerminalPrompt)?;
    match change {
        PasswordChange::Updated => println!("{}", change.message().green()),
        PasswordChange::Rejected => eprintln!("{}", change.message().red()),
        PasswordChange::Cancelled => eprintln!("{}", change.message().yellow()),
    }
    Ok(())
}

use crate::admin::{open_secret_store, FileSecretStore, ADMIN_PASSWORD_KEY};
use crate::error::Result;
use crate::settings::{config_dir, load_settings, SecretBackend};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let report = &settings.report;

    println!("Config dir:   {}", config_dir().display());
    println!("Data dir:     {}", settings.data_dir);
    match settings.secret_backend {
        SecretBackend::File => {
            let store = FileSecretStore::new(FileSecretStore::default_path());
            println!("Secrets:      file ({})", store.path().display());
        }
        SecretBackend::Keyring => println!("Secrets:      keyring"),
    }

    let configured = open_secret_store(&settings)?
        .get(ADMIN_PASSWORD_KEY)?
        .is_some_and(|p| !p.is_empty());
    println!("Admin password: {}", if configured { "set" } else { "(not set)" });

    println!();
    println!("Budget sheet: {}", report.sheet_name);
    println!("Data range:   {}", report.data_range);
    println!("Threshold:    {:.0}%", report.deviation_threshold * 100.0);
    println!("Report sheet: {} (cell {})", report.report_sheet_name, report.report_cell);
    Ok(())
}

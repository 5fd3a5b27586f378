//! Shared-password gate for admin commands.
//!
//! The password is compared verbatim against a single stored value. There is no
//! hashing, lockout or attempt logging; the store only keeps casual users out of
//! the report commands.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::error::{ReportError, Result};
use crate::settings::{config_dir, SecretBackend, Settings};

pub const ADMIN_PASSWORD_KEY: &str = "ADMIN_PASSWORD";

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Named string values kept outside the settings file.
pub trait SecretStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Asks the user for a secret. `Ok(None)` means they backed out.
pub trait Prompt {
    fn ask(&mut self, title: &str, message: &str) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    Granted,
    Denied,
    NotConfigured,
    Cancelled,
}

impl AccessOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Granted => "Access granted.",
            Self::Denied => "Incorrect administrator code.",
            Self::NotConfigured => "The administrator password has not been set. Please contact the spreadsheet owner to run the setup.",
            Self::Cancelled => "Action cancelled.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordChange {
    Updated,
    Rejected,
    Cancelled,
}

impl PasswordChange {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Updated => "The administrator password has been set securely.",
            Self::Rejected => "Incorrect current password. Password change aborted.",
            Self::Cancelled => "Action cancelled.",
        }
    }
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

/// An empty stored value is treated the same as none at all.
fn stored_password(store: &dyn SecretStore) -> Result<Option<Zeroizing<String>>> {
    Ok(store
        .get(ADMIN_PASSWORD_KEY)?
        .filter(|p| !p.is_empty())
        .map(Zeroizing::new))
}

pub fn authenticate(store: &dyn SecretStore, prompt: &mut dyn Prompt) -> Result<AccessOutcome> {
    let Some(stored) = stored_password(store)? else {
        return Ok(AccessOutcome::NotConfigured);
    };
    let Some(entered) = prompt.ask("Restricted Access", "Please enter the administrator code:")?
    else {
        return Ok(AccessOutcome::Cancelled);
    };
    let entered = Zeroizing::new(entered);
    if *entered == *stored {
        Ok(AccessOutcome::Granted)
    } else {
        Ok(AccessOutcome::Denied)
    }
}

/// Set a new admin password. An existing password must be entered first.
pub fn change_password(store: &mut dyn SecretStore, prompt: &mut dyn Prompt) -> Result<PasswordChange> {
    if let Some(current) = stored_password(store)? {
        let Some(entered) = prompt.ask(
            "Security Check",
            "To set a new password, please enter the current admin password:",
        )?
        else {
            return Ok(PasswordChange::Cancelled);
        };
        if *Zeroizing::new(entered) != *current {
            return Ok(PasswordChange::Rejected);
        }
    }

    let new_password = prompt
        .ask("Security Configuration", "Enter the new administrator password:")?
        .map(Zeroizing::new);
    match new_password {
        Some(p) if !p.is_empty() => {
            store.set(ADMIN_PASSWORD_KEY, &p)?;
            Ok(PasswordChange::Updated)
        }
        _ => Ok(PasswordChange::Cancelled),
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Flat JSON object of string properties on disk.
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        config_dir().join("properties.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut props = self.load()?;
        props.insert(key.to_string(), value.to_string());
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&props)?;
        write_private(&self.path, &format!("{json}\n"))
    }
}

/// Write a file only its owner can read. A new file is created 0600 and an
/// existing one is narrowed before anything is written to it.
fn write_private(path: &Path, contents: &str) -> Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents.as_bytes())?;
    Ok(())
}

/// OS keychain entries under the `monthly-report` service.
#[cfg(feature = "keyring")]
pub struct KeyringSecretStore {
    service: String,
}

#[cfg(feature = "keyring")]
impl KeyringSecretStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, key).map_err(|e| ReportError::SecretStore(e.to_string()))
    }
}

#[cfg(feature = "keyring")]
impl SecretStore for KeyringSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ReportError::SecretStore(e.to_string())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| ReportError::SecretStore(e.to_string()))
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    values: BTreeMap<String, String>,
}

#[cfg(test)]
impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn open_secret_store(settings: &Settings) -> Result<Box<dyn SecretStore>> {
    match settings.secret_backend {
        SecretBackend::File => Ok(Box::new(FileSecretStore::new(FileSecretStore::default_path()))),
        #[cfg(all(
            feature = "keyring",
            any(target_os = "macos", target_os = "ios", target_os = "windows", target_os = "linux")
        ))]
        SecretBackend::Keyring => Ok(Box::new(KeyringSecretStore::new("monthly-report"))),
        // keyring falls back to a mock store that forgets everything on these targets.
        #[cfg(all(
            feature = "keyring",
            not(any(target_os = "macos", target_os = "ios", target_os = "windows", target_os = "linux"))
        ))]
        SecretBackend::Keyring => Err(ReportError::SecretStore(
            "no OS keychain on this platform; set secret_backend to \"file\"".to_string(),
        )),
        #[cfg(not(feature = "keyring"))]
        SecretBackend::Keyring => Err(ReportError::SecretStore(
            "built without keyring support; set secret_backend to \"file\"".to_string(),
        )),
    }
}

//! System keyring locker via `secret-tool` (libsecret Secret Service API)
//!
//! Entries are stored with three attributes: `application`, `resource` and
//! `username`. Listing uses `secret-tool search --all`, which prints every
//! item's secret. Its output is parsed in place and zeroized afterwards;
//! `secret = ` lines are skipped before decoding so listed entries never
//! carry secrets.

use std::io::Write;
use std::process::{Command, Stdio};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{SecretError, SecretResult};

use super::backend::{CredentialLocker, VaultEntry};
use super::sealed::SealedSecret;

/// Application identifier used as the `application` attribute in keyring entries
const APP_ID: &str = "keywarden";

/// Checks whether `secret-tool` binary is available on the system.
pub fn is_secret_tool_available() -> bool {
    Command::new("secret-tool")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// [`CredentialLocker`] backed by the Secret Service through `secret-tool`
#[derive(Debug, Clone)]
pub struct SecretToolLocker {
    application: String,
}

impl Default for SecretToolLocker {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretToolLocker {
    /// Creates a locker using the default application attribute
    #[must_use]
    pub fn new() -> Self {
        Self::with_application(APP_ID)
    }

    /// Creates a locker scoped to a custom application attribute
    #[must_use]
    pub fn with_application(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
        }
    }

    fn key_args<'a>(&'a self, resource: &'a str, username: &'a str) -> [&'a str; 6] {
        [
            "application",
            &self.application,
            "resource",
            resource,
            "username",
            username,
        ]
    }

    fn run(args: &[&str]) -> SecretResult<std::process::Output> {
        Command::new("secret-tool")
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SecretError::LibSecret(format!("Failed to run secret-tool: {e}")))
    }
}

/// Prefix of the line carrying an item's secret
const SECRET_LINE: &[u8] = b"secret = ";

/// Parses raw `secret-tool search` output into entries
///
/// Each item starts with a `[/path]` line followed by `key = value` lines.
/// Items missing the `resource` or `username` attribute are skipped, as are
/// lines that are not valid UTF-8. Secret lines are never decoded.
#[must_use]
pub fn parse_search_output(output: &[u8]) -> Vec<VaultEntry> {
    fn flush(
        resource: &mut Option<String>,
        username: &mut Option<String>,
        entries: &mut Vec<VaultEntry>,
    ) {
        if let (Some(r), Some(u)) = (resource.take(), username.take()) {
            entries.push(VaultEntry::new(r, u));
        }
    }

    let mut entries = Vec::new();
    let mut resource = None;
    let mut username = None;

    for raw in output.split(|&b| b == b'\n') {
        let raw = raw.trim_ascii();
        if raw.starts_with(SECRET_LINE) {
            continue;
        }
        let Ok(line) = std::str::from_utf8(raw) else {
            continue;
        };
        if line.starts_with('[') && line.ends_with(']') {
            flush(&mut resource, &mut username, &mut entries);
            continue;
        }
        let Some((key, value)) = line.split_once(" = ") else {
            continue;
        };
        match key {
            "attribute.resource" => resource = Some(value.to_string()),
            "attribute.username" => username = Some(value.to_string()),
            _ => {}
        }
    }
    flush(&mut resource, &mut username, &mut entries);

    entries
}

impl CredentialLocker for SecretToolLocker {
    fn backend_id(&self) -> &'static str {
        "secret-tool"
    }

    fn retrieve_all(&self) -> SecretResult<Vec<VaultEntry>> {
        if !is_secret_tool_available() {
            return Err(SecretError::BackendUnavailable(
                "secret-tool not found. Install libsecret-tools.".into(),
            ));
        }

        let output = Self::run(&["search", "--all", "application", &self.application])?;
        let stdout = Zeroizing::new(output.stdout);

        // No matching items is reported as a failure with empty output
        if !output.status.success() && stdout.is_empty() {
            return Ok(Vec::new());
        }

        let entries = parse_search_output(&stdout);
        debug!(count = entries.len(), "Listed keyring entries");
        Ok(entries)
    }

    fn add(&self, resource: &str, username: &str, secret: &SecretString) -> SecretResult<()> {
        let label = format!("Keywarden: {resource}");
        let mut args = vec!["store", "--label", &label];
        args.extend(self.key_args(resource, username));

        let mut child = Command::new("secret-tool")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SecretError::LibSecret(format!("Failed to spawn secret-tool: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(secret.expose_secret().as_bytes())
                .map_err(|e| SecretError::LibSecret(format!("Failed to write secret: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| SecretError::LibSecret(format!("Failed to wait for secret-tool: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SecretError::StoreFailed(format!(
                "secret-tool store failed: {stderr}"
            )));
        }

        Ok(())
    }

    fn retrieve_password(&self, entry: &mut VaultEntry) -> SecretResult<()> {
        let mut args = vec!["lookup"];
        args.extend(self.key_args(entry.resource(), entry.username()));
        let output = Self::run(&args)?;
        let stdout = Zeroizing::new(output.stdout);

        if !output.status.success() {
            return Err(SecretError::RetrieveFailed(
                "secret-tool lookup found no matching item".to_string(),
            ));
        }

        let value = std::str::from_utf8(&stdout)
            .map_err(|_| SecretError::RetrieveFailed("Saved secret is not UTF-8".to_string()))?
            .trim_end_matches('\n');
        *entry.secret_mut() = SealedSecret::new(SecretString::from(value.to_string()));
        Ok(())
    }

    fn remove(&self, entry: &VaultEntry) -> SecretResult<()> {
        let mut args = vec!["clear"];
        args.extend(self.key_args(entry.resource(), entry.username()));
        let output = Self::run(&args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SecretError::DeleteFailed(format!(
                "secret-tool clear failed: {stderr}"
            )));
        }

        Ok(())
    }
}

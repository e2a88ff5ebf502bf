//! Native library path configuration and helper binary resolution.
//!
//! The device-communication helpers load shared libraries that ship with the
//! application bundle rather than being installed system-wide. This module
//! points the platform loader at the bundled directory and resolves the
//! helper binaries themselves, sidecar-first.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;
use tauri::AppHandle;
use tauri_plugin_shell::process::Command;
use tauri_plugin_shell::ShellExt;

#[cfg(target_os = "windows")]
const LOADER_VAR: &str = "PATH";
#[cfg(target_os = "macos")]
const LOADER_VAR: &str = "DYLD_FALLBACK_LIBRARY_PATH";
#[cfg(all(unix, not(target_os = "macos")))]
const LOADER_VAR: &str = "LD_LIBRARY_PATH";

#[cfg(target_os = "windows")]
const PATH_SEP: char = ';';
#[cfg(not(target_os = "windows"))]
const PATH_SEP: char = ':';

pub enum Helper {
    Tsschecker,
    IdeviceInfo,
}

impl Helper {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tsschecker => "tsschecker",
            Self::IdeviceInfo => "ideviceinfo",
        }
    }
}

/// Resolves the best command to use for a given helper.
/// Checks for a bundled sidecar first, then falls back to the system PATH.
pub fn resolve_helper(app: &AppHandle, helper: Helper) -> Command {
    match app.shell().sidecar(helper.name()) {
        Ok(cmd) => cmd,
        Err(_) => app.shell().command(helper.name()),
    }
}

/// Checks if a helper is available (either as sidecar or in the system path).
pub fn helper_available(app: &AppHandle, helper: Helper) -> bool {
    if app.shell().sidecar(helper.name()).is_ok() {
        return true;
    }

    StdCommand::new(helper.name())
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Prepends the bundled library directory to the platform loader variable so
/// spawned helpers inherit it. Must run before anything spawns a helper.
///
/// A missing directory is logged but not fatal; system-installed libraries
/// may still cover the helpers.
pub fn configure_library_path() {
    let exe = match env::current_exe() {
        Ok(p) => p,
        Err(e) => {
            log::warn!("could not resolve the executable path: {e}");
            return;
        }
    };

    let Some(dir) = platform_lib_dir(&exe) else {
        log::warn!("executable has no parent directory, skipping library path setup");
        return;
    };

    if !dir.exists() {
        log::warn!("bundled library directory not found at {}", dir.display());
        return;
    }

    let merged = prepend_entry(
        &dir.to_string_lossy(),
        env::var(LOADER_VAR).ok().as_deref(),
        PATH_SEP,
    );
    env::set_var(LOADER_VAR, &merged);
    log::info!("native library path: {}", dir.display());
}

/// Bundled library directory for the platform, relative to the executable:
/// `Contents/Frameworks/` inside a macOS app bundle, `lib/` next to the
/// executable elsewhere. Dev builds get `target/<profile>/lib/` for free from
/// the non-macOS arm.
pub fn platform_lib_dir(exe: &Path) -> Option<PathBuf> {
    let exe_dir = exe.parent()?;
    if cfg!(target_os = "macos") {
        // <App>.app/Contents/MacOS/<exe> -> <App>.app/Contents/Frameworks
        exe_dir.parent().map(|contents| contents.join("Frameworks"))
    } else {
        Some(exe_dir.join("lib"))
    }
}

fn prepend_entry(dir: &str, existing: Option<&str>, sep: char) -> String {
    match existing {
        Some(rest) if !rest.is_empty() => format!("{dir}{sep}{rest}"),
        _ => dir.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_lib_dir_shape() {
        let exe = Path::new("/opt/blobsaver/blobsaver");
        let dir = platform_lib_dir(exe).unwrap();
        if cfg!(target_os = "macos") {
            assert!(dir.ends_with("Frameworks"));
        } else {
            assert!(dir.ends_with("lib"));
            assert!(dir.starts_with("/opt/blobsaver"));
        }
    }

    #[test]
    fn test_platform_lib_dir_bare_exe() {
        // A path with no parent directory cannot be anchored.
        assert!(platform_lib_dir(Path::new("/")).is_none());
    }

    #[test]
    fn test_prepend_keeps_existing_entries() {
        assert_eq!(
            prepend_entry("/bundle/lib", Some("/usr/lib:/lib"), ':'),
            "/bundle/lib:/usr/lib:/lib"
        );
        assert_eq!(
            prepend_entry("C:\\app\\lib", Some("C:\\Windows"), ';'),
            "C:\\app\\lib;C:\\Windows"
        );
    }

    #[test]
    fn test_prepend_with_empty_or_missing_existing() {
        assert_eq!(prepend_entry("/bundle/lib", None, ':'), "/bundle/lib");
        assert_eq!(prepend_entry("/bundle/lib", Some(""), ':'), "/bundle/lib");
    }

    #[test]
    fn test_helper_names() {
        assert_eq!(Helper::Tsschecker.name(), "tsschecker");
        assert_eq!(Helper::IdeviceInfo.name(), "ideviceinfo");
    }
}

//! Startup update check against the GitHub releases feed.

use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Emitter};
use tauri_plugin_notification::NotificationExt;

use crate::error::LaunchError;

const LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/airsquared/blobsaver/releases/latest";

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    html_url: String,
}

/// Outcome of an update check, also the payload of the `update-available`
/// event.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateStatus {
    pub update_available: bool,
    pub current: String,
    pub latest: String,
    pub url: String,
}

/// Compares the running version against the latest published release.
///
/// A newer release raises the `update-available` event and a notification.
/// When nothing is newer, a forced check logs the result and the caller gets
/// the status back; the automatic startup check stays silent.
pub async fn check(app: &AppHandle, forced: bool) -> Result<UpdateStatus, LaunchError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("blobsaver/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let release: Release = client
        .get(LATEST_RELEASE_URL)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let current = env!("CARGO_PKG_VERSION");
    let status = UpdateStatus {
        update_available: is_newer(current, &release.tag_name),
        current: current.to_string(),
        latest: release.tag_name,
        url: release.html_url,
    };

    if status.update_available {
        log::info!("update available: {} -> {}", status.current, status.latest);
        let _ = app.emit("update-available", &status);
        let _ = app
            .notification()
            .builder()
            .title("blobsaver")
            .body(format!("blobsaver {} is available", status.latest))
            .show();
    } else if forced {
        log::info!("blobsaver is up to date ({current})");
    }

    Ok(status)
}

/// Numeric dotted-component comparison, tolerant of a leading `v` and of
/// trailing non-digit suffixes. Missing components count as zero.
fn is_newer(current: &str, candidate: &str) -> bool {
    let candidate = parse_components(candidate);
    let current = parse_components(current);
    let len = candidate.len().max(current.len());
    for i in 0..len {
        let theirs = candidate.get(i).copied().unwrap_or(0);
        let ours = current.get(i).copied().unwrap_or(0);
        if theirs != ours {
            return theirs > ours;
        }
    }
    false
}

fn parse_components(version: &str) -> Vec<u64> {
    version
        .trim()
        .trim_start_matches(['v', 'V'])
        .split('.')
        .map(|part| {
            part.chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
                .parse()
                .unwrap_or(0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_patch_and_minor() {
        assert!(is_newer("2.5.5", "2.5.6"));
        assert!(is_newer("2.5.5", "2.6.0"));
        assert!(is_newer("2.5.5", "3.0.0"));
    }

    #[test]
    fn test_equal_and_older_are_not_newer() {
        assert!(!is_newer("2.5.5", "2.5.5"));
        assert!(!is_newer("2.5.5", "2.5.4"));
        assert!(!is_newer("3.0.0", "2.9.9"));
    }

    #[test]
    fn test_v_prefix_tolerated() {
        assert!(is_newer("2.5.5", "v2.5.6"));
        assert!(is_newer("v2.5.5", "V2.6.0"));
        assert!(!is_newer("v2.5.5", "v2.5.5"));
    }

    #[test]
    fn test_unequal_component_counts() {
        assert!(is_newer("2.5", "2.5.1"));
        assert!(!is_newer("2.5.0", "2.5"));
        assert!(is_newer("2", "2.0.1"));
    }

    #[test]
    fn test_suffixes_and_garbage_never_panic() {
        assert!(is_newer("2.5.5", "2.5.6-beta1"));
        assert!(!is_newer("2.5.5", "not-a-version"));
        assert!(!is_newer("2.5.5", ""));
    }
}

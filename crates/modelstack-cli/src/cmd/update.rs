use crate::output::print_json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const RELEASE_URL: &str = "https://api.github.com/repos/modelstack/modelstack/releases/latest";
const CACHE_TTL_SECS: i64 = 3600;
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct UpdateCache {
    latest_version: String,
    has_update: bool,
    checked_at: DateTime<Utc>,
    current_version: String,
}

fn cache_path() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(".modelstack").join("update-cache.json"))
}

fn read_cache() -> Option<UpdateCache> {
    let path = cache_path()?;
    let data = std::fs::read_to_string(path).ok()?;
    let cache: UpdateCache = serde_json::from_str(&data).ok()?;
    if (Utc::now() - cache.checked_at).num_seconds() < CACHE_TTL_SECS
        && cache.current_version == CURRENT_VERSION
    {
        Some(cache)
    } else {
        None
    }
}

fn write_cache(latest_version: &str, has_update: bool) {
    let Some(path) = cache_path() else { return };
    let cache = UpdateCache {
        latest_version: latest_version.to_string(),
        has_update,
        checked_at: Utc::now(),
        current_version: CURRENT_VERSION.to_string(),
    };
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string(&cache)?.as_bytes())
    };
    if let Err(e) = write() {
        debug!("failed to write update cache: {e}");
    }
}

// ---------------------------------------------------------------------------
// Release check
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

fn checks_disabled() -> bool {
    // Dev builds report 0.0.0 and never nag.
    if CURRENT_VERSION == "0.0.0" {
        return true;
    }
    matches!(
        std::env::var("MODELSTACK_DISABLE_UPDATE_CHECK")
            .unwrap_or_default()
            .to_lowercase()
            .as_str(),
        "true" | "1" | "yes"
    )
}

fn fetch_latest_version() -> Option<String> {
    let response = ureq::get(RELEASE_URL)
        .timeout(Duration::from_secs(2))
        .set("user-agent", "modelstack")
        .call()
        .map_err(|e| debug!("release check failed: {e}"))
        .ok()?;
    let release: Release = response.into_json().ok()?;
    Some(release.tag_name.trim_start_matches('v').to_string())
}

/// Numeric dotted-segment comparison; non-numeric segments compare as zero.
fn is_newer(latest: &str, current: &str) -> bool {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|seg| seg.parse().unwrap_or(0))
            .collect()
    };
    parse(latest) > parse(current)
}

/// Returns `(has_update, latest_version)`, consulting the one-hour cache
/// before touching the network.
fn check_for_updates() -> (bool, Option<String>) {
    if checks_disabled() {
        return (false, None);
    }
    if let Some(cache) = read_cache() {
        return (cache.has_update, Some(cache.latest_version));
    }
    match fetch_latest_version() {
        Some(latest) => {
            let has_update = is_newer(&latest, CURRENT_VERSION);
            write_cache(&latest, has_update);
            (has_update, Some(latest))
        }
        None => (false, None),
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// `modelstack update` — report whether a newer release exists.
pub fn run(json: bool) -> anyhow::Result<()> {
    let (has_update, latest) = check_for_updates();

    if json {
        #[derive(Serialize)]
        struct UpdateReport<'a> {
            current: &'a str,
            latest: Option<&'a str>,
            has_update: bool,
        }
        print_json(&UpdateReport {
            current: CURRENT_VERSION,
            latest: latest.as_deref(),
            has_update,
        })?;
        return Ok(());
    }

    match (has_update, latest) {
        (true, Some(latest)) => {
            println!("New version available: {CURRENT_VERSION} -> {latest}");
            println!("Update: cargo install modelstack-cli");
        }
        (false, Some(_)) => println!("modelstack {CURRENT_VERSION} is up to date."),
        (false, None) => println!("modelstack {CURRENT_VERSION} (release check unavailable)"),
        (true, None) => unreachable!(),
    }
    Ok(())
}

/// Post-command nudge: prints a one-liner when an update is known to exist,
/// never fails, never blocks for more than the fetch timeout.
pub fn notify_quietly() {
    let (has_update, latest) = check_for_updates();
    if has_update {
        if let Some(latest) = latest {
            println!("\nNew version available: {CURRENT_VERSION} -> {latest} (modelstack update)");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

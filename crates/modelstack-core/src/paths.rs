use crate::error::{DeployError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const MODELSTACK_DIR: &str = ".modelstack";
pub const CONFIG_FILE: &str = ".modelstack/config.yaml";
pub const PARAMETERS_FILE: &str = ".modelstack/parameters.json";
pub const TEMPLATES_DIR: &str = "templates";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn modelstack_dir(root: &Path) -> PathBuf {
    root.join(MODELSTACK_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn parameters_path(root: &Path) -> PathBuf {
    root.join(PARAMETERS_FILE)
}

pub fn templates_dir(root: &Path) -> PathBuf {
    root.join(TEMPLATES_DIR)
}

pub fn template_path(root: &Path, file: &str) -> PathBuf {
    templates_dir(root).join(file)
}

// ---------------------------------------------------------------------------
// Stack name validation
// ---------------------------------------------------------------------------

static STACK_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn stack_name_re() -> &'static Regex {
    // Provider rule: start with a letter, then letters, digits, and hyphens.
    STACK_NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9\-]*$").unwrap())
}

pub fn validate_stack_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 128 || !stack_name_re().is_match(name) {
        return Err(DeployError::InvalidStackName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
